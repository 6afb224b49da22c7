use crate::cli::ServeArgs;
use mthamini::config::AppConfig;
use mthamini::error::AppError;
use mthamini::guarantor::{stub_router, InMemoryGuarantorStore};
use mthamini::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.stub.host = host;
    }
    if let Some(port) = args.port.take() {
        config.stub.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let app = stub_router(InMemoryGuarantorStore::default());

    let addr = config.stub.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(?config.environment, %addr, "guarantor stub backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
