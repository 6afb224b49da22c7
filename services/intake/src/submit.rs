use crate::infra::{describe_outcome, render_form, TerminalNavigator};
use clap::Args;
use mthamini::config::{ApiConfig, AppConfig, ConfigError};
use mthamini::error::AppError;
use mthamini::guarantor::{
    CancellationSource, FormContext, FormId, GuarantorFormView, GuarantorManifest,
    HttpGuarantorGateway, SubmitOptions, SubmitOutcome,
};
use mthamini::telemetry;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// CSV manifest with one guarantor per row; document paths are relative to it
    #[arg(long)]
    pub(crate) manifest: PathBuf,
    /// Form id of the onboarding application the guarantors belong to
    #[arg(long, default_value = "")]
    pub(crate) form_id: String,
    /// Override the configured guarantor API base URL
    #[arg(long)]
    pub(crate) api_base_url: Option<String>,
    /// Override the submission timeout in milliseconds
    #[arg(long)]
    pub(crate) timeout_ms: Option<u64>,
    /// Print the final form state as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let SubmitArgs {
        manifest,
        form_id,
        api_base_url,
        timeout_ms,
        json,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(base_url) = api_base_url {
        config.api.base_url = ApiConfig::normalize_base_url(&base_url)?;
    }
    if let Some(timeout_ms) = timeout_ms {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout.into());
        }
        config.api.request_timeout = Duration::from_millis(timeout_ms);
    }

    telemetry::init(&config.telemetry)?;

    let manifest = GuarantorManifest::from_path(&manifest)?;
    let mut session = manifest.into_session(
        FormContext::new(FormId::new(form_id)),
        config.wizard.clone(),
    );
    let gateway = HttpGuarantorGateway::new(&config.api)?;
    let options = SubmitOptions::from_config(&config.api);

    let (source, token) = CancellationSource::new();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling submission");
            source.cancel();
        }
    });

    let outcome = session
        .submit(&gateway, &TerminalNavigator, &options, &token)
        .await;
    interrupt.abort();

    let view = GuarantorFormView::from_session(&session);
    if json {
        match serde_json::to_string_pretty(&view) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => warn!(error = %err, "unable to render form as JSON"),
        }
    } else {
        render_form(&view);
    }
    println!("{}", describe_outcome(&outcome));

    match outcome {
        SubmitOutcome::Failed(err) => Err(err.into()),
        SubmitOutcome::Completed(_) | SubmitOutcome::AlreadySubmitting => Ok(()),
    }
}
