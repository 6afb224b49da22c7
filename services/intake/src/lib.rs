mod cli;
mod demo;
mod infra;
mod server;
mod submit;

use mthamini::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
