use crate::demo::{run_demo, DemoArgs};
use crate::server;
use crate::submit::{run_submit, SubmitArgs};
use clap::{Args, Parser, Subcommand};
use mthamini::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Mthamini Intake",
    about = "Submit guarantor details for the onboarding wizard from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register guarantors from a CSV manifest and upload their documents
    Submit(SubmitArgs),
    /// Serve the in-memory guarantor backend (default command)
    ServeStub(ServeArgs),
    /// Run a self-contained walkthrough against an in-process backend
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the stub backend
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the stub backend
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::ServeStub(ServeArgs::default()));

    match command {
        Command::Submit(args) => run_submit(args).await,
        Command::ServeStub(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
