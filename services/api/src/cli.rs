use crate::demo::{run_bulk, run_demo, BulkArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kitflow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "kitflow",
    about = "Run and demonstrate the kitflow uniform ordering service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Process a bulk order CSV against the demo tenant and print per-row outcomes
    Bulk(BulkArgs),
    /// Run an end-to-end CLI demo covering submission, bulk intake, and approval
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Bulk(args) => run_bulk(args),
        Command::Demo(args) => run_demo(args),
    }
}
