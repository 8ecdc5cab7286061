use crate::report::{run_estimate, run_generic, run_inspect, EstimateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dse_cutoffs::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "DSE Cutoffs",
    about = "Estimate HKDSE levels from historical grade boundaries",
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
    /// Estimate the level for one score
    Estimate(EstimateArgs),
    /// List the subjects and exam years found in the cutoff documents
    Inspect,
    /// Print the generic fallback thresholds
    Generic,
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
        Command::Estimate(args) => run_estimate(args).await,
        Command::Inspect => run_inspect().await,
        Command::Generic => {
            run_generic();
            Ok(())
        }
    }
}
