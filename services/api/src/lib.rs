mod cli;
mod infra;
mod report;
mod routes;
mod server;

use dse_cutoffs::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
