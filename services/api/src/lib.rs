mod assets;
mod cli;
mod infra;
mod routes;
mod server;

use gpt_resume::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
