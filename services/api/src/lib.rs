mod cli;
mod console;
mod demo;
mod infra;
mod routes;
mod server;

use mindcare::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
