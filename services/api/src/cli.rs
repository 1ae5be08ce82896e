use crate::{infra, server};
use clap::{Args, Parser, Subcommand};
use gpt_resume::config::AppConfig;
use gpt_resume::error::AppError;
use gpt_resume::screening::ScreeningRepository;
use gpt_resume::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gpt-resume-api",
    about = "Serve the resume screening API or prepare its database",
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
    /// Create the database schema and exit
    Migrate(MigrateArgs),
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

#[derive(Args, Debug, Default)]
pub(crate) struct MigrateArgs {
    /// Override APP_DATABASE_PATH
    #[arg(long)]
    pub(crate) database_path: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Migrate(args) => migrate(args),
    }
}

fn migrate(args: MigrateArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = args.database_path {
        config.storage.database_path = path;
    }
    telemetry::init(&config.telemetry, config.environment)?;

    let repository = infra::open_repository(&config.storage)?;
    let counts = repository.counts()?;
    println!(
        "Schema ready at {} ({} jobs, {} applicants, {} documents)",
        config.storage.database_path.display(),
        counts.jobs,
        counts.applicants,
        counts.documents
    );
    Ok(())
}
