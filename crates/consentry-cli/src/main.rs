use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use consentry_core::{AppConfig, ConsentController, Page, SqliteJar};

mod commands;

#[derive(Parser)]
#[command(name = "consentry")]
#[command(author, version, about = "Manage the persisted cookie-consent record")]
struct Cli {
    /// Path to an alternate configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored decision and the derived banner visibility
    Status,
    /// Record acceptance
    Accept,
    /// Record rejection and purge all other stored entries
    Reject,
    /// Delete the consent record so the banner shows again
    Reset,
    /// List the names of all live stored entries
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let jar = SqliteJar::new(&config).await?;

    // There is no banner on a terminal page; the controller's visibility
    // operations degrade to safe no-ops while the stored record stays
    // fully manageable.
    let mut controller = ConsentController::new(jar, config, Page::new());

    match cli.command {
        Commands::Status => commands::status::run(&controller).await,
        Commands::Accept => commands::accept::run(&mut controller).await,
        Commands::Reject => commands::reject::run(&mut controller).await,
        Commands::Reset => commands::reset::run(&mut controller).await,
        Commands::List => commands::list::run(&controller).await,
    }
}
