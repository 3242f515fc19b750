//! forge - entry point dispatching to the CLI commands.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backend_forge::{
    cli::{Cli, Commands},
    commands,
    config::Config,
    errors::AppResult,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command).await {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::New(args) => commands::new::execute(args).await,
        Commands::Matrix(args) => commands::matrix::execute(args).await,
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::Serve(args) => commands::serve::execute(args, load_config()?).await,
        Commands::Migrate(args) => commands::migrate::execute(args, load_config()?).await,
        Commands::Seed => commands::seed::execute(load_config()?).await,
    }
}

/// Only the backend commands need the environment configuration.
fn load_config() -> AppResult<Config> {
    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
