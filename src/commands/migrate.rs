//! Migrate command - schema management for the reference backend.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::open(&config).await?;

    match args.action {
        MigrateAction::Up => {
            db.migrate_up().await?;
            tracing::info!("Migrations applied");
        }
        MigrateAction::Down => {
            db.migrate_down().await?;
            tracing::info!("Latest migration rolled back");
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables before re-applying migrations");
            db.migrate_fresh().await?;
            tracing::info!("Schema rebuilt from scratch");
        }
        MigrateAction::Status => {
            let states = db.migration_states().await?;
            for state in &states {
                println!(
                    "{:<8} {}",
                    if state.applied { "applied" } else { "pending" },
                    state.name
                );
            }
            let pending = states.iter().filter(|s| !s.applied).count();
            tracing::info!(total = states.len(), pending, "Migration status");
        }
    }

    Ok(())
}
