//! Generate command - extends a generated project.

use crate::cli::args::{GenerateArgs, GenerateComponent};
use crate::errors::AppResult;
use crate::scaffold::generate_resource;

pub async fn execute(args: GenerateArgs) -> AppResult<()> {
    match args.component {
        GenerateComponent::Resource { name, path } => {
            tracing::info!("Generating resource: {}", name);
            let report = generate_resource(&path, &name)?;
            for file in &report.created {
                println!("Created: {}", file);
            }
            for file in &report.updated {
                println!("Updated: {}", file);
            }
            if let Some(migration) = &report.migration {
                println!("Migration: {} (applied on next start)", migration);
            }
        }
    }

    Ok(())
}
