//! Matrix command - resolves every option combination without writing.

use crate::cli::args::MatrixArgs;
use crate::errors::{AppError, AppResult};
use crate::scaffold::{Plan, ScaffoldOptions, Secrets};

pub async fn execute(args: MatrixArgs) -> AppResult<()> {
    let secrets = Secrets::fixed(&args.name);
    let mut failures = 0usize;

    for options in ScaffoldOptions::all_combinations(&args.name) {
        match Plan::resolve(&options, &secrets) {
            Ok(plan) => {
                println!(
                    "ok    {:<28} {:>3} files  {} overrides  [{}]",
                    options.label(),
                    plan.len(),
                    plan.overrides().len(),
                    plan.components().join(", ")
                );
                if args.files {
                    for file in plan.files() {
                        println!("        {}  ({})", file.path, file.component);
                    }
                }
            }
            Err(e) => {
                failures += 1;
                tracing::error!(options = %options.label(), error = %e, "Combination failed");
                println!("FAIL  {:<28} {}", options.label(), e);
            }
        }
    }

    if failures > 0 {
        return Err(AppError::wiring(format!("{} combination(s) failed", failures)));
    }
    Ok(())
}
