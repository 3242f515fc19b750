//! New command - generates a project from the option matrix.

use crate::cli::args::NewArgs;
use crate::errors::AppResult;
use crate::scaffold::writer::project_root;
use crate::scaffold::{write_plan, Plan, ScaffoldOptions, Secrets, WriteMode};

pub async fn execute(args: NewArgs) -> AppResult<()> {
    let options = ScaffoldOptions::new(&args.name, args.database, args.auth, args.authz);
    let secrets = if args.fixed_secrets {
        Secrets::fixed(&options.crate_name())
    } else {
        Secrets::generate()
    };

    let plan = Plan::resolve(&options, &secrets)?;
    for o in plan.overrides() {
        tracing::debug!(path = %o.path, replaced = %o.replaced, by = %o.by, "Override");
    }

    let mode = if args.dry_run {
        WriteMode::DryRun
    } else if args.force {
        WriteMode::Overwrite
    } else {
        WriteMode::CreateNew
    };

    let root = project_root(&args.output, &args.name);
    let report = write_plan(&plan, &root, mode)?;

    let verb = if args.dry_run { "Would create" } else { "Created" };
    for path in &report.created {
        println!("{}: {}", verb, path);
    }
    for path in &report.overwritten {
        println!("Overwrote: {}", path);
    }
    println!(
        "{} ({}) -> {} [{} files]",
        options.project_name,
        options.label(),
        root.display(),
        report.total()
    );

    Ok(())
}
