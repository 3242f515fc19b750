//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::scaffold::{AuthStrategy, Authorization, Database};

/// backend-forge - scaffold authenticated web backends
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new backend project
    New(NewArgs),

    /// Resolve every option combination and report the result
    Matrix(MatrixArgs),

    /// Extend a generated project
    Generate(GenerateArgs),

    /// Start the reference backend
    Serve(ServeArgs),

    /// Run database migrations of the reference backend
    Migrate(MigrateArgs),

    /// Create the administrator account
    Seed,
}

#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Project (and crate) name
    pub name: String,

    /// Database engine
    #[arg(short, long, value_enum, default_value = "postgresql")]
    pub database: Database,

    /// Authentication strategy
    #[arg(short, long, value_enum, default_value = "jwt")]
    pub auth: AuthStrategy,

    /// Authorization model
    #[arg(long, value_enum, default_value = "none")]
    pub authz: Authorization,

    /// Parent directory of the project
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// List the files without writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Write into a non-empty directory, replacing files
    #[arg(long, conflicts_with = "dry_run")]
    pub force: bool,

    /// Use deterministic secrets in `.env` (for reproducible output)
    #[arg(long)]
    pub fixed_secrets: bool,
}

#[derive(Parser, Debug)]
pub struct MatrixArgs {
    /// Project name used for every combination
    #[arg(long, default_value = "demo")]
    pub name: String,

    /// Also list each combination's files
    #[arg(long)]
    pub files: bool,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    #[command(subcommand)]
    pub component: GenerateComponent,
}

#[derive(Subcommand, Debug)]
pub enum GenerateComponent {
    /// Generate a CRUD resource module
    Resource {
        /// Resource name (e.g., "product")
        name: String,

        /// Root of the generated project
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, env = "SERVER_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT")]
    pub port: Option<u16>,
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}
