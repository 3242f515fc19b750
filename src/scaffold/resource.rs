//! `generate resource`: add a CRUD module to an existing scaffolded project.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::catalog::{resource as templates, TemplateSpec};
use super::manifest::Manifest;
use super::naming::validate_resource_name;
use super::options::{AuthKind, StorageKind};
use super::render::{RenderContext, Renderer, ResourceContext, Secrets};
use super::wiring::{rewrite_block, RouteEntry};
use super::writer::write_file;
use crate::errors::{AppError, AppResult};

const LIB_RS: &str = "src/lib.rs";
const ROUTES_RS: &str = "src/routes.rs";
const MIGRATIONS_MOD_RS: &str = "src/migrations/mod.rs";

/// Outcome of a resource generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReport {
    pub module: String,
    pub migration: Option<String>,
    pub created: Vec<String>,
    pub updated: Vec<String>,
}

/// Generate resource `name` in the project rooted at `root`.
pub fn generate_resource(root: &Path, name: &str) -> AppResult<ResourceReport> {
    generate_resource_at(root, name, Utc::now())
}

/// Like [`generate_resource`], with the migration timestamp supplied.
pub fn generate_resource_at(
    root: &Path,
    name: &str,
    now: DateTime<Utc>,
) -> AppResult<ResourceReport> {
    validate_resource_name(name)?;
    let mut manifest = Manifest::load(root)?;
    let resource = ResourceContext::new(name);
    let module = resource.module.clone();

    if manifest.modules.contains(&module) || root.join("src").join(&module).exists() {
        return Err(AppError::conflict(format!("Module `{}`", module)));
    }

    let options = manifest.options.clone();
    let storage = options.storage();
    let migration = (storage == StorageKind::Sql)
        .then(|| format!("m{}_create_{}", now.format("%Y%m%d_%H%M%S"), module));

    let mut selected: Vec<&'static TemplateSpec> = vec![&templates::MOD, &templates::SERVICE];
    selected.push(match options.auth_kind() {
        AuthKind::Bearer => &templates::HANDLERS_BEARER,
        AuthKind::Session => &templates::HANDLERS_SESSION,
    });
    match storage {
        StorageKind::Sql => {
            selected.extend([&templates::ENTITY_SQL, &templates::REPOSITORY_SQL, &templates::MIGRATION])
        }
        StorageKind::Document => {
            selected.extend([&templates::ENTITY_MONGODB, &templates::REPOSITORY_MONGODB])
        }
    }

    // Secrets are not referenced by resource templates
    let context = RenderContext::new(&options, &Secrets::fixed(&options.crate_name()))
        .with_resource(resource);
    let renderer = Renderer::new()?;

    let mut rendered = Vec::with_capacity(selected.len());
    for template in selected {
        let path = template
            .dest
            .replace("{module}", &module)
            .replace("{migration}", migration.as_deref().unwrap_or_default());
        rendered.push((path, renderer.render(template.id, &context)?));
    }

    // rewire before writing so a project without markers is left untouched
    let mut modules = manifest.modules.clone();
    modules.push(module.clone());
    modules.sort();
    let mut routes = manifest.routes.clone();
    routes.push(RouteEntry::merged(module.clone()));

    let mut rewired = vec![
        (
            LIB_RS.to_string(),
            rewrite_file(
                root,
                LIB_RS,
                "modules",
                &modules.iter().map(|m| format!("pub mod {};", m)).collect::<Vec<_>>(),
            )?,
        ),
        (
            ROUTES_RS.to_string(),
            rewrite_file(
                root,
                ROUTES_RS,
                "routes",
                &routes.iter().map(RouteEntry::line).collect::<Vec<_>>(),
            )?,
        ),
    ];

    let mut migrations = manifest.migrations.clone();
    if let Some(migration) = &migration {
        migrations.push(migration.clone());
        migrations.sort();
        let source = read(root, MIGRATIONS_MOD_RS)?;
        let source = rewrite_block(
            &source,
            "migration-mods",
            &migrations.iter().map(|m| format!("mod {};", m)).collect::<Vec<_>>(),
        )?;
        let source = rewrite_block(
            &source,
            "migration-list",
            &migrations
                .iter()
                .map(|m| format!("Box::new({}::Migration),", m))
                .collect::<Vec<_>>(),
        )?;
        rewired.push((MIGRATIONS_MOD_RS.to_string(), source));
    }

    let mut report = ResourceReport {
        module: module.clone(),
        migration: migration.clone(),
        created: Vec::new(),
        updated: Vec::new(),
    };

    for (path, contents) in &rendered {
        write_file(&root.join(path), contents)?;
        manifest.track_file(path.clone());
        report.created.push(path.clone());
    }
    for (path, contents) in &rewired {
        write_file(&root.join(path), contents)?;
        report.updated.push(path.clone());
    }

    manifest.modules = modules;
    manifest.routes = routes;
    manifest.migrations = migrations;
    manifest.resources.push(module.clone());
    manifest.resources.sort();
    manifest.save(root)?;

    tracing::info!(
        module = %module,
        created = report.created.len(),
        updated = report.updated.len(),
        "Resource generated"
    );
    Ok(report)
}

fn read(root: &Path, path: &str) -> AppResult<String> {
    fs::read_to_string(root.join(path))
        .map_err(|e| AppError::wiring(format!("cannot read {}: {}", path, e)))
}

fn rewrite_file(root: &Path, path: &str, marker: &str, lines: &[String]) -> AppResult<String> {
    let source = read(root, path)?;
    rewrite_block(&source, marker, lines).map_err(|e| match e {
        AppError::Wiring(msg) => AppError::wiring(format!("{}: {}", path, msg)),
        other => other,
    })
}
