//! Cross-reference wiring between selected components.
//!
//! Templates never hard-code which modules, crates or routers exist: the
//! wiring derives them from the selected components and the planned file set,
//! so `lib.rs`, `routes.rs`, `Cargo.toml` and `.env` stay consistent with the
//! files actually written.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::catalog::Component;
use crate::errors::{AppError, AppResult};

/// Files under `src/` that are crate roots rather than modules
const CRATE_ROOTS: &[&str] = &["main", "lib"];

/// A merged `[dependencies]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyLine {
    pub name: String,
    pub spec: String,
}

/// A merged `.env` entry (value not yet rendered)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvLine {
    pub key: String,
    pub value: String,
}

/// A router registration in the generated `routes.rs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub module: String,
    /// Empty when the router is merged at the root
    #[serde(default)]
    pub mount: String,
}

impl RouteEntry {
    pub fn merged(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            mount: String::new(),
        }
    }

    /// The builder call registering this router.
    pub fn line(&self) -> String {
        if self.mount.is_empty() {
            format!(".merge({}::routes())", self.module)
        } else {
            format!(".nest(\"{}\", {}::routes())", self.mount, self.module)
        }
    }
}

/// Route entry as exposed to templates
#[derive(Debug, Clone, Serialize)]
pub struct RouteLine {
    pub module: String,
    pub mount: String,
    pub line: String,
}

impl From<&RouteEntry> for RouteLine {
    fn from(entry: &RouteEntry) -> Self {
        Self {
            module: entry.module.clone(),
            mount: entry.mount.clone(),
            line: entry.line(),
        }
    }
}

/// Everything derived from the component selection and file set
#[derive(Debug, Clone, Default)]
pub struct Wiring {
    pub dependencies: Vec<DependencyLine>,
    pub env: Vec<EnvLine>,
    /// Top-level modules declared by the crate root
    pub modules: Vec<String>,
    /// Child modules per top-level module directory
    pub submodules: BTreeMap<String, Vec<String>>,
    pub routes: Vec<RouteEntry>,
    /// Module directories that need a generated `mod.rs`
    pub generated_mods: Vec<String>,
}

impl Wiring {
    /// Derive the wiring for `components` whose templates land on `paths`.
    pub fn build<'a>(
        components: &[&'static Component],
        paths: impl IntoIterator<Item = &'a str>,
    ) -> AppResult<Self> {
        let dependencies = merge_dependencies(components)?;
        let env = merge_env(components)?;
        let (modules, submodules, generated_mods) = module_tree(paths)?;

        let mut routes = Vec::new();
        for component in components {
            for route in component.routes {
                let entry = RouteEntry {
                    module: route.module.to_string(),
                    mount: route.mount.to_string(),
                };
                if !routes.contains(&entry) {
                    routes.push(entry);
                }
            }
        }

        tracing::debug!(
            modules = modules.len(),
            routes = routes.len(),
            dependencies = dependencies.len(),
            "Wiring computed"
        );

        Ok(Self {
            dependencies,
            env,
            modules,
            submodules,
            routes,
            generated_mods,
        })
    }

    pub fn route_lines(&self) -> Vec<RouteLine> {
        self.routes.iter().map(RouteLine::from).collect()
    }
}

/// Merge crate dependencies, sorted by name. Same crate with a different spec is a conflict.
pub fn merge_dependencies(components: &[&'static Component]) -> AppResult<Vec<DependencyLine>> {
    let mut merged: BTreeMap<&str, (&str, &str)> = BTreeMap::new();

    for component in components {
        for dependency in component.dependencies {
            match merged.get(dependency.name) {
                Some((spec, _)) if *spec == dependency.spec => {}
                Some((spec, owner)) => {
                    return Err(AppError::wiring(format!(
                        "crate `{}` is required as {} by `{}` and as {} by `{}`",
                        dependency.name, spec, owner, dependency.spec, component.id
                    )));
                }
                None => {
                    merged.insert(dependency.name, (dependency.spec, component.id));
                }
            }
        }
    }

    Ok(merged
        .into_iter()
        .map(|(name, (spec, _))| DependencyLine {
            name: name.to_string(),
            spec: spec.to_string(),
        })
        .collect())
}

/// Merge environment entries in component order. A key with two values is a conflict.
pub fn merge_env(components: &[&'static Component]) -> AppResult<Vec<EnvLine>> {
    let mut merged: Vec<EnvLine> = Vec::new();

    for component in components {
        for var in component.env {
            match merged.iter().find(|line| line.key == var.key) {
                Some(line) if line.value == var.value => {}
                Some(line) => {
                    return Err(AppError::wiring(format!(
                        "environment key `{}` set to `{}` and `{}` (component `{}`)",
                        var.key, line.value, var.value, component.id
                    )));
                }
                None => merged.push(EnvLine {
                    key: var.key.to_string(),
                    value: var.value.to_string(),
                }),
            }
        }
    }

    Ok(merged)
}

type ModuleTree = (Vec<String>, BTreeMap<String, Vec<String>>, Vec<String>);

/// Derive top-level modules, their children and the directories lacking a `mod.rs`.
pub fn module_tree<'a>(paths: impl IntoIterator<Item = &'a str>) -> AppResult<ModuleTree> {
    let mut modules = BTreeSet::new();
    let mut submodules: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut has_mod_rs = BTreeSet::new();

    for path in paths {
        let Some(rest) = path.strip_prefix("src/") else {
            continue;
        };
        let parts: Vec<&str> = rest.split('/').collect();
        match parts.as_slice() {
            [file] => {
                let Some(name) = file.strip_suffix(".rs") else {
                    continue;
                };
                if !CRATE_ROOTS.contains(&name) {
                    modules.insert(name.to_string());
                }
            }
            ["bin", _] => {}
            [dir, file] => {
                let Some(name) = file.strip_suffix(".rs") else {
                    continue;
                };
                modules.insert(dir.to_string());
                if name == "mod" {
                    has_mod_rs.insert(dir.to_string());
                } else {
                    submodules
                        .entry(dir.to_string())
                        .or_default()
                        .insert(name.to_string());
                }
            }
            _ => {
                return Err(AppError::wiring(format!(
                    "`{}` is nested deeper than one module level",
                    path
                )));
            }
        }
    }

    let generated_mods = modules
        .iter()
        .filter(|module| submodules.contains_key(*module) && !has_mod_rs.contains(*module))
        .cloned()
        .collect();

    Ok((
        modules.into_iter().collect(),
        submodules
            .into_iter()
            .map(|(dir, children)| (dir, children.into_iter().collect()))
            .collect(),
        generated_mods,
    ))
}

/// Replace the lines between `// forge:<marker>:start` and `// forge:<marker>:end`.
///
/// New lines take the indentation of the start marker.
pub fn rewrite_block(source: &str, marker: &str, lines: &[String]) -> AppResult<String> {
    let start_tag = format!("// forge:{}:start", marker);
    let end_tag = format!("// forge:{}:end", marker);

    let source_lines: Vec<&str> = source.lines().collect();
    let start = source_lines
        .iter()
        .position(|line| line.trim() == start_tag)
        .ok_or_else(|| AppError::wiring(format!("marker `{}` not found", start_tag)))?;
    let end = source_lines[start..]
        .iter()
        .position(|line| line.trim() == end_tag)
        .map(|offset| start + offset)
        .ok_or_else(|| AppError::wiring(format!("marker `{}` not found", end_tag)))?;

    let start_line = source_lines[start];
    let indent = &start_line[..start_line.len() - start_line.trim_start().len()];

    let mut output: Vec<String> = source_lines[..=start].iter().map(|l| l.to_string()).collect();
    output.extend(lines.iter().map(|line| format!("{}{}", indent, line)));
    output.extend(source_lines[end..].iter().map(|l| l.to_string()));

    let mut rewritten = output.join("\n");
    if source.ends_with('\n') {
        rewritten.push('\n');
    }
    Ok(rewritten)
}
