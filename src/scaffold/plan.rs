//! Resolution of an option set into a verified, fully rendered file plan.

use std::collections::BTreeMap;
use std::path::{Component as PathComponent, Path};

use minijinja::context;

use super::catalog::{self, Component, Layer, TemplateSpec};
use super::manifest::Manifest;
use super::options::ScaffoldOptions;
use super::render::{RenderContext, Renderer, Secrets, GENERATOR_VERSION};
use super::wiring::{EnvLine, Wiring};
use crate::config::MANIFEST_FILE;
use crate::errors::{AppError, AppResult};

/// Files every plan must contain
const REQUIRED_FILES: &[&str] = &["Cargo.toml", "src/main.rs", "src/lib.rs", "src/routes.rs", MANIFEST_FILE];

/// Provenance marker for files produced by the planner itself
pub const WIRING_COMPONENT: &str = "wiring";

/// A rendered file and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: String,
    pub contents: String,
    pub component: String,
}

/// A file of an earlier layer replaced by a later one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub path: String,
    pub replaced: String,
    pub by: String,
}

/// The complete, verified output for one option set
#[derive(Debug, Clone)]
pub struct Plan {
    options: ScaffoldOptions,
    components: Vec<&'static str>,
    files: BTreeMap<String, PlannedFile>,
    overrides: Vec<Override>,
    wiring: Wiring,
    manifest: Manifest,
}

impl Plan {
    /// Select, layer, wire, render and verify the files for `options`.
    pub fn resolve(options: &ScaffoldOptions, secrets: &Secrets) -> AppResult<Self> {
        options.validate()?;

        let components = catalog::select(options);
        tracing::debug!(
            options = %options.label(),
            components = ?components.iter().map(|c| c.id).collect::<Vec<_>>(),
            "Components selected"
        );

        let (placed, overrides) = place_templates(&components)?;
        let wiring = Wiring::build(&components, placed.keys().copied())?;

        let renderer = Renderer::new()?;
        let base_context = RenderContext::new(options, secrets);
        let env = wiring
            .env
            .iter()
            .map(|line| {
                Ok(EnvLine {
                    key: line.key.clone(),
                    value: renderer.render_str(&line.value, &base_context)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        let context = base_context.with_wiring(&wiring, env);

        let mut files = BTreeMap::new();
        for (path, (component, template)) in &placed {
            let contents = renderer.render(template.id, &context)?;
            files.insert(
                path.to_string(),
                PlannedFile {
                    path: path.to_string(),
                    contents,
                    component: component.id.to_string(),
                },
            );
        }

        for module in &wiring.generated_mods {
            let path = catalog::support::MOD_RS.dest.replace("{module}", module);
            let children = wiring.submodules.get(module).cloned().unwrap_or_default();
            let contents = renderer.render(
                catalog::support::MOD_RS.id,
                context! { module => module, children => children, project => &context.project },
            )?;
            files.insert(
                path.clone(),
                PlannedFile {
                    path,
                    contents,
                    component: WIRING_COMPONENT.to_string(),
                },
            );
        }

        let mut paths: Vec<String> = files.keys().cloned().collect();
        paths.push(MANIFEST_FILE.to_string());
        paths.sort();

        let manifest = Manifest {
            generator_version: GENERATOR_VERSION.to_string(),
            options: options.clone(),
            components: components.iter().map(|c| c.id.to_string()).collect(),
            modules: wiring.modules.clone(),
            routes: wiring.routes.clone(),
            migrations: context.migrations.clone(),
            resources: Vec::new(),
            files: paths,
        };
        files.insert(
            MANIFEST_FILE.to_string(),
            PlannedFile {
                path: MANIFEST_FILE.to_string(),
                contents: manifest.to_json()?,
                component: WIRING_COMPONENT.to_string(),
            },
        );

        let plan = Self {
            options: options.clone(),
            components: components.iter().map(|c| c.id).collect(),
            files,
            overrides,
            wiring,
            manifest,
        };
        plan.verify()?;

        tracing::info!(
            options = %options.label(),
            files = plan.files.len(),
            overrides = plan.overrides.len(),
            "Plan resolved"
        );
        Ok(plan)
    }

    /// Check the plan is self-consistent before anything is written.
    pub fn verify(&self) -> AppResult<()> {
        for path in self.files.keys() {
            verify_relative(path)?;
        }

        for required in REQUIRED_FILES {
            if !self.files.contains_key(*required) {
                return Err(AppError::wiring(format!("required file `{}` is missing", required)));
            }
        }

        for file in self.files.values() {
            if file.contents.trim().is_empty() {
                return Err(AppError::wiring(format!("`{}` rendered empty", file.path)));
            }
        }

        let lib = self.contents("src/lib.rs")?;
        for module in &self.wiring.modules {
            let flat = format!("src/{}.rs", module);
            let nested = format!("src/{}/mod.rs", module);
            if !self.files.contains_key(&flat) && !self.files.contains_key(&nested) {
                return Err(AppError::wiring(format!(
                    "module `{}` has neither {} nor {}",
                    module, flat, nested
                )));
            }
            if !declares(lib, module) {
                return Err(AppError::wiring(format!(
                    "src/lib.rs does not declare module `{}`",
                    module
                )));
            }
            if let Some(children) = self.wiring.submodules.get(module) {
                let mod_rs = self.contents(&nested)?;
                for child in children {
                    if !declares(mod_rs, child) {
                        return Err(AppError::wiring(format!(
                            "{} does not declare module `{}`",
                            nested, child
                        )));
                    }
                }
            }
        }

        let routes = self.contents("src/routes.rs")?;
        for route in &self.wiring.routes {
            if !self.wiring.modules.contains(&route.module) {
                return Err(AppError::wiring(format!(
                    "route registration names undeclared module `{}`",
                    route.module
                )));
            }
            if !routes.contains(&route.line()) {
                return Err(AppError::wiring(format!(
                    "src/routes.rs does not register `{}`",
                    route.line()
                )));
            }
        }

        for dependency in &self.wiring.dependencies {
            let line = format!("{} = {}", dependency.name, dependency.spec);
            if !self.contents("Cargo.toml")?.contains(&line) {
                return Err(AppError::wiring(format!(
                    "Cargo.toml is missing dependency `{}`",
                    dependency.name
                )));
            }
        }

        Ok(())
    }

    pub fn options(&self) -> &ScaffoldOptions {
        &self.options
    }

    pub fn components(&self) -> &[&'static str] {
        &self.components
    }

    pub fn files(&self) -> impl Iterator<Item = &PlannedFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&PlannedFile> {
        self.files.get(path)
    }

    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    pub fn wiring(&self) -> &Wiring {
        &self.wiring
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn contents(&self, path: &str) -> AppResult<&str> {
        self.files
            .get(path)
            .map(|file| file.contents.as_str())
            .ok_or_else(|| AppError::wiring(format!("`{}` is missing", path)))
    }
}

type Placement = (&'static Component, &'static TemplateSpec);

/// Lay templates out by destination; later layers replace earlier ones.
fn place_templates(
    components: &[&'static Component],
) -> AppResult<(BTreeMap<&'static str, Placement>, Vec<Override>)> {
    let mut placed: BTreeMap<&'static str, Placement> = BTreeMap::new();
    let mut overrides = Vec::new();

    for component in components {
        for template in component.templates {
            if let Some((previous, _)) = placed.get(template.dest) {
                if previous.layer == component.layer {
                    return Err(AppError::wiring(format!(
                        "`{}` and `{}` both provide {} in the {} layer",
                        previous.id,
                        component.id,
                        template.dest,
                        layer_name(component.layer)
                    )));
                }
                tracing::debug!(
                    path = template.dest,
                    replaced = previous.id,
                    by = component.id,
                    "Template overridden"
                );
                overrides.push(Override {
                    path: template.dest.to_string(),
                    replaced: previous.id.to_string(),
                    by: component.id.to_string(),
                });
            }
            placed.insert(template.dest, (*component, template));
        }
    }

    Ok((placed, overrides))
}

fn layer_name(layer: Layer) -> &'static str {
    layer.as_str()
}

fn verify_relative(path: &str) -> AppResult<()> {
    let escapes = Path::new(path).components().any(|component| {
        !matches!(component, PathComponent::Normal(_) | PathComponent::CurDir)
    });
    if escapes || path.is_empty() {
        return Err(AppError::wiring(format!("`{}` is not a relative project path", path)));
    }
    Ok(())
}

/// Whether `source` contains a `pub mod <name>;` or `mod <name>;` declaration.
fn declares(source: &str, name: &str) -> bool {
    let public = format!("pub mod {};", name);
    let private = format!("mod {};", name);
    source
        .lines()
        .map(str::trim)
        .any(|line| line == public || line == private)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::catalog::Condition;
    use crate::scaffold::options::{AuthStrategy, Authorization, Database};
    use crate::scaffold::wiring::RouteEntry;

    fn jwt_plan() -> Plan {
        let options = ScaffoldOptions::new("shop", Database::Postgresql, AuthStrategy::Jwt, Authorization::None);
        Plan::resolve(&options, &Secrets::fixed("shop")).unwrap()
    }

    fn edit(plan: &mut Plan, path: &str, from: &str, to: &str) {
        let file = plan.files.get_mut(path).unwrap();
        assert!(file.contents.contains(from), "{} lacks {:?}", path, from);
        file.contents = file.contents.replace(from, to);
    }

    fn assert_wiring_error(plan: &Plan, needle: &str) {
        match plan.verify() {
            Err(AppError::Wiring(message)) => {
                assert!(message.contains(needle), "unexpected message: {}", message)
            }
            other => panic!("expected a wiring error, got {:?}", other),
        }
    }

    fn leak(component: Component) -> &'static Component {
        Box::leak(Box::new(component))
    }

    #[test]
    fn test_resolved_plan_verifies() {
        assert!(jwt_plan().verify().is_ok());
    }

    #[test]
    fn test_same_layer_clash_is_rejected() {
        let first = leak(Component {
            id: "first",
            layer: Layer::Auth,
            when: Condition::Always,
            templates: &[TemplateSpec {
                id: "first/guard.rs",
                dest: "src/auth/guard.rs",
                source: "",
            }],
            dependencies: &[],
            env: &[],
            routes: &[],
        });
        let second = leak(Component {
            id: "second",
            layer: Layer::Auth,
            when: Condition::Always,
            templates: &[TemplateSpec {
                id: "second/guard.rs",
                dest: "src/auth/guard.rs",
                source: "",
            }],
            dependencies: &[],
            env: &[],
            routes: &[],
        });
        let later = leak(Component {
            id: "later",
            layer: Layer::Authorization,
            when: Condition::Always,
            templates: &[TemplateSpec {
                id: "later/guard.rs",
                dest: "src/auth/guard.rs",
                source: "",
            }],
            dependencies: &[],
            env: &[],
            routes: &[],
        });

        let result = place_templates(&[first, second]);
        assert!(matches!(result, Err(AppError::Wiring(ref m)) if m.contains("`first` and `second`")));

        let (placed, overrides) = place_templates(&[first, later]).unwrap();
        assert_eq!(placed["src/auth/guard.rs"].0.id, "later");
        assert_eq!(overrides[0].replaced, "first");
    }

    #[test]
    fn test_route_to_undeclared_module_is_rejected() {
        let mut plan = jwt_plan();
        plan.wiring.routes.push(RouteEntry::merged("ghost"));
        assert_wiring_error(&plan, "undeclared module `ghost`");
    }

    #[test]
    fn test_unregistered_route_is_rejected() {
        let mut plan = jwt_plan();
        edit(&mut plan, "src/routes.rs", ".merge(users::routes())", "");
        assert_wiring_error(&plan, "does not register");
    }

    #[test]
    fn test_mod_rs_missing_child_is_rejected() {
        let mut plan = jwt_plan();
        edit(&mut plan, "src/users/mod.rs", "pub mod handlers;", "");
        assert_wiring_error(&plan, "src/users/mod.rs does not declare module `handlers`");
    }

    #[test]
    fn test_undeclared_top_level_module_is_rejected() {
        let mut plan = jwt_plan();
        edit(&mut plan, "src/lib.rs", "pub mod users;", "");
        assert_wiring_error(&plan, "src/lib.rs does not declare module `users`");
    }

    #[test]
    fn test_empty_rendered_file_is_rejected() {
        let mut plan = jwt_plan();
        plan.files.get_mut("README.md").unwrap().contents = "  \n".to_string();
        assert_wiring_error(&plan, "`README.md` rendered empty");
    }

    #[test]
    fn test_missing_dependency_is_rejected() {
        let mut plan = jwt_plan();
        edit(&mut plan, "Cargo.toml", "jsonwebtoken = \"9\"", "");
        assert_wiring_error(&plan, "missing dependency `jsonwebtoken`");
    }

    #[test]
    fn test_missing_required_file_is_rejected() {
        let mut plan = jwt_plan();
        plan.files.remove("src/main.rs");
        assert_wiring_error(&plan, "required file `src/main.rs`");
    }

    #[test]
    fn test_verify_relative() {
        assert!(verify_relative("src/main.rs").is_ok());
        assert!(verify_relative("../outside.rs").is_err());
        assert!(verify_relative("/etc/passwd").is_err());
        assert!(verify_relative("").is_err());
    }

    #[test]
    fn test_declares() {
        let source = "// forge:modules:start\npub mod users;\nmod config;\n";
        assert!(declares(source, "users"));
        assert!(declares(source, "config"));
        assert!(!declares(source, "auth"));
    }
}
