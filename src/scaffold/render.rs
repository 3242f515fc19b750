//! Template rendering on top of minijinja.

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{self, TemplateSpec, CATALOG};
use super::naming::{pluralize, to_pascal_case, to_snake_case};
use super::options::{AuthKind, AuthStrategy, Authorization, Database, ScaffoldOptions, StorageKind};
use super::wiring::{DependencyLine, EnvLine, RouteLine, Wiring};
use crate::errors::AppResult;

/// Version stamped into generated manifests
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Secrets written to the generated `.env`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secrets {
    pub access_token: String,
    pub refresh_token: String,
    pub session: String,
}

impl Secrets {
    /// Fresh random secrets. The session secret is 64 bytes, enough for a signing key.
    pub fn generate() -> Self {
        Self {
            access_token: random_hex(1),
            refresh_token: random_hex(1),
            session: random_hex(2),
        }
    }

    /// Fixed secrets for reproducible output.
    pub fn fixed(seed: &str) -> Self {
        Self {
            access_token: format!("{seed}-access-token-secret-0000000000000000"),
            refresh_token: format!("{seed}-refresh-token-secret-000000000000000"),
            session: format!("{seed}-session-secret-{}", "0".repeat(64)),
        }
    }
}

fn random_hex(blocks: usize) -> String {
    (0..blocks).map(|_| Uuid::new_v4().simple().to_string()).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectContext {
    pub name: String,
    pub crate_name: String,
    pub pascal_name: String,
}

/// Options flattened into flags templates can branch on
#[derive(Debug, Clone, Serialize)]
pub struct OptionsContext {
    pub database: &'static str,
    pub auth: &'static str,
    pub authz: &'static str,
    pub sql: bool,
    pub mongodb: bool,
    pub mysql: bool,
    pub postgresql: bool,
    pub bearer: bool,
    pub session: bool,
    pub jwt: bool,
    pub local: bool,
    pub oauth2: bool,
    pub credentials: bool,
    pub policies: bool,
}

impl From<&ScaffoldOptions> for OptionsContext {
    fn from(options: &ScaffoldOptions) -> Self {
        Self {
            database: options.database.as_str(),
            auth: options.auth.as_str(),
            authz: options.authz.as_str(),
            sql: options.storage() == StorageKind::Sql,
            mongodb: options.database == Database::Mongodb,
            mysql: options.database == Database::Mysql,
            postgresql: options.database == Database::Postgresql,
            bearer: options.auth_kind() == AuthKind::Bearer,
            session: options.auth_kind() == AuthKind::Session,
            jwt: options.auth == AuthStrategy::Jwt,
            local: options.auth == AuthStrategy::Local,
            oauth2: options.auth == AuthStrategy::Oauth2,
            credentials: options.auth != AuthStrategy::Oauth2,
            policies: options.authz == Authorization::Policies,
        }
    }
}

/// Names a generated resource module is rendered with
#[derive(Debug, Clone, Serialize)]
pub struct ResourceContext {
    /// `blog_post`
    pub name: String,
    /// `BlogPost`
    pub pascal: String,
    /// `blog_posts`: module, table, collection and route segment
    pub module: String,
}

impl ResourceContext {
    pub fn new(name: &str) -> Self {
        let snake = to_snake_case(name);
        Self {
            pascal: to_pascal_case(&snake),
            module: pluralize(&snake),
            name: snake,
        }
    }
}

/// Everything a template can reference
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub generator_version: &'static str,
    pub project: ProjectContext,
    pub options: OptionsContext,
    pub secrets: Secrets,
    pub dependencies: Vec<DependencyLine>,
    pub env: Vec<EnvLine>,
    pub modules: Vec<String>,
    pub submodules: BTreeMap<String, Vec<String>>,
    pub routes: Vec<RouteLine>,
    pub migrations: Vec<String>,
    pub resource: Option<ResourceContext>,
}

impl RenderContext {
    pub fn new(options: &ScaffoldOptions, secrets: &Secrets) -> Self {
        Self {
            generator_version: GENERATOR_VERSION,
            project: ProjectContext {
                name: options.project_name.clone(),
                crate_name: options.crate_name(),
                pascal_name: to_pascal_case(&options.project_name),
            },
            options: OptionsContext::from(options),
            secrets: secrets.clone(),
            dependencies: Vec::new(),
            env: Vec::new(),
            modules: Vec::new(),
            submodules: BTreeMap::new(),
            routes: Vec::new(),
            migrations: Vec::new(),
            resource: None,
        }
    }

    /// Attach the wiring. Env values are expected to be rendered already.
    pub fn with_wiring(mut self, wiring: &Wiring, env: Vec<EnvLine>) -> Self {
        self.dependencies = wiring.dependencies.clone();
        self.env = env;
        self.modules = wiring.modules.clone();
        self.submodules = wiring.submodules.clone();
        self.routes = wiring.route_lines();
        self.migrations = wiring
            .submodules
            .get("migrations")
            .cloned()
            .unwrap_or_default();
        self
    }

    pub fn with_resource(mut self, resource: ResourceContext) -> Self {
        self.resource = Some(resource);
        self
    }
}

/// minijinja environment holding every catalog template
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> AppResult<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        // output is source code; view markup escapes at the generated app's runtime
        env.set_auto_escape_callback(|_| AutoEscape::None);

        env.add_filter("snake_case", |value: String| to_snake_case(&value));
        env.add_filter("pascal_case", |value: String| to_pascal_case(&value));
        env.add_filter("plural", |value: String| pluralize(&value));

        for component in CATALOG {
            for template in component.templates {
                add(&mut env, template)?;
            }
        }
        add(&mut env, &catalog::support::MOD_RS)?;
        for template in [
            &catalog::resource::MOD,
            &catalog::resource::SERVICE,
            &catalog::resource::HANDLERS_BEARER,
            &catalog::resource::HANDLERS_SESSION,
            &catalog::resource::ENTITY_SQL,
            &catalog::resource::ENTITY_MONGODB,
            &catalog::resource::REPOSITORY_SQL,
            &catalog::resource::REPOSITORY_MONGODB,
            &catalog::resource::MIGRATION,
        ] {
            add(&mut env, template)?;
        }

        Ok(Self { env })
    }

    /// Render a registered template by id.
    pub fn render<S: Serialize>(&self, id: &str, context: S) -> AppResult<String> {
        let template = self.env.get_template(id)?;
        Ok(template.render(context)?)
    }

    /// Render an inline template string (used for `.env` values).
    pub fn render_str<S: Serialize>(&self, source: &str, context: S) -> AppResult<String> {
        Ok(self.env.render_str(source, context)?)
    }
}

fn add(env: &mut Environment<'static>, template: &'static TemplateSpec) -> AppResult<()> {
    env.add_template(template.id, template.source)?;
    Ok(())
}
