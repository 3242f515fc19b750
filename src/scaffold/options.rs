//! Scaffolding options: the database x auth strategy x authorization matrix.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::naming::{to_snake_case, validate_project_name};
use crate::errors::AppResult;

/// Database engine backing the generated data-access layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Mysql,
    #[value(alias = "postgres")]
    #[serde(alias = "postgres")]
    Postgresql,
    #[value(alias = "mongo")]
    #[serde(alias = "mongo")]
    Mongodb,
}

/// How a database is accessed: relational ORM or document driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Sql,
    Document,
}

impl Database {
    pub const ALL: [Database; 3] = [Database::Mysql, Database::Postgresql, Database::Mongodb];

    pub fn storage(self) -> StorageKind {
        match self {
            Database::Mysql | Database::Postgresql => StorageKind::Sql,
            Database::Mongodb => StorageKind::Document,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Database::Mysql => "mysql",
            Database::Postgresql => "postgresql",
            Database::Mongodb => "mongodb",
        }
    }
}

/// Authentication strategy of the generated backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    /// Bearer access/refresh tokens
    Jwt,
    /// Form login backed by a server-side session
    #[value(alias = "passport-local")]
    #[serde(alias = "passport-local")]
    Local,
    /// Authorization-code login backed by a server-side session
    Oauth2,
}

/// Whether requests carry credentials in a header or in a session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    Bearer,
    Session,
}

impl AuthStrategy {
    pub const ALL: [AuthStrategy; 3] = [AuthStrategy::Jwt, AuthStrategy::Local, AuthStrategy::Oauth2];

    pub fn kind(self) -> AuthKind {
        match self {
            AuthStrategy::Jwt => AuthKind::Bearer,
            AuthStrategy::Local | AuthStrategy::Oauth2 => AuthKind::Session,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthStrategy::Jwt => "jwt",
            AuthStrategy::Local => "local",
            AuthStrategy::Oauth2 => "oauth2",
        }
    }
}

/// Authorization model layered on top of authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Authorization {
    None,
    /// Role-derived abilities checked by a policies guard
    #[value(alias = "casl")]
    #[serde(alias = "casl")]
    Policies,
}

impl Authorization {
    pub const ALL: [Authorization; 2] = [Authorization::None, Authorization::Policies];

    pub fn as_str(self) -> &'static str {
        match self {
            Authorization::None => "none",
            Authorization::Policies => "policies",
        }
    }
}

/// Everything the generator needs to know about the project to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldOptions {
    pub project_name: String,
    pub database: Database,
    pub auth: AuthStrategy,
    pub authz: Authorization,
}

impl ScaffoldOptions {
    pub fn new(
        project_name: impl Into<String>,
        database: Database,
        auth: AuthStrategy,
        authz: Authorization,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            database,
            auth,
            authz,
        }
    }

    /// Check the options describe a project that can be generated.
    pub fn validate(&self) -> AppResult<()> {
        validate_project_name(&self.project_name)
    }

    /// Crate identifier of the generated project (`my-api` -> `my_api`).
    pub fn crate_name(&self) -> String {
        to_snake_case(&self.project_name)
    }

    pub fn storage(&self) -> StorageKind {
        self.database.storage()
    }

    pub fn auth_kind(&self) -> AuthKind {
        self.auth.kind()
    }

    /// Short label such as `postgresql/jwt/policies`.
    pub fn label(&self) -> String {
        format!(
            "{}/{}/{}",
            self.database.as_str(),
            self.auth.as_str(),
            self.authz.as_str()
        )
    }

    /// Every supported combination of the option matrix.
    pub fn all_combinations(project_name: &str) -> Vec<ScaffoldOptions> {
        let mut combinations = Vec::with_capacity(
            Database::ALL.len() * AuthStrategy::ALL.len() * Authorization::ALL.len(),
        );
        for database in Database::ALL {
            for auth in AuthStrategy::ALL {
                for authz in Authorization::ALL {
                    combinations.push(ScaffoldOptions::new(project_name, database, auth, authz));
                }
            }
        }
        combinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_kinds() {
        assert_eq!(Database::Mongodb.storage(), StorageKind::Document);
        assert_eq!(Database::Mysql.storage(), StorageKind::Sql);
        assert_eq!(AuthStrategy::Jwt.kind(), AuthKind::Bearer);
        assert_eq!(AuthStrategy::Oauth2.kind(), AuthKind::Session);
    }

    #[test]
    fn test_matrix_size() {
        assert_eq!(ScaffoldOptions::all_combinations("demo").len(), 18);
    }

    #[test]
    fn test_serde_aliases() {
        let auth: AuthStrategy = serde_json::from_str("\"passport-local\"").unwrap();
        assert_eq!(auth, AuthStrategy::Local);
        let authz: Authorization = serde_json::from_str("\"casl\"").unwrap();
        assert_eq!(authz, Authorization::Policies);
    }

    #[test]
    fn test_crate_name_and_label() {
        let options = ScaffoldOptions::new(
            "shop-api",
            Database::Postgresql,
            AuthStrategy::Jwt,
            Authorization::Policies,
        );
        assert_eq!(options.crate_name(), "shop_api");
        assert_eq!(options.label(), "postgresql/jwt/policies");
    }
}
