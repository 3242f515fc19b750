//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_SEPARATOR, ROLE_USER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::User => ROLE_USER,
        }
    }

    /// Parse a persisted role list; unknown entries are dropped.
    pub fn parse_list(raw: &str) -> Vec<UserRole> {
        raw.split(ROLE_SEPARATOR)
            .map(str::trim)
            .filter_map(|role| match role {
                ROLE_ADMIN => Some(UserRole::Admin),
                ROLE_USER => Some(UserRole::User),
                _ => None,
            })
            .collect()
    }

    /// Join roles into their persisted form.
    pub fn join_list(roles: &[UserRole]) -> String {
        roles
            .iter()
            .map(UserRole::as_str)
            .collect::<Vec<_>>()
            .join(&ROLE_SEPARATOR.to_string())
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub roles: Vec<UserRole>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unverified user with the `user` role
    pub fn new(id: Uuid, email: String, password_hash: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            name,
            roles: vec![UserRole::User],
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(UserRole::is_admin)
    }

    pub fn grant(&mut self, role: UserRole) {
        if !self.has_role(role) {
            self.roles.push(role);
            self.updated_at = Utc::now();
        }
    }

    pub fn verify(&mut self) {
        self.verified = true;
        self.updated_at = Utc::now();
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUser {
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// User display name
    #[schema(example = "John Doe")]
    pub name: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User display name
    #[schema(example = "John Doe")]
    pub name: String,
    /// Assigned roles
    #[schema(example = json!(["user"]))]
    pub roles: Vec<UserRole>,
    /// Whether the account has been verified
    pub verified: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            roles: user.roles,
            verified: user.verified,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(
            Uuid::new_v4(),
            "user@example.com".to_string(),
            "hash".to_string(),
            "User".to_string(),
        );
        assert_eq!(user.roles, vec![UserRole::User]);
        assert!(!user.verified);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_role_list_round_trip() {
        let roles = UserRole::parse_list("user, admin,unknown");
        assert_eq!(roles, vec![UserRole::User, UserRole::Admin]);
        assert_eq!(UserRole::join_list(&roles), "user,admin");
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut user = User::new(
            Uuid::new_v4(),
            "admin@example.com".to_string(),
            "hash".to_string(),
            "Admin".to_string(),
        );
        user.grant(UserRole::Admin);
        user.grant(UserRole::Admin);
        assert_eq!(user.roles, vec![UserRole::User, UserRole::Admin]);
        assert!(user.is_admin());
    }
}
