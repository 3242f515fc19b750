use uuid::Uuid;

use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Wildcard over every other action
    Manage,
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// Wildcard over every subject
    All,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rule {
    action: Action,
    subject: Subject,
    /// Limits the rule to records owned by this user
    owner: Option<Uuid>,
}

impl Rule {
    fn matches(&self, action: Action, subject: Subject) -> bool {
        (self.action == Action::Manage || self.action == action)
            && (self.subject == Subject::All || self.subject == subject)
    }
}

/// The set of (action, subject) pairs one user is allowed
#[derive(Debug, Clone, Default)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    /// `admin` manages everything; `user` may read its own `User` record.
    pub fn for_user(id: Uuid, roles: &[UserRole]) -> Self {
        let mut ability = Self::default();
        for role in roles {
            match role {
                UserRole::Admin => ability.allow(Action::Manage, Subject::All),
                UserRole::User => ability.allow_owned(Action::Read, Subject::User, id),
            }
        }
        ability
    }

    pub fn allow(&mut self, action: Action, subject: Subject) {
        self.push(Rule {
            action,
            subject,
            owner: None,
        });
    }

    /// Grant `action` on `subject` records owned by `owner` only.
    pub fn allow_owned(&mut self, action: Action, subject: Subject, owner: Uuid) {
        self.push(Rule {
            action,
            subject,
            owner: Some(owner),
        });
    }

    fn push(&mut self, rule: Rule) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
    }

    /// Subject-level check: some rule grants `action`, whatever its owner.
    pub fn can(&self, action: Action, subject: Subject) -> bool {
        self.rules.iter().any(|rule| rule.matches(action, subject))
    }

    /// Record-level check against the record's owner.
    pub fn can_on(&self, action: Action, subject: Subject, owner: Uuid) -> bool {
        self.rules.iter().any(|rule| {
            rule.matches(action, subject) && rule.owner.map_or(true, |id| id == owner)
        })
    }

    pub fn check_on(&self, action: Action, subject: Subject, owner: Uuid) -> AppResult<()> {
        if self.can_on(action, subject, owner) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Like [`Ability::can`], as a `Forbidden` error.
    pub fn check(&self, action: Action, subject: Subject) -> AppResult<()> {
        if self.can(action, subject) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}
