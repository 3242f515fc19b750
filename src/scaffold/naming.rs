//! Identifier case conversions shared by the catalog and resource generator.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{
    MAX_PROJECT_NAME_LENGTH, RESERVED_PROJECT_NAMES, RESERVED_RESOURCE_MODULES,
    RESERVED_RESOURCE_TYPES, RUST_KEYWORDS,
};
use crate::errors::{AppError, AppResult};

static PROJECT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("static regex is valid"));

static RESOURCE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static regex is valid"));

/// Convert to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c == '-' || c == ' ' {
            result.push('_');
        } else if c.is_uppercase() {
            if i > 0 && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Naive English plural, good enough for resource and table names
pub fn pluralize(s: &str) -> String {
    if s.ends_with('s') || s.ends_with('x') || s.ends_with("ch") || s.ends_with("sh") {
        return format!("{}es", s);
    }
    if let Some(stem) = s.strip_suffix('y') {
        let before_vowel = stem
            .chars()
            .last()
            .map(|c| "aeiou".contains(c))
            .unwrap_or(false);
        if !before_vowel && !stem.is_empty() {
            return format!("{}ies", stem);
        }
    }
    format!("{}s", s)
}

/// Validate a project name so it can be used as a crate and directory name.
pub fn validate_project_name(name: &str) -> AppResult<()> {
    if name.len() > MAX_PROJECT_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Project name must be at most {} characters",
            MAX_PROJECT_NAME_LENGTH
        )));
    }
    if !PROJECT_NAME.is_match(name) {
        return Err(AppError::validation(
            "Project name must start with a letter and contain only letters, digits, '-' or '_'",
        ));
    }
    if RESERVED_PROJECT_NAMES.contains(&to_snake_case(name).as_str()) {
        return Err(AppError::validation(format!("'{}' is a reserved name", name)));
    }
    Ok(())
}

/// Validate a resource name against every identifier it is rendered as:
/// the singular and plural snake_case modules and the PascalCase type.
pub fn validate_resource_name(name: &str) -> AppResult<()> {
    if !RESOURCE_NAME.is_match(name) {
        return Err(AppError::validation(
            "Resource name must start with a letter and contain only letters, digits or '_'",
        ));
    }

    let snake = to_snake_case(name);
    let module = pluralize(&snake);
    let pascal = to_pascal_case(&snake);

    if let Some(keyword) = [&snake, &module]
        .into_iter()
        .find(|ident| RUST_KEYWORDS.contains(&ident.as_str()))
    {
        return Err(AppError::validation(format!(
            "Resource name '{}' becomes the keyword `{}`",
            name, keyword
        )));
    }
    if RESERVED_RESOURCE_MODULES.contains(&module.as_str()) {
        return Err(AppError::validation(format!(
            "Resource name '{}' clashes with the generated `{}` module",
            name, module
        )));
    }
    if RESERVED_RESOURCE_TYPES.contains(&pascal.as_str()) {
        return Err(AppError::validation(format!(
            "Resource name '{}' would shadow the `{}` type",
            name, pascal
        )));
    }
    Ok(())
}
