//! `forge.json`: what was generated, so later commands can extend it.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::options::ScaffoldOptions;
use super::wiring::RouteEntry;
use crate::config::MANIFEST_FILE;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub generator_version: String,
    pub options: ScaffoldOptions,
    pub components: Vec<String>,
    pub modules: Vec<String>,
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub migrations: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    pub files: Vec<String>,
}

impl Manifest {
    /// Read the manifest of the project rooted at `root`.
    pub fn load(root: &Path) -> AppResult<Self> {
        let path = root.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::validation(format!(
                "No {} found in {}; is this a scaffolded project?",
                MANIFEST_FILE,
                root.display()
            )),
            _ => AppError::from(e),
        })?;

        serde_json::from_str(&raw)
            .map_err(|e| AppError::validation(format!("Invalid {}: {}", MANIFEST_FILE, e)))
    }

    pub fn to_json(&self) -> AppResult<String> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::internal(format!("Manifest serialization failed: {}", e)))?;
        json.push('\n');
        Ok(json)
    }

    pub fn save(&self, root: &Path) -> AppResult<()> {
        fs::write(root.join(MANIFEST_FILE), self.to_json()?)?;
        Ok(())
    }

    /// Record a file, keeping the list sorted and unique.
    pub fn track_file(&mut self, path: impl Into<String>) {
        let path = path.into();
        if let Err(index) = self.files.binary_search(&path) {
            self.files.insert(index, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::options::{AuthStrategy, Authorization, Database};

    fn manifest() -> Manifest {
        Manifest {
            generator_version: "0.1.0".to_string(),
            options: ScaffoldOptions::new(
                "demo",
                Database::Mysql,
                AuthStrategy::Local,
                Authorization::None,
            ),
            components: vec!["core".to_string()],
            modules: vec!["users".to_string()],
            routes: vec![RouteEntry::merged("users")],
            migrations: Vec::new(),
            resources: Vec::new(),
            files: vec!["Cargo.toml".to_string(), "src/main.rs".to_string()],
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let original = manifest();
        original.save(dir.path()).unwrap();

        let loaded = Manifest::load(dir.path()).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let result = Manifest::load(dir.path());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_track_file_keeps_order() {
        let mut manifest = manifest();
        manifest.track_file("src/lib.rs");
        manifest.track_file("src/lib.rs");
        assert_eq!(manifest.files, vec!["Cargo.toml", "src/lib.rs", "src/main.rs"]);
    }
}
