//! Writing a resolved plan to disk.

use std::fs;
use std::path::{Path, PathBuf};

use super::plan::Plan;
use crate::errors::{AppError, AppResult};

/// How existing files at the target are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Report only
    DryRun,
    /// Refuse to touch a non-empty directory
    CreateNew,
    /// Replace existing files, create missing ones
    Overwrite,
}

/// Paths (relative to the project root) that were, or would be, written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub created: Vec<String>,
    pub overwritten: Vec<String>,
}

impl WriteReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.overwritten.len()
    }
}

/// Write every file of `plan` under `root`.
pub fn write_plan(plan: &Plan, root: &Path, mode: WriteMode) -> AppResult<WriteReport> {
    if mode == WriteMode::CreateNew && !is_empty_dir(root)? {
        return Err(AppError::conflict(format!("Directory {}", root.display())));
    }

    let mut report = WriteReport::default();
    for file in plan.files() {
        let target = root.join(&file.path);
        if target.exists() {
            report.overwritten.push(file.path.clone());
        } else {
            report.created.push(file.path.clone());
        }

        if mode == WriteMode::DryRun {
            continue;
        }
        write_file(&target, &file.contents)?;
        tracing::debug!(path = %file.path, component = %file.component, "File written");
    }

    tracing::info!(
        root = %root.display(),
        created = report.created.len(),
        overwritten = report.overwritten.len(),
        dry_run = mode == WriteMode::DryRun,
        "Plan written"
    );
    Ok(report)
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn is_empty_dir(path: &Path) -> AppResult<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if !path.is_dir() {
        return Err(AppError::conflict(format!("File {}", path.display())));
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Resolve the directory a new project is written to.
pub fn project_root(parent: &Path, project_name: &str) -> PathBuf {
    parent.join(project_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_empty_dir(dir.path()).unwrap());
        assert!(is_empty_dir(&dir.path().join("missing")).unwrap());

        fs::write(dir.path().join("file.txt"), "x").unwrap();
        assert!(!is_empty_dir(dir.path()).unwrap());
        assert!(is_empty_dir(&dir.path().join("file.txt")).is_err());
    }

    #[test]
    fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src/users/mod.rs");
        write_file(&target, "pub mod handlers;\n").unwrap();
        assert_eq!(fs::read_to_string(target).unwrap(), "pub mod handlers;\n");
    }
}
