// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Enumerating the items that path entries provide.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pathy_os::{Diagnostics, FileKind};

use crate::config::KnownPathVar;

/// A file (or, for variables that search subdirectories, a directory)
/// found in one path entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathItem {
    pub dir: String,
    pub name: String,
}

impl PathItem {
    pub fn path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.name)
    }
}

/// Items of one directory, sorted by name ignoring case.
///
/// A directory that cannot be opened provides nothing. Hidden names (leading
/// `.`) are skipped, as a shell glob would. Subdirectories are skipped unless
/// `known.subdirs` is set.
pub fn items_in(dir: &str, known: &KnownPathVar) -> Result<Vec<PathItem>> {
    let mut items = Vec::new();

    for name in pathy_os::list_entries(dir) {
        let name = name?.to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let item = PathItem {
            dir: dir.to_string(),
            name,
        };

        let path = item.path();
        let diagnostics = pathy_os::classify(&path)
            .with_context(|| format!("cannot inspect {}", path.display()))?;
        if diagnostics.kind() == Some(FileKind::Directory) && !known.subdirs {
            continue;
        }
        if let Diagnostics::Unavailable { error } = &diagnostics {
            tracing::debug!(path = %path.display(), %error, "keeping unusable entry");
        }
        items.push(item);
    }

    items.sort_by_cached_key(|item| item.name.to_lowercase());
    Ok(items)
}

/// Items of every directory, in path order.
pub fn items_in_all<S: AsRef<str>>(dirs: &[S], known: &KnownPathVar) -> Result<Vec<PathItem>> {
    let mut items = Vec::new();
    for dir in dirs {
        items.extend(items_in(dir.as_ref(), known)?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathyConfig;
    use std::fs;
    use tempfile::TempDir;

    fn dir_str(dir: &TempDir) -> String {
        dir.path().to_str().unwrap().to_string()
    }

    #[test]
    fn test_items_sorted_without_subdirs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b"), "").unwrap();
        fs::write(dir.path().join("A"), "").unwrap();
        fs::write(dir.path().join(".profile"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let known = PathyConfig::default().known_var("PATH");
        let names: Vec<_> = items_in(&dir_str(&dir), &known)
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, ["A", "b"]);
    }

    #[test]
    fn test_items_include_subdirs_when_known() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mod.py"), "").unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let known = PathyConfig::default().known_var("PYTHONPATH");
        let names: Vec<_> = items_in(&dir_str(&dir), &known)
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, ["mod.py", "pkg"]);
    }

    #[test]
    fn test_items_in_all_follow_path_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("z"), "").unwrap();
        fs::write(second.path().join("a"), "").unwrap();

        let known = PathyConfig::default().known_var("PATH");
        let dirs = [dir_str(&first), "/no/such/dir".to_string(), dir_str(&second)];
        let items = items_in_all(&dirs, &known).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path(), first.path().join("z"));
        assert_eq!(items[1].path(), second.path().join("a"));
    }
}
