// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! User configuration via `pathy.yaml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// How the entries of a path variable are searched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnownPathVar {
    pub name: String,
    /// Subdirectories of an entry count as items (packages, `cd` targets).
    #[serde(default)]
    pub subdirs: bool,
    /// File extensions tried by `which` and required by `ls-names`.
    /// Empty means any file.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl KnownPathVar {
    fn new(name: &str, subdirs: bool, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            subdirs,
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    /// Whether a file name belongs to this variable's vocabulary.
    pub fn accepts_name(&self, name: &str) -> bool {
        self.extensions.is_empty() || self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Candidate file names for `which <name>`, the bare name first.
    pub fn candidate_names(&self, name: &str) -> Vec<String> {
        let mut names = vec![name.to_string()];
        names.extend(
            self.extensions
                .iter()
                .filter(|ext| !name.ends_with(ext.as_str()))
                .map(|ext| format!("{}{}", name, ext)),
        );
        names
    }
}

/// Variables pathy knows how to search without any configuration.
pub fn builtin_known_vars() -> Vec<KnownPathVar> {
    vec![
        KnownPathVar::new("CDPATH", true, &[]),
        KnownPathVar::new("GEM_PATH", false, &[".rb"]),
        KnownPathVar::new("PATH", false, &[]),
        KnownPathVar::new("PYTHONPATH", true, &[".py", ".pyc"]),
    ]
}

/// Configuration from `pathy.yaml`.
#[derive(Debug, Default, Deserialize)]
pub struct PathyConfig {
    /// Extra known variables. An entry named like a built-in replaces it.
    #[serde(default)]
    pub known_vars: Vec<KnownPathVar>,
}

impl PathyConfig {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "pathy.yaml";

    /// Environment variable overriding the configuration file location.
    pub const PATH_ENV: &'static str = "PATHY_CONFIG";

    /// `$PATHY_CONFIG`, else `<config dir>/pathy/pathy.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        match std::env::var_os(Self::PATH_ENV) {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => dirs::config_dir().map(|dir| dir.join("pathy").join(Self::FILE_NAME)),
        }
    }

    /// Load configuration from a file. Returns error if the file is missing
    /// or cannot be parsed.
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        tracing::debug!("Loaded pathy config from {}", config_path.display());
        Ok(config)
    }

    /// Load configuration from a file, returning defaults if the file is
    /// missing or unparseable.
    pub fn load_or_default(config_path: Option<&Path>) -> Self {
        let Some(config_path) = config_path else {
            tracing::debug!("No config directory, using defaults");
            return Self::default();
        };

        if !config_path.exists() {
            tracing::debug!("No {} found, using defaults", config_path.display());
            return Self::default();
        }

        match Self::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Search rules for `name`. Unknown variables get plain rules.
    pub fn known_var(&self, name: &str) -> KnownPathVar {
        self.known_vars
            .iter()
            .rev()
            .find(|var| var.name == name)
            .cloned()
            .or_else(|| builtin_known_vars().into_iter().find(|var| var.name == name))
            .unwrap_or_else(|| KnownPathVar::new(name, false, &[]))
    }
}
