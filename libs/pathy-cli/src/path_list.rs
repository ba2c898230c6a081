// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Splitting, normalizing and joining `PATH`-like values.

use std::collections::HashSet;

use crate::config::{KnownPathVar, PathyConfig};

/// Separator between entries of a path variable.
pub const SEPARATOR: char = ':';

/// One path variable as found in the environment.
#[derive(Debug, Clone)]
pub struct PathVar {
    pub known: KnownPathVar,
    raw: Vec<String>,
}

impl PathVar {
    /// Read `name` from the environment. Unset and empty are both no entries.
    pub fn from_env(name: &str, config: &PathyConfig) -> Self {
        let value = std::env::var_os(name)
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!(var = name, value = %value, "read path variable");
        Self::from_value(config.known_var(name), &value)
    }

    pub fn from_value(known: KnownPathVar, value: &str) -> Self {
        Self {
            known,
            raw: split(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.known.name
    }

    /// Entries exactly as they appear in the variable.
    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    /// Normalized entries with duplicates removed.
    pub fn clean(&self) -> Vec<String> {
        clean_list(self.raw.iter())
    }

    /// `export NAME=<entries>` for the given list.
    pub fn export_statement<S: AsRef<str>>(&self, entries: &[S]) -> String {
        format!("export {}={}", self.name(), join(entries))
    }
}

pub fn split(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(SEPARATOR).map(str::to_string).collect()
}

pub fn join<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// Lexically normalize one entry: collapse repeated `/`, drop `.` components
/// and trailing `/`, fold `dir/..`. A blank entry means the current
/// directory and becomes `.`.
pub fn clean_entry(entry: &str) -> String {
    let rooted = entry.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in entry.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // `/..` is `/`.
                _ if rooted => {}
                _ => parts.push(".."),
            },
            part => parts.push(part),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Normalize every entry and keep only the first occurrence of each.
pub fn clean_list<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(|entry| clean_entry(entry.as_ref()))
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

/// Case-insensitive substring filter given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Keys {
    keys: Vec<String>,
}

impl Keys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|key| key.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// True when no keys were given or any key occurs in `text`.
    pub fn matches(&self, text: &str) -> bool {
        if self.keys.is_empty() {
            return true;
        }
        let text = text.to_lowercase();
        self.keys.iter().any(|key| text.contains(key.as_str()))
    }
}
