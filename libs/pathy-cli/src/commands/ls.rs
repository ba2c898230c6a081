// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::io::Write;

use anyhow::Result;

use crate::path_list::{Keys, PathVar};

/// Print raw entries in order, annotating the ones that cannot be used.
pub fn run(var: &PathVar, keys: &Keys, out: &mut impl Write) -> Result<()> {
    for entry in var.raw() {
        if !keys.matches(entry) {
            continue;
        }
        match pathy_os::classify(entry)?.error() {
            Some(error) => writeln!(out, "{}  [{}]", entry, error)?,
            None => writeln!(out, "{}", entry)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathyConfig;
    use tempfile::TempDir;

    #[test]
    fn test_ls_annotates_missing_entries() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().to_str().unwrap().to_string();
        let missing = dir.path().join("missing").to_str().unwrap().to_string();
        let var = PathVar::from_value(
            PathyConfig::default().known_var("PATH"),
            &format!("{}:{}", present, missing),
        );

        let mut out = Vec::new();
        run(&var, &Keys::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], present);
        assert!(lines[1].starts_with(&format!("{}  [", missing)), "{}", lines[1]);
    }

    #[test]
    fn test_ls_filters_by_key() {
        let var = PathVar::from_value(PathyConfig::default().known_var("PATH"), "/usr/bin:/bin");
        let mut out = Vec::new();
        run(&var, &Keys::new(["USR"]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
