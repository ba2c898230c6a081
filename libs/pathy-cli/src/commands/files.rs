// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Commands that look at the files path entries provide.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use anyhow::{Result, bail};

use crate::path_list::{Keys, PathVar};
use crate::scan::items_in_all;

/// Sorted, unique item names across all entries.
pub fn ls_names(var: &PathVar, keys: &Keys, out: &mut impl Write) -> Result<()> {
    let names: BTreeSet<String> = items_in_all(&var.clean(), &var.known)?
        .into_iter()
        .map(|item| item.name)
        .filter(|name| var.known.accepts_name(name) && keys.matches(name))
        .collect();

    for name in names {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

/// Full paths of every item, entries in path order.
pub fn ls_files(var: &PathVar, keys: &Keys, out: &mut impl Write) -> Result<()> {
    for item in items_in_all(&var.clean(), &var.known)? {
        let path = item.path();
        if keys.matches(&path.to_string_lossy()) {
            writeln!(out, "{}", path.display())?;
        }
    }
    Ok(())
}

/// First match for each name, trying the variable's extensions.
pub fn which(var: &PathVar, names: &[String], out: &mut impl Write) -> Result<()> {
    let dirs = var.clean();
    let mut missing = Vec::new();

    for name in names {
        let found = dirs.iter().find_map(|dir| {
            var.known
                .candidate_names(name)
                .into_iter()
                .map(|candidate| std::path::Path::new(dir).join(candidate))
                .find(|path| std::fs::symlink_metadata(path).is_ok())
        });
        match found {
            Some(path) => writeln!(out, "{}", path.display())?,
            None => missing.push(name.as_str()),
        }
    }

    if !missing.is_empty() {
        bail!("not found in {}: {}", var.name(), missing.join(", "));
    }
    Ok(())
}

/// Names provided by more than one entry, with every entry providing them.
pub fn shadow(var: &PathVar, keys: &Keys, out: &mut impl Write) -> Result<()> {
    let mut providers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in items_in_all(&var.clean(), &var.known)? {
        if keys.matches(&item.name) {
            providers.entry(item.name).or_default().push(item.dir);
        }
    }

    let mut first = true;
    for (name, dirs) in providers.iter().filter(|(_, dirs)| dirs.len() > 1) {
        if !first {
            writeln!(out)?;
        }
        first = false;
        writeln!(out, "{}", name)?;
        for dir in dirs {
            writeln!(out, "* {}", dir)?;
        }
    }
    Ok(())
}
