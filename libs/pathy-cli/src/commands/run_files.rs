// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `pathy run-files`: feed every file path to a program's stdin.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use crate::path_list::PathVar;
use crate::scan::items_in_all;

pub fn run(var: &PathVar, command: &[String]) -> Result<()> {
    let items = items_in_all(&var.clean(), &var.known)?;

    let child = pathy_os::start(command)
        .with_context(|| format!("cannot run {}", command[0]))?;
    tracing::debug!(pid = child.pid(), files = items.len(), "feeding file names");

    // stdout is the child's stdin until `wait`, which must run regardless.
    let fed = feed(items.iter().map(|item| item.path()));
    let status = pathy_os::wait(child)?;

    match fed {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("{} stopped reading its input", command[0]);
        }
        other => other.context("cannot feed file names")?,
    }
    if !status.success() {
        bail!("{}: {}", command[0], status);
    }
    Ok(())
}

fn feed(paths: impl Iterator<Item = std::path::PathBuf>) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for path in paths {
        writeln!(stdout, "{}", path.display())?;
    }
    stdout.flush()
}
