// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Commands that produce a new value for the variable.
//!
//! `put-first`, `put-last`, `rm` and `edit` cannot change the calling shell's
//! environment themselves. They write an `export` statement to fd 3, which the shell
//! function installed by `pathy activate` reads and evaluates.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::path_list::{Keys, PathVar, clean_list};

/// Where `put` places the given entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Last,
}

/// Print the export statement for the clean list.
pub fn export(var: &PathVar, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", var.export_statement(&var.clean()))?;
    Ok(())
}

/// The clean list with `dirs` added (or moved) to one end.
pub fn edited_list(var: &PathVar, dirs: &[String], position: Position) -> Vec<String> {
    match position {
        Position::First => clean_list(dirs.iter().chain(var.raw())),
        Position::Last => {
            let moved = clean_list(dirs);
            let kept = var.clean().into_iter().filter(|dir| !moved.contains(dir));
            kept.chain(moved.iter().cloned()).collect()
        }
    }
}

pub fn put(var: &PathVar, dirs: &[String], position: Position) -> Result<()> {
    pathy_os::assert_channel_is_pipe()?;
    send_to_shell(var, &edited_list(var, dirs, position))
}

/// Ask about every clean entry matching `keys` and send what is kept.
pub fn rm(var: &PathVar, keys: &Keys, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
    pathy_os::assert_channel_is_pipe()?;

    match kept_after_questions(var, keys, input, out)? {
        Some(kept) => send_to_shell(var, &kept),
        None => {
            writeln!(out, "Path is empty")?;
            Ok(())
        }
    }
}

/// The clean list minus the entries the user agreed to remove, or `None`
/// when there is nothing to ask about.
pub fn kept_after_questions(
    var: &PathVar,
    keys: &Keys,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Option<Vec<String>>> {
    let entries = var.clean();
    if entries.is_empty() {
        return Ok(None);
    }

    writeln!(out, "Going through {} in order. Answer 'y' to remove an entry.", var.name())?;
    let mut kept = Vec::with_capacity(entries.len());
    for dir in entries {
        if keys.matches(&dir) && confirm(&format!("Remove {}", dir), input, out)? {
            tracing::debug!(%dir, "removing entry");
            continue;
        }
        kept.push(dir);
    }
    Ok(Some(kept))
}

/// Yes/no question defaulting to no. End of input counts as no.
fn confirm(question: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    loop {
        write!(out, "{}? [yN] ", question)?;
        out.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer).context("cannot read answer")? == 0 {
            writeln!(out)?;
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "" | "n" | "no" => return Ok(false),
            _ => writeln!(out, "Please answer y or n.")?,
        }
    }
}

/// Write the export statement for `entries` to fd 3.
pub fn send_to_shell(var: &PathVar, entries: &[String]) -> Result<()> {
    let statement = var.export_statement(entries);
    tracing::debug!(%statement, "sending to shell");
    pathy_os::write_to_channel(&format!("{}\n", statement))
        .context("cannot send the new value to the shell")?;
    Ok(())
}
