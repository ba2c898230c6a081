// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `edit`: change the list in a text editor.

use std::fs;
use std::io::Write;
use std::process::Command;

use anyhow::{Context, Result, bail};

use super::edit::send_to_shell;
use crate::path_list::{PathVar, clean_list};

pub fn edit(var: &PathVar, editor: Vec<String>) -> Result<()> {
    pathy_os::assert_channel_is_pipe()?;

    let editor = resolve_editor(editor, std::env::var("EDITOR").ok())?;
    let entries = edit_entries(var.raw(), &editor)?;
    send_to_shell(var, &clean_list(&entries))
}

/// The editor command line: the given words, else `$EDITOR` split on
/// whitespace.
pub fn resolve_editor(given: Vec<String>, from_env: Option<String>) -> Result<Vec<String>> {
    if !given.is_empty() {
        return Ok(given);
    }
    let words: Vec<String> = from_env
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        bail!("no editor given and EDITOR is not set");
    }
    Ok(words)
}

/// Write `entries` one per line to a scratch file, let `editor` change it and
/// return the non-blank lines.
pub fn edit_entries(entries: &[String], editor: &[String]) -> Result<Vec<String>> {
    let Some((program, args)) = editor.split_first() else {
        bail!("empty editor command");
    };

    let mut file = tempfile::Builder::new()
        .prefix("pathy-")
        .suffix(".txt")
        .tempfile()
        .context("cannot create scratch file")?;
    for entry in entries {
        writeln!(file, "{}", entry)?;
    }
    file.flush()?;

    tracing::debug!(%program, file = %file.path().display(), "running editor");
    let status = Command::new(program)
        .args(args)
        .arg(file.path())
        .status()
        .with_context(|| format!("cannot run editor {}", program))?;
    if !status.success() {
        bail!("{}: {}", program, status);
    }

    let text = fs::read_to_string(file.path())
        .with_context(|| format!("cannot read {}", file.path().display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn test_resolve_editor_prefers_arguments() {
        let editor = resolve_editor(words(&["nano", "-w"]), Some("vim".to_string())).unwrap();
        assert_eq!(editor, ["nano", "-w"]);
    }

    #[test]
    fn test_resolve_editor_splits_environment() {
        let editor = resolve_editor(Vec::new(), Some(" code  --wait ".to_string())).unwrap();
        assert_eq!(editor, ["code", "--wait"]);
    }

    #[test]
    fn test_resolve_editor_requires_one() {
        let err = resolve_editor(Vec::new(), None).unwrap_err();
        assert_eq!(err.to_string(), "no editor given and EDITOR is not set");
        assert!(resolve_editor(Vec::new(), Some("  ".to_string())).is_err());
    }

    #[test]
    fn test_edit_entries_reads_back_changes() {
        let editor = words(&["sh", "-c", r#"printf '/bin\n\n  /usr/bin\n' > "$1""#, "sh"]);
        let entries = edit_entries(&words(&["/usr/bin", "/bin"]), &editor).unwrap();
        assert_eq!(entries, ["/bin", "/usr/bin"]);
    }

    #[test]
    fn test_edit_entries_unchanged_file() {
        let entries = edit_entries(&words(&["/usr/bin", "", "/bin"]), &words(&["true"])).unwrap();
        assert_eq!(entries, ["/usr/bin", "/bin"]);
    }

    #[test]
    fn test_edit_entries_editor_failure() {
        let err = edit_entries(&words(&["/bin"]), &words(&["false"])).unwrap_err();
        assert_eq!(err.to_string(), "false: exit status: 1");
    }
}
