// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap_complete::Shell;

/// Print the shell function that lets `pathy` edit the calling shell's
/// variables, then its completions. Use as `eval "$(pathy activate)"`.
pub fn activate(shell: Shell, cli: &mut clap::Command, out: &mut impl Write) -> Result<()> {
    let bin = pathy_os::executable_path()?;
    write!(out, "{}", activation_script(&bin))?;
    complete(shell, cli, out)
}

/// Print the completion script for `shell`.
pub fn complete(shell: Shell, cli: &mut clap::Command, out: &mut impl Write) -> Result<()> {
    clap_complete::generate(shell, cli, "pathy", out);
    Ok(())
}

/// fd 3 of the inner invocation is captured and evaluated; its stdout goes
/// to the terminal through fd 4.
pub fn activation_script(bin: &Path) -> String {
    format!(
        r#"_pathy_bin={}

pathy() {{
    exec 4>&1
    IFS= _pathy_fd3=$("$_pathy_bin" "$@" 3>&1 >&4) || return
    eval "$_pathy_fd3"
    unset _pathy_fd3
}}
"#,
        shell_quote(&bin.to_string_lossy())
    )
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

pub fn version(out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "pathy {} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )?;
    Ok(())
}
