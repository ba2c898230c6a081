// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! pathy CLI
//!
//! Inspect and edit `PATH` and similar environment variables.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;
mod config;
mod path_list;
mod scan;

use commands::edit::Position;
use config::PathyConfig;
use path_list::{Keys, PathVar};

#[derive(Parser)]
#[command(name = "pathy")]
#[command(about = "Work with PATH and similar environment variables", long_about = None)]
// `-V` selects the variable; the version is a subcommand.
#[command(disable_version_flag = true)]
struct Cli {
    /// Environment variable to work on
    #[arg(short = 'V', long = "var", value_name = "NAME", default_value = "PATH", global = true)]
    var: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List path entries (in order from first to last)
    Ls {
        /// Only entries containing one of these (ignoring case)
        keys: Vec<String>,
    },

    /// List all files in path (names only)
    LsNames { keys: Vec<String> },

    /// List all files in path (full pathnames)
    LsFiles { keys: Vec<String> },

    /// Run program, feeding it filenames on stdin
    RunFiles {
        /// Program and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Add or move the given entries to the beginning of the path
    PutFirst {
        #[arg(required = true, value_name = "DIR")]
        dirs: Vec<String>,
    },

    /// Add or move the given entries to the end of the path
    PutLast {
        #[arg(required = true, value_name = "DIR")]
        dirs: Vec<String>,
    },

    /// Interactively remove entries from the path
    Rm { keys: Vec<String> },

    /// Edit the path in a text editor (default: $EDITOR)
    Edit {
        /// Editor and its arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "EDITOR")]
        editor: Vec<String>,
    },

    /// See which file matches first in path
    Which {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Show name conflicts
    Shadow { keys: Vec<String> },

    /// Find potential path problems
    Doctor,

    /// Generate an export statement in shell syntax
    Export,

    /// Print the shell function; try: eval "$(pathy activate)"
    Activate {
        /// Shell to print completions for
        #[arg(long, value_enum, default_value_t = Shell::Bash)]
        shell: Shell,
    },

    /// Print a shell completion script
    Complete {
        #[arg(value_enum, default_value_t = Shell::Bash)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout may feed a child and fd 3 is the shell's channel, so logs go
    // to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PATHY_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pathy: error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = PathyConfig::load_or_default(PathyConfig::default_path().as_deref());
    let var = PathVar::from_env(&cli.var, &config);
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Ls { keys } => commands::ls::run(&var, &Keys::new(keys), &mut out)?,
        Commands::LsNames { keys } => commands::files::ls_names(&var, &Keys::new(keys), &mut out)?,
        Commands::LsFiles { keys } => commands::files::ls_files(&var, &Keys::new(keys), &mut out)?,
        Commands::RunFiles { command } => {
            drop(out);
            return commands::run_files::run(&var, &command);
        }
        Commands::PutFirst { dirs } => commands::edit::put(&var, &dirs, Position::First)?,
        Commands::PutLast { dirs } => commands::edit::put(&var, &dirs, Position::Last)?,
        Commands::Rm { keys } => {
            let mut input = io::stdin().lock();
            commands::edit::rm(&var, &Keys::new(keys), &mut input, &mut out)?
        }
        Commands::Edit { editor } => {
            drop(out);
            return commands::editor::edit(&var, editor);
        }
        Commands::Which { names } => commands::files::which(&var, &names, &mut out)?,
        Commands::Shadow { keys } => commands::files::shadow(&var, &Keys::new(keys), &mut out)?,
        Commands::Doctor => commands::doctor::run(&var, &mut out)?,
        Commands::Export => commands::edit::export(&var, &mut out)?,
        Commands::Activate { shell } => {
            commands::activate::activate(shell, &mut Cli::command(), &mut out)?
        }
        Commands::Complete { shell } => {
            commands::activate::complete(shell, &mut Cli::command(), &mut out)?
        }
        Commands::Version => commands::activate::version(&mut out)?,
    }

    out.flush()?;
    Ok(())
}
