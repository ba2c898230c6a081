// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `pathy doctor`: find entries likely to cause surprises.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;

use anyhow::Result;
use pathy_os::{Diagnostics, FileKind};

use crate::path_list::{PathVar, clean_entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Style,
    Security,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style => f.write_str("style"),
            Self::Security => f.write_str("security"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Duplicate,
    Blank,
    CurrentDirectory,
    Relative,
    Unusable(String),
    NotADirectory(FileKind),
    WorldWritable,
}

impl Problem {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Duplicate | Self::Unusable(_) | Self::NotADirectory(_) => Severity::Style,
            Self::Blank | Self::CurrentDirectory | Self::Relative | Self::WorldWritable => {
                Severity::Security
            }
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => f.write_str("Duplicate entry."),
            Self::Blank => f.write_str("Blank entry (interpreted as current directory)."),
            Self::CurrentDirectory => f.write_str("Current directory in path."),
            Self::Relative => f.write_str("Relative directory in path."),
            Self::Unusable(error) => write!(f, "Entry cannot be used: {}.", error),
            Self::NotADirectory(kind) => write!(f, "Not a directory ({}).", kind),
            Self::WorldWritable => f.write_str("Directory is writable by everyone."),
        }
    }
}

/// Problems of each raw entry, in path order. Entries without problems are
/// left out.
pub fn diagnose(var: &PathVar) -> Result<Vec<(String, Vec<Problem>)>> {
    let mut seen = HashSet::new();
    let mut report = Vec::new();

    for entry in var.raw() {
        let mut problems = Vec::new();

        if !seen.insert(clean_entry(entry)) {
            problems.push(Problem::Duplicate);
        }

        if entry.is_empty() {
            problems.push(Problem::Blank);
        } else {
            if clean_entry(entry) == "." {
                problems.push(Problem::CurrentDirectory);
            } else if !entry.starts_with('/') {
                problems.push(Problem::Relative);
            }

            match pathy_os::classify(entry)? {
                Diagnostics::Unavailable { error } => problems.push(Problem::Unusable(error)),
                Diagnostics::Classified { kind, .. } if kind != FileKind::Directory => {
                    problems.push(Problem::NotADirectory(kind))
                }
                Diagnostics::Classified {
                    is_world_writable: true,
                    ..
                } => problems.push(Problem::WorldWritable),
                Diagnostics::Classified { .. } => {}
            }
        }

        if !problems.is_empty() {
            report.push((entry.clone(), problems));
        }
    }

    Ok(report)
}

pub fn run(var: &PathVar, out: &mut impl Write) -> Result<()> {
    let report = diagnose(var)?;

    let mut total = 0;
    for (entry, problems) in &report {
        writeln!(out, "Entry [{}]", entry)?;
        for problem in problems {
            writeln!(out, "* [{}] {}", problem.severity(), problem)?;
        }
        total += problems.len();
    }

    match total {
        0 => writeln!(out, "No problems found :)")?,
        1 => writeln!(out, "1 problem found")?,
        n => writeln!(out, "{} problems found", n)?,
    }
    Ok(())
}
