// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Error types for the OS-binding core.

use std::io;
use std::os::fd::RawFd;
use std::path::PathBuf;

use thiserror::Error;

/// Raised failures from the OS-binding core.
///
/// Expected, caller-visible conditions (a path that cannot be statted for a
/// routine reason, a directory that cannot be opened for listing) are not
/// errors; they come back as ordinary values. Everything here aborts the
/// operation and is meant to reach the top level of the program.
#[derive(Debug, Error)]
pub enum PathyError {
    /// Caller passed something the OS call cannot represent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An OS call failed. `op` names what was being attempted.
    #[error("{op}: {}", describe(.source))]
    Os {
        op: String,
        #[source]
        source: io::Error,
    },

    /// `stat` failed with a condition outside the expected set.
    #[error("stat failed for {}: {}", .path.display(), describe(.source))]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading or closing a directory stream failed.
    #[error("cannot list directory {}: {}", .path.display(), describe(.source))]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The descriptor is missing or refers to something other than a pipe.
    #[error("fd {fd} is not a pipe")]
    NotAPipe { fd: RawFd },

    /// `write` accepted fewer bytes than requested.
    #[error("cannot write more than {written} bytes to fd {fd}")]
    ShortWrite {
        fd: RawFd,
        written: usize,
        expected: usize,
    },
}

impl PathyError {
    /// Build an [`PathyError::Os`] from the calling thread's current `errno`.
    ///
    /// Must be called immediately after the failing call, before anything
    /// else (including a `close`) can overwrite `errno`.
    pub(crate) fn last_os(op: impl Into<String>) -> Self {
        Self::Os {
            op: op.into(),
            source: io::Error::last_os_error(),
        }
    }
}

/// Result type alias for OS-binding operations.
pub type Result<T> = std::result::Result<T, PathyError>;

/// Platform description of an I/O error, without the `(os error N)` suffix
/// the standard library appends.
pub fn describe(err: &io::Error) -> String {
    let text = err.to_string();
    if let Some(code) = err.raw_os_error() {
        if let Some(stripped) = text.strip_suffix(&format!(" (os error {code})")) {
            return stripped.to_owned();
        }
    }
    text
}
