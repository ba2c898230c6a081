// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! OS-binding core for pathy.
//!
//! The only code in pathy that touches raw OS resources:
//!
//! - [`process`]: start a program whose stdin is fed from our stdout, and
//!   reap it later.
//! - [`channel`]: the fd 3 control channel to the supervising shell.
//! - [`inspect`]: classify a path and enumerate a directory.
//! - [`exe`]: the running executable's own path.
//!
//! Everything here is synchronous and assumes one thread drives it.
//! Descriptors 1 and 3 are process-wide, so at most one launch may be in
//! flight at a time.
//!
//! Failures come in two tiers. Routine conditions (an unusable path, a
//! directory that cannot be opened) are returned as values. Everything else
//! is a [`PathyError`].

pub mod channel;
pub mod error;
pub mod exe;
pub mod inspect;
pub mod process;

pub use channel::{DIAGNOSTIC_FD, DiagnosticChannel, assert_channel_is_pipe, write_to_channel};
pub use error::{PathyError, Result};
pub use exe::executable_path;
pub use inspect::{DirEntries, Diagnostics, FileKind, classify, for_each_entry, list_entries};
pub use process::{EXEC_FAILURE_STATUS, ExitStatus, ProcessHandle, start, wait};
