// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The fd 3 control channel.
//!
//! A supervising process (typically a shell function wrapping `pathy`) hands
//! us the write end of a pipe as descriptor 3 and evaluates whatever we write
//! there. Checking that the descriptor really is a pipe once at startup turns
//! a misconfigured wrapper into a clear error instead of a confusing write
//! failure later.

use std::mem::MaybeUninit;
use std::os::fd::RawFd;

use crate::error::{PathyError, Result};

/// Descriptor reserved for the control channel.
pub const DIAGNOSTIC_FD: RawFd = 3;

/// A control channel on a fixed descriptor. The default is [`DIAGNOSTIC_FD`].
///
/// The channel does not own its descriptor and never closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticChannel {
    fd: RawFd,
}

impl Default for DiagnosticChannel {
    fn default() -> Self {
        Self::new(DIAGNOSTIC_FD)
    }
}

impl DiagnosticChannel {
    pub const fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    pub const fn fd(&self) -> RawFd {
        self.fd
    }

    /// Fail unless the descriptor is open and refers to a pipe.
    pub fn assert_is_pipe(&self) -> Result<()> {
        let mut st = MaybeUninit::<libc::stat>::uninit();
        // SAFETY: fstat fills `st` completely on success and only writes
        // through the pointer it is given.
        if unsafe { libc::fstat(self.fd, st.as_mut_ptr()) } == -1 {
            tracing::debug!(
                fd = self.fd,
                error = %std::io::Error::last_os_error(),
                "fstat on control channel failed"
            );
            return Err(PathyError::NotAPipe { fd: self.fd });
        }
        // SAFETY: fstat returned 0, so `st` is initialized.
        let st = unsafe { st.assume_init() };
        if st.st_mode & libc::S_IFMT != libc::S_IFIFO {
            return Err(PathyError::NotAPipe { fd: self.fd });
        }
        Ok(())
    }

    /// Write `text` with a single `write` call. A short write is an error;
    /// nothing is retried.
    pub fn write(&self, text: &str) -> Result<()> {
        let bytes = text.as_bytes();
        // SAFETY: `bytes` is valid for reads of `bytes.len()` bytes.
        let n = unsafe { libc::write(self.fd, bytes.as_ptr().cast(), bytes.len()) };
        if n < 0 {
            return Err(PathyError::last_os(format!("cannot write to fd {}", self.fd)));
        }
        let written = n as usize;
        if written != bytes.len() {
            return Err(PathyError::ShortWrite {
                fd: self.fd,
                written,
                expected: bytes.len(),
            });
        }
        tracing::debug!(fd = self.fd, bytes = written, "wrote to control channel");
        Ok(())
    }
}

/// Fail unless descriptor 3 is a pipe.
pub fn assert_channel_is_pipe() -> Result<()> {
    DiagnosticChannel::default().assert_is_pipe()
}

/// Write `text` in full to descriptor 3.
pub fn write_to_channel(text: &str) -> Result<()> {
    DiagnosticChannel::default().write(text)
}
