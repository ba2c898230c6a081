// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Pipe-fed process launch.
//!
//! [`start`] forks a child whose stdin is the read end of a fresh pipe and
//! points this process's own stdout at the write end, so anything printed
//! afterwards is fed to the child. [`wait`] closes stdout, which is how the
//! child sees end-of-input, then reaps it.
//!
//! Descriptor 1 is process-wide: at most one launch may be in flight, and
//! nothing but input for the child may be written to stdout between the two
//! calls.

use std::ffi::{CString, OsStr};
use std::fmt;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;

use crate::error::{PathyError, Result};

/// Exit status of a child that could not execute the requested program.
pub const EXEC_FAILURE_STATUS: i32 = 127;

/// A launched child process. Consumed by [`wait`].
///
/// Not `Clone`: a child is reaped exactly once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ProcessHandle {
    pid: libc::pid_t,
}

impl ProcessHandle {
    /// Rebuild a handle from a process identifier previously obtained from
    /// [`ProcessHandle::pid`], e.g. after a round trip through a scripting
    /// host. The caller vouches that the identifier came from [`start`] and
    /// has not been waited on yet.
    pub fn from_raw(pid: libc::pid_t) -> Self {
        Self { pid }
    }

    pub fn pid(&self) -> libc::pid_t {
        self.pid
    }
}

/// Raw wait status of a terminated child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus(libc::c_int);

impl ExitStatus {
    pub fn from_raw(raw: libc::c_int) -> Self {
        Self(raw)
    }

    /// The status exactly as `waitpid` reported it.
    pub fn raw(&self) -> libc::c_int {
        self.0
    }

    /// Exit code, if the child exited normally.
    pub fn code(&self) -> Option<i32> {
        libc::WIFEXITED(self.0).then(|| libc::WEXITSTATUS(self.0))
    }

    /// Terminating signal, if the child was killed by one.
    pub fn signal(&self) -> Option<i32> {
        libc::WIFSIGNALED(self.0).then(|| libc::WTERMSIG(self.0))
    }

    pub fn success(&self) -> bool {
        self.code() == Some(0)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.signal()) {
            (Some(code), _) => write!(f, "exit status {}", code),
            (None, Some(signal)) => write!(f, "killed by signal {}", signal),
            (None, None) => write!(f, "wait status {:#x}", self.0),
        }
    }
}

/// Start `argv[0]` with `argv` as its argument vector and its stdin fed from
/// this process's stdout.
///
/// The program is looked up through `PATH` when it contains no slash. If it
/// cannot be executed, the child exits with [`EXEC_FAILURE_STATUS`]; that is
/// only visible through [`wait`], not as an error here.
pub fn start<S: AsRef<OsStr>>(argv: &[S]) -> Result<ProcessHandle> {
    let args = ArgVector::new(argv)?;
    let pipe = PipeEndpoints::create()?;

    // Whatever is already buffered belongs to the original stdout.
    flush_stdout("before redirecting stdout");

    let read_fd = pipe.read.as_raw_fd();
    let write_fd = pipe.write.as_raw_fd();

    // SAFETY: between fork and exec the child only calls async-signal-safe
    // functions on memory prepared before the fork.
    let pid = unsafe { libc::fork() };
    if pid == -1 {
        return Err(PathyError::last_os("cannot create process"));
    }
    if pid == 0 {
        // SAFETY: we are the freshly forked child.
        unsafe { exec_child(&args, read_fd, write_fd) }
    }

    tracing::debug!(pid, program = ?args.program(), "started child");

    // SAFETY: write_fd is open (owned by `pipe`) and 1 is a valid target.
    if unsafe { libc::dup2(write_fd, libc::STDOUT_FILENO) } == -1 {
        let err = PathyError::last_os("cannot redirect standard output");
        // Close our ends first so the child reaches end-of-input.
        drop(pipe);
        reap_quietly(pid);
        return Err(err);
    }

    // The write end lives on as stdout; both originals go.
    drop(pipe);
    Ok(ProcessHandle { pid })
}

/// Close stdout, then block until the child started by [`start`] exits.
pub fn wait(handle: ProcessHandle) -> Result<ExitStatus> {
    let pid = handle.pid;

    // Input the caller printed since `start` may still sit in the buffer.
    flush_stdout("before closing stdout");

    // SAFETY: closing a descriptor number has no memory-safety requirements.
    if unsafe { libc::close(libc::STDOUT_FILENO) } == -1 {
        return Err(PathyError::last_os("cannot close standard output"));
    }

    let mut status: libc::c_int = 0;
    // SAFETY: `status` is a valid out-pointer for the duration of the call.
    if unsafe { libc::waitpid(pid, &mut status, 0) } == -1 {
        return Err(PathyError::last_os(format!("cannot wait for process {}", pid)));
    }

    let status = ExitStatus(status);
    tracing::debug!(pid, %status, "child terminated");
    Ok(status)
}

/// NUL-terminated argument vector, built before forking so the child never
/// allocates.
struct ArgVector {
    // Owns the storage `ptrs` points into. CString heap buffers do not move
    // when the Vec does.
    args: Vec<CString>,
    ptrs: Vec<*const libc::c_char>,
}

impl ArgVector {
    fn new<S: AsRef<OsStr>>(argv: &[S]) -> Result<Self> {
        if argv.is_empty() {
            return Err(PathyError::InvalidArgument(
                "a program name is required to start a process".to_string(),
            ));
        }

        let args = argv
            .iter()
            .map(|arg| {
                let arg = arg.as_ref();
                CString::new(arg.as_bytes()).map_err(|_| {
                    PathyError::InvalidArgument(format!("argument {:?} contains a NUL byte", arg))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ptrs = args
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();

        Ok(Self { args, ptrs })
    }

    fn program(&self) -> &OsStr {
        OsStr::from_bytes(self.args[0].as_bytes())
    }
}

struct PipeEndpoints {
    read: OwnedFd,
    write: OwnedFd,
}

impl PipeEndpoints {
    /// A fresh pipe whose ends both sit above the standard descriptors.
    ///
    /// After a `wait` stdout is closed, so pipe(2) would hand out 1 (or 0)
    /// for one of the ends and the redirection would clobber it.
    fn create() -> Result<Self> {
        let mut fds: [libc::c_int; 2] = [-1; 2];
        // SAFETY: `fds` has room for the two descriptors pipe(2) writes.
        if unsafe { libc::pipe(fds.as_mut_ptr()) } == -1 {
            return Err(PathyError::last_os("cannot create pipe"));
        }
        // SAFETY: pipe(2) just handed us two fresh descriptors nobody else owns.
        let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
        Ok(Self {
            read: lift_above_stdio(read)?,
            write: lift_above_stdio(write)?,
        })
    }
}

/// Move `fd` to the lowest free descriptor >= 3 if it is 0, 1 or 2.
fn lift_above_stdio(fd: OwnedFd) -> Result<OwnedFd> {
    if fd.as_raw_fd() > libc::STDERR_FILENO {
        return Ok(fd);
    }
    // SAFETY: `fd` is open; F_DUPFD_CLOEXEC only creates a new descriptor.
    let lifted = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_DUPFD_CLOEXEC, 3) };
    if lifted == -1 {
        return Err(PathyError::last_os("cannot move pipe descriptor"));
    }
    tracing::debug!(from = fd.as_raw_fd(), to = lifted, "moved pipe end off a standard descriptor");
    // SAFETY: fcntl just returned a fresh descriptor nobody else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(lifted) })
}

/// Child half of [`start`]: wire the pipe to stdin and exec, or exit 127.
///
/// # Safety
///
/// Must only be called in a freshly forked child. Everything it touches was
/// allocated before the fork.
unsafe fn exec_child(args: &ArgVector, read_fd: RawFd, write_fd: RawFd) -> ! {
    unsafe {
        if libc::dup2(read_fd, libc::STDIN_FILENO) == -1 {
            libc::_exit(EXEC_FAILURE_STATUS);
        }
        libc::close(read_fd);
        libc::close(write_fd);

        libc::execvp(args.ptrs[0], args.ptrs.as_ptr());
        libc::_exit(EXEC_FAILURE_STATUS)
    }
}

/// Reap a child after a failed launch; its status is of no interest.
fn reap_quietly(pid: libc::pid_t) {
    let mut status: libc::c_int = 0;
    // SAFETY: `status` is a valid out-pointer for the duration of the call.
    if unsafe { libc::waitpid(pid, &mut status, 0) } == -1 {
        tracing::warn!(
            pid,
            error = %io::Error::last_os_error(),
            "could not reap child after failed launch"
        );
    }
}

fn flush_stdout(when: &str) {
    if let Err(e) = io::stdout().flush() {
        tracing::warn!(error = %e, "flushing stdout {} failed", when);
    }
}
