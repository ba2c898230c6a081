// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Path classification and directory enumeration.
//!
//! Both operations distinguish routine conditions from real failures.
//! [`classify`] turns the usual "this path is not usable" errnos into a
//! [`Diagnostics::Unavailable`] value, and [`list_entries`] treats a directory
//! that cannot be opened as empty. Everything else is a [`PathyError`].

use std::ffi::{CStr, CString, OsStr, OsString};
use std::fmt;
use std::io;
use std::iter::FusedIterator;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::error::{PathyError, Result, describe};

/// `stat` errnos that describe the path rather than the environment.
const EXPECTED_STAT_ERRORS: [i32; 5] = [
    libc::EACCES,
    libc::ELOOP,
    libc::ENAMETOOLONG,
    libc::ENOENT,
    libc::ENOTDIR,
];

const MODE_TYPE_MASK: u32 = libc::S_IFMT as u32;
const MODE_FIFO: u32 = libc::S_IFIFO as u32;
const MODE_CHR: u32 = libc::S_IFCHR as u32;
const MODE_DIR: u32 = libc::S_IFDIR as u32;
const MODE_BLK: u32 = libc::S_IFBLK as u32;
const MODE_REG: u32 = libc::S_IFREG as u32;
const MODE_LNK: u32 = libc::S_IFLNK as u32;
const MODE_SOCK: u32 = libc::S_IFSOCK as u32;
const MODE_WORLD_WRITABLE: u32 = libc::S_IWOTH as u32;

/// File type as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pipe,
    /// Character or block device.
    Device,
    Directory,
    File,
    SymbolicLink,
    Socket,
    Unknown,
}

impl FileKind {
    /// Classify the file-type bits of a `st_mode` value.
    pub fn from_mode(mode: u32) -> Self {
        match mode & MODE_TYPE_MASK {
            MODE_FIFO => Self::Pipe,
            MODE_CHR | MODE_BLK => Self::Device,
            MODE_DIR => Self::Directory,
            MODE_REG => Self::File,
            MODE_LNK => Self::SymbolicLink,
            MODE_SOCK => Self::Socket,
            _ => Self::Unknown,
        }
    }

    /// Name as a NUL-terminated string, for C callers.
    pub const fn as_c_str(self) -> &'static CStr {
        match self {
            Self::Pipe => c"pipe",
            Self::Device => c"device",
            Self::Directory => c"directory",
            Self::File => c"file",
            Self::SymbolicLink => c"symbolic link",
            Self::Socket => c"socket",
            Self::Unknown => c"unknown",
        }
    }

    pub fn as_str(self) -> &'static str {
        // Every name above is ASCII.
        self.as_c_str().to_str().unwrap_or("unknown")
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What [`classify`] found out about a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostics {
    /// The path could be statted.
    Classified {
        kind: FileKind,
        is_world_writable: bool,
    },
    /// The path could not be statted for a routine reason.
    Unavailable { error: String },
}

impl Diagnostics {
    pub fn kind(&self) -> Option<FileKind> {
        match self {
            Self::Classified { kind, .. } => Some(*kind),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_world_writable(&self) -> Option<bool> {
        match self {
            Self::Classified {
                is_world_writable, ..
            } => Some(*is_world_writable),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Classified { .. } => None,
            Self::Unavailable { error } => Some(error),
        }
    }
}

/// Stat `path` (following symlinks) and classify it.
///
/// Since the link is followed, [`FileKind::SymbolicLink`] is never produced
/// here; a link reports the type of its target.
pub fn classify(path: impl AsRef<Path>) -> Result<Diagnostics> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Ok(meta) => {
            let mode = meta.mode();
            Ok(Diagnostics::Classified {
                kind: FileKind::from_mode(mode),
                is_world_writable: mode & MODE_WORLD_WRITABLE != 0,
            })
        }
        Err(err)
            if err
                .raw_os_error()
                .is_some_and(|code| EXPECTED_STAT_ERRORS.contains(&code)) =>
        {
            Ok(Diagnostics::Unavailable {
                error: describe(&err),
            })
        }
        Err(source) => Err(PathyError::Stat {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Enumerate the names in directory `path`, skipping `.` and `..`.
///
/// A directory that cannot be opened yields nothing. Names come in whatever
/// order the directory stream produces them.
pub fn list_entries(path: impl AsRef<Path>) -> DirEntries {
    DirEntries::open(path.as_ref())
}

/// Call `visit` with each entry name of directory `path`.
pub fn for_each_entry<F>(path: impl AsRef<Path>, mut visit: F) -> Result<()>
where
    F: FnMut(&OsStr),
{
    for name in list_entries(path) {
        visit(&name?);
    }
    Ok(())
}

/// Lazy sequence of directory entry names. See [`list_entries`].
///
/// A read or close failure is yielded once, after the stream has been
/// closed, and ends the sequence. Dropping it early closes the stream.
pub struct DirEntries {
    dir: Option<NonNull<libc::DIR>>,
    path: PathBuf,
}

impl DirEntries {
    fn open(path: &Path) -> Self {
        let dir = match CString::new(path.as_os_str().as_bytes()) {
            Ok(c_path) => {
                // SAFETY: `c_path` is a valid NUL-terminated string.
                let dir = NonNull::new(unsafe { libc::opendir(c_path.as_ptr()) });
                match dir {
                    Some(_) => tracing::debug!(path = %path.display(), "opened directory"),
                    None => tracing::debug!(
                        path = %path.display(),
                        error = %io::Error::last_os_error(),
                        "directory cannot be opened, listing nothing"
                    ),
                }
                dir
            }
            Err(_) => {
                tracing::debug!(path = %path.display(), "path contains a NUL byte, listing nothing");
                None
            }
        };

        Self {
            dir,
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        // SAFETY: `dir` came from opendir and, having been taken out of
        // `self.dir`, is closed exactly once.
        if unsafe { libc::closedir(dir.as_ptr()) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// End of the stream: close it, then report `read_errno` (0 when
    /// readdir simply ran out) or else a close failure.
    fn finish(&mut self, read_errno: libc::c_int) -> Option<Result<OsString>> {
        let closed = self.close();
        end_of_stream_error(read_errno, closed).map(|source| {
            Err(PathyError::ListDirectory {
                path: self.path.clone(),
                source,
            })
        })
    }
}

impl Iterator for DirEntries {
    type Item = Result<OsString>;

    fn next(&mut self) -> Option<Self::Item> {
        let dir = self.dir?;
        loop {
            errno::clear();
            // SAFETY: `dir` is an open stream owned by `self`.
            let entry = unsafe { libc::readdir(dir.as_ptr()) };
            if entry.is_null() {
                return self.finish(errno::get());
            }

            // SAFETY: readdir returned a valid entry; `d_name` is
            // NUL-terminated and valid until the next call on this stream.
            let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) }.to_bytes();
            if name == b"." || name == b".." {
                continue;
            }
            return Some(Ok(OsStr::from_bytes(name).to_os_string()));
        }
    }
}

impl FusedIterator for DirEntries {}

/// A read error wins over a close error; neither means a clean end.
fn end_of_stream_error(read_errno: libc::c_int, closed: io::Result<()>) -> Option<io::Error> {
    if read_errno != 0 {
        return Some(io::Error::from_raw_os_error(read_errno));
    }
    closed.err()
}

impl Drop for DirEntries {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(path = %self.path.display(), error = %e, "closing directory failed");
        }
    }
}

impl fmt::Debug for DirEntries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirEntries")
            .field("path", &self.path)
            .field("open", &self.dir.is_some())
            .finish()
    }
}

/// readdir(3) only reports errors through `errno`, which has to be cleared
/// beforehand to tell an error from the end of the stream.
mod errno {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn location() -> *mut libc::c_int {
        // SAFETY: always returns the calling thread's errno slot.
        unsafe { libc::__errno_location() }
    }

    #[cfg(any(target_vendor = "apple", target_os = "freebsd"))]
    fn location() -> *mut libc::c_int {
        // SAFETY: always returns the calling thread's errno slot.
        unsafe { libc::__error() }
    }

    #[cfg(any(target_os = "openbsd", target_os = "netbsd"))]
    fn location() -> *mut libc::c_int {
        // SAFETY: always returns the calling thread's errno slot.
        unsafe { libc::__errno() }
    }

    pub(super) fn clear() {
        // SAFETY: the slot is thread-local and always writable.
        unsafe { *location() = 0 }
    }

    pub(super) fn get() -> libc::c_int {
        // SAFETY: the slot is thread-local and always readable.
        unsafe { *location() }
    }
}
