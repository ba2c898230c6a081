// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

// FFI cdylib: public functions are extern "C" entry points for the host.
#![allow(clippy::missing_safety_doc)]

//! FFI cdylib exposing the pathy OS-binding core to an embedding scripting
//! host.
//!
//! Provides C ABI functions prefixed with `pathy_` that the host registers as
//! callable builtins. Return convention:
//!
//! - `0` ([`PATHY_OK`]) on success.
//! - `-1` ([`PATHY_ERROR`]) on a raised failure. The message is available
//!   from [`pathy_last_error`] until the next failing call on the same
//!   thread. The host is expected to turn it into a script error.
//! - [`pathy_directory_diagnostics`] additionally returns `1`
//!   ([`PATHY_UNAVAILABLE`]) when the path could not be statted for a routine
//!   reason; that is data, not a failure.

use std::cell::RefCell;
use std::ffi::{CStr, CString, OsStr, c_char, c_int, c_void};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::Once;

use pathy_os::{Diagnostics, PathyError, ProcessHandle};

pub const PATHY_OK: c_int = 0;
pub const PATHY_ERROR: c_int = -1;
pub const PATHY_UNAVAILABLE: c_int = 1;

/// Classification filled in by [`pathy_directory_diagnostics`].
#[repr(C)]
#[derive(Debug)]
pub struct PathyDiagnostics {
    /// Static NUL-terminated type name: "pipe", "device", "directory",
    /// "file", "symbolic link", "socket" or "unknown".
    pub type_name: *const c_char,
    /// 1 if the world-writable permission bit is set, else 0.
    pub is_world_writable: c_int,
}

/// Visitor invoked once per directory entry with the host's `user_data`.
pub type PathyVisitFn = unsafe extern "C" fn(user_data: *mut c_void, name: *const c_char);

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
    static EXECUTABLE_PATH: RefCell<Option<CString>> = const { RefCell::new(None) };
}

// ============================================================================
// C ABI: Library
// ============================================================================

/// Version of this library as a static NUL-terminated string.
#[unsafe(no_mangle)]
pub extern "C" fn pathy_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr().cast()
}

/// Message of the last failure on this thread, or null if there was none.
///
/// The pointer stays valid until the next failing call on this thread.
#[unsafe(no_mangle)]
pub extern "C" fn pathy_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |message| message.as_ptr())
    })
}

// ============================================================================
// C ABI: fd 3 control channel
// ============================================================================

/// Fail unless descriptor 3 is a pipe.
#[unsafe(no_mangle)]
pub extern "C" fn pathy_assert_fd3_is_pipe() -> c_int {
    init_native_logging();
    status(pathy_os::assert_channel_is_pipe())
}

/// Write the NUL-terminated UTF-8 `text` in full to descriptor 3.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pathy_write_to_fd3(text: *const c_char) -> c_int {
    init_native_logging();
    let result = unsafe { c_str_arg(text, "text") }.and_then(|text| {
        let text = text.to_str().map_err(|_| {
            PathyError::InvalidArgument("text for fd 3 is not valid UTF-8".to_string())
        })?;
        pathy_os::write_to_channel(text)
    });
    status(result)
}

// ============================================================================
// C ABI: Process launch
// ============================================================================

/// Start `argv[0]` with `argv[0..argc]` as arguments, its stdin fed from
/// this process's stdout. The process identifier is written to `out_pid`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pathy_start_program(
    argv: *const *const c_char,
    argc: usize,
    out_pid: *mut libc::pid_t,
) -> c_int {
    init_native_logging();
    if argv.is_null() || argc == 0 {
        return fail(&PathyError::InvalidArgument(
            "start_program requires at least the program name".to_string(),
        ));
    }
    if out_pid.is_null() {
        return fail(&PathyError::InvalidArgument("out_pid is null".to_string()));
    }

    // SAFETY: the caller passes `argc` valid pointers at `argv`.
    let raw_args = unsafe { std::slice::from_raw_parts(argv, argc) };
    let args = match raw_args
        .iter()
        .map(|&arg| unsafe { c_str_arg(arg, "argument") }.map(|arg| OsStr::from_bytes(arg.to_bytes())))
        .collect::<pathy_os::Result<Vec<_>>>()
    {
        Ok(args) => args,
        Err(e) => return fail(&e),
    };

    match pathy_os::start(&args) {
        Ok(handle) => {
            // SAFETY: checked non-null above.
            unsafe { *out_pid = handle.pid() };
            PATHY_OK
        }
        Err(e) => fail(&e),
    }
}

/// Close stdout and wait for `pid` (from [`pathy_start_program`]). The raw
/// wait status is written to `out_status`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pathy_wait_for_program(
    pid: libc::pid_t,
    out_status: *mut c_int,
) -> c_int {
    init_native_logging();
    if out_status.is_null() {
        return fail(&PathyError::InvalidArgument("out_status is null".to_string()));
    }
    match pathy_os::wait(ProcessHandle::from_raw(pid)) {
        Ok(exit) => {
            // SAFETY: checked non-null above.
            unsafe { *out_status = exit.raw() };
            PATHY_OK
        }
        Err(e) => fail(&e),
    }
}

// ============================================================================
// C ABI: Path and directory probing
// ============================================================================

/// Classify `path`. Returns [`PATHY_OK`] and fills `out`, or
/// [`PATHY_UNAVAILABLE`] with the reason in [`pathy_last_error`], or
/// [`PATHY_ERROR`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pathy_directory_diagnostics(
    path: *const c_char,
    out: *mut PathyDiagnostics,
) -> c_int {
    init_native_logging();
    if out.is_null() {
        return fail(&PathyError::InvalidArgument("out is null".to_string()));
    }
    let result = unsafe { path_arg(path) }.and_then(pathy_os::classify);
    match result {
        Ok(Diagnostics::Classified {
            kind,
            is_world_writable,
        }) => {
            // SAFETY: checked non-null above.
            unsafe {
                *out = PathyDiagnostics {
                    type_name: kind.as_c_str().as_ptr(),
                    is_world_writable: c_int::from(is_world_writable),
                };
            }
            PATHY_OK
        }
        Ok(Diagnostics::Unavailable { error }) => {
            set_last_error(&error);
            PATHY_UNAVAILABLE
        }
        Err(e) => fail(&e),
    }
}

/// Call `visit(user_data, name)` for each entry of directory `path`, except
/// `.` and `..`. A directory that cannot be opened has no entries.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pathy_list_files(
    path: *const c_char,
    visit: Option<PathyVisitFn>,
    user_data: *mut c_void,
) -> c_int {
    init_native_logging();
    let Some(visit) = visit else {
        return fail(&PathyError::InvalidArgument("visit callback is null".to_string()));
    };
    let path = match unsafe { path_arg(path) } {
        Ok(path) => path,
        Err(e) => return fail(&e),
    };

    let result = pathy_os::for_each_entry(path, |name| {
        // Directory entry names never contain NUL.
        if let Ok(name) = CString::new(name.as_bytes()) {
            // SAFETY: the host vouches for `visit` and `user_data`.
            unsafe { visit(user_data, name.as_ptr()) };
        }
    });
    status(result)
}

/// Absolute path of the running executable, or null on failure.
///
/// The pointer stays valid until the next call on this thread.
#[unsafe(no_mangle)]
pub extern "C" fn pathy_executable_path() -> *const c_char {
    init_native_logging();
    let path = pathy_os::executable_path().and_then(|path| {
        CString::new(path.as_os_str().as_bytes())
            .map_err(|_| PathyError::InvalidArgument("executable path contains NUL".to_string()))
    });
    match path {
        Ok(path) => EXECUTABLE_PATH.with(|slot| slot.borrow_mut().insert(path).as_ptr()),
        Err(e) => {
            fail(&e);
            std::ptr::null()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Install a stderr fmt subscriber once. The host process has none, and the
/// host owns stdout (and may have handed it to a child).
fn init_native_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("PATHY_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn status(result: pathy_os::Result<()>) -> c_int {
    match result {
        Ok(()) => PATHY_OK,
        Err(e) => fail(&e),
    }
}

fn fail(err: &PathyError) -> c_int {
    tracing::debug!(error = %err, "native call failed");
    set_last_error(&err.to_string());
    PATHY_ERROR
}

fn set_last_error(message: &str) {
    let message = CString::new(message.replace('\0', "\\0"))
        .unwrap_or_else(|_| CString::from(c"error message unavailable"));
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

unsafe fn c_str_arg<'a>(ptr: *const c_char, what: &str) -> pathy_os::Result<&'a CStr> {
    if ptr.is_null() {
        return Err(PathyError::InvalidArgument(format!("{} is null", what)));
    }
    // SAFETY: non-null; the caller passes a NUL-terminated string.
    Ok(unsafe { CStr::from_ptr(ptr) })
}

unsafe fn path_arg<'a>(ptr: *const c_char) -> pathy_os::Result<&'a Path> {
    let path = unsafe { c_str_arg(ptr, "path") }?;
    Ok(Path::new(OsStr::from_bytes(path.to_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn c_path(path: &Path) -> CString {
        CString::new(path.as_os_str().as_bytes()).unwrap()
    }

    fn last_error() -> String {
        let ptr = pathy_last_error();
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    unsafe extern "C" fn collect_name(user_data: *mut c_void, name: *const c_char) {
        let names = unsafe { &mut *user_data.cast::<Vec<String>>() };
        names.push(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned());
    }

    #[test]
    fn test_version_matches_package() {
        let version = unsafe { CStr::from_ptr(pathy_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_list_files_visits_each_entry() {
        let dir = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let path = c_path(dir.path());
        let mut names: Vec<String> = Vec::new();

        let rc = unsafe {
            pathy_list_files(
                path.as_ptr(),
                Some(collect_name),
                (&mut names as *mut Vec<String>).cast(),
            )
        };
        assert_eq!(rc, PATHY_OK);
        names.sort();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_list_files_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = c_path(&dir.path().join("missing"));
        let mut names: Vec<String> = Vec::new();

        let rc = unsafe {
            pathy_list_files(
                path.as_ptr(),
                Some(collect_name),
                (&mut names as *mut Vec<String>).cast(),
            )
        };
        assert_eq!(rc, PATHY_OK);
        assert!(names.is_empty());
    }

    #[test]
    fn test_list_files_requires_callback() {
        let rc = unsafe { pathy_list_files(c"/".as_ptr(), None, std::ptr::null_mut()) };
        assert_eq!(rc, PATHY_ERROR);
        assert!(last_error().contains("callback"));
    }

    #[test]
    fn test_directory_diagnostics_classifies() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o666)).unwrap();

        let mut out = PathyDiagnostics {
            type_name: std::ptr::null(),
            is_world_writable: -1,
        };
        let path = c_path(&file);
        let rc = unsafe { pathy_directory_diagnostics(path.as_ptr(), &mut out) };
        assert_eq!(rc, PATHY_OK);
        assert_eq!(unsafe { CStr::from_ptr(out.type_name) }, c"file");
        assert_eq!(out.is_world_writable, 1);

        let path = c_path(dir.path());
        let rc = unsafe { pathy_directory_diagnostics(path.as_ptr(), &mut out) };
        assert_eq!(rc, PATHY_OK);
        assert_eq!(unsafe { CStr::from_ptr(out.type_name) }, c"directory");
    }

    #[test]
    fn test_directory_diagnostics_missing_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = c_path(&dir.path().join("missing"));
        let mut out = PathyDiagnostics {
            type_name: std::ptr::null(),
            is_world_writable: 0,
        };
        let rc = unsafe { pathy_directory_diagnostics(path.as_ptr(), &mut out) };
        assert_eq!(rc, PATHY_UNAVAILABLE);
        assert!(!last_error().is_empty());
        assert!(out.type_name.is_null());
    }

    #[test]
    fn test_null_arguments_fail() {
        let mut out = PathyDiagnostics {
            type_name: std::ptr::null(),
            is_world_writable: 0,
        };
        let rc = unsafe { pathy_directory_diagnostics(std::ptr::null(), &mut out) };
        assert_eq!(rc, PATHY_ERROR);
        assert_eq!(last_error(), "invalid argument: path is null");

        assert_eq!(unsafe { pathy_write_to_fd3(std::ptr::null()) }, PATHY_ERROR);
        assert_eq!(last_error(), "invalid argument: text is null");
    }

    #[test]
    fn test_start_program_requires_program_name() {
        let mut pid = 0;
        let rc = unsafe { pathy_start_program(std::ptr::null(), 0, &mut pid) };
        assert_eq!(rc, PATHY_ERROR);
        assert!(last_error().contains("program name"));
        assert_eq!(pid, 0);
    }

    #[test]
    fn test_start_program_rejects_null_argument() {
        let argv = [std::ptr::null::<c_char>()];
        let mut pid = 0;
        let rc = unsafe { pathy_start_program(argv.as_ptr(), 1, &mut pid) };
        assert_eq!(rc, PATHY_ERROR);
        assert_eq!(last_error(), "invalid argument: argument is null");
    }

    #[test]
    fn test_executable_path_is_absolute() {
        let ptr = pathy_executable_path();
        assert!(!ptr.is_null());
        let path = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_owned();
        assert!(Path::new(&path).is_absolute());
    }
}
