// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Absolute path of the running executable.

use std::path::PathBuf;

use crate::error::Result;
#[cfg(any(target_os = "linux", target_vendor = "apple"))]
use crate::error::PathyError;

/// Resolve the running executable through `/proc/self/exe`.
#[cfg(target_os = "linux")]
pub fn executable_path() -> Result<PathBuf> {
    std::fs::read_link("/proc/self/exe").map_err(|source| PathyError::Os {
        op: "cannot read /proc/self/exe".to_string(),
        source,
    })
}

/// Resolve the running executable through `_NSGetExecutablePath`.
#[cfg(target_vendor = "apple")]
pub fn executable_path() -> Result<PathBuf> {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;

    let mut size: u32 = 0;
    // SAFETY: with a zero-sized buffer the call only reports the size needed.
    unsafe { libc::_NSGetExecutablePath(std::ptr::null_mut(), &mut size) };

    let mut buf = vec![0u8; size as usize];
    // SAFETY: `buf` holds `size` bytes, as the call was told.
    if unsafe { libc::_NSGetExecutablePath(buf.as_mut_ptr().cast(), &mut size) } != 0 {
        return Err(PathyError::Os {
            op: "cannot get executable path".to_string(),
            source: std::io::Error::other(format!("buffer of {} bytes too small", buf.len())),
        });
    }

    let path = CStr::from_bytes_until_nul(&buf).map_err(|e| PathyError::Os {
        op: "cannot get executable path".to_string(),
        source: std::io::Error::other(e),
    })?;
    Ok(PathBuf::from(OsStr::from_bytes(path.to_bytes())))
}

#[cfg(not(any(target_os = "linux", target_vendor = "apple")))]
pub fn executable_path() -> Result<PathBuf> {
    std::env::current_exe().map_err(|source| crate::error::PathyError::Os {
        op: "cannot get executable path".to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_path_is_absolute_and_exists() {
        let path = executable_path().unwrap();
        assert!(path.is_absolute(), "{}", path.display());
        assert!(path.exists(), "{}", path.display());
    }
}
