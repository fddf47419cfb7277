//! Loading native libraries by naming convention.
//!
//! Bundled libraries are referred to by name and live in the application's
//! native library directory as `lib<name>.so`. Loaded libraries are never
//! unloaded.

use std::ffi::{CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// The path of the bundled library `name` inside `dir`.
pub fn library_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("lib{name}.so"))
}

/// A library loaded with global symbol visibility
///
/// The handle is kept for the lifetime of the process.
#[derive(Debug)]
pub struct LoadedLibrary {
    path: PathBuf,
    handle: *mut libc::c_void,
}

// The handle is only an opaque token for the dynamic linker.
unsafe impl Send for LoadedLibrary {}
unsafe impl Sync for LoadedLibrary {}

impl LoadedLibrary {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handle(&self) -> *mut libc::c_void {
        self.handle
    }
}

/// Loads the library at `path`, resolving all of its symbols immediately and
/// making them available to libraries loaded later.
pub fn load_library(path: &Path) -> Result<LoadedLibrary> {
    let load_error = |reason: String| AppError::LibraryLoad {
        path: path.to_owned(),
        reason,
    };

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| load_error("path contains a nul byte".to_owned()))?;

    let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL) };
    if handle.is_null() {
        let reason = unsafe {
            let err = libc::dlerror();
            if err.is_null() {
                "unknown dynamic linker error".to_owned()
            } else {
                CStr::from_ptr(err).to_string_lossy().into_owned()
            }
        };
        return Err(load_error(reason));
    }

    log::debug!("Loaded {}", path.display());
    Ok(LoadedLibrary {
        path: path.to_owned(),
        handle,
    })
}

/// Loads libraries given by full path, in order.
///
/// Paths that don't exist are skipped silently. Failures to load are logged
/// and skipped.
pub fn load_libraries<S: AsRef<str>>(paths: &[S]) -> Vec<LoadedLibrary> {
    paths
        .iter()
        .map(|path| Path::new(path.as_ref()))
        .filter(|path| path.exists())
        .filter_map(|path| match load_library(path) {
            Ok(library) => Some(library),
            Err(err) => {
                log::error!("{err}");
                None
            }
        })
        .collect()
}

/// Loads bundled libraries by name from `dir`, in order.
///
/// Missing libraries and failures to load are logged and skipped.
pub fn load_bundled_libraries<S: AsRef<str>>(names: &[S], dir: &Path) -> Vec<LoadedLibrary> {
    let mut loaded = Vec::with_capacity(names.len());
    for name in names {
        let path = library_path(dir, name.as_ref());
        if !path.exists() {
            log::error!("Can't find '{}'", path.display());
            continue;
        }
        match load_library(&path) {
            Ok(library) => loaded.push(library),
            Err(err) => log::error!("{err}"),
        }
    }
    loaded
}
