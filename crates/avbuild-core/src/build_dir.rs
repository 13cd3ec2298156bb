//! Build directory creation.
//!
//! Directories created here get mode `0o775` (owner and group rwx, others
//! r-x). Directories that already exist are left exactly as they are.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{BuildError, Result};

/// Permission bits applied to a newly created build directory.
pub const BUILD_DIR_MODE: u32 = 0o775;

/// What [`ensure`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The directory was created.
    Created,
    /// The directory was already there.
    Existing,
}

/// Make sure `path` is a directory, creating it if needed.
///
/// The parent must already exist. Losing a creation race to another process
/// counts as [`EnsureOutcome::Existing`]. A non-directory at `path` is an
/// error and is never removed.
pub fn ensure(path: &Path) -> Result<EnsureOutcome> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            debug!(path = %path.display(), "build directory exists");
            return Ok(EnsureOutcome::Existing);
        }
        Ok(_) => {
            return Err(BuildError::InvalidBuildPath {
                path: path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(BuildError::io(path, e)),
    }

    match fs::create_dir(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return if path.is_dir() {
                Ok(EnsureOutcome::Existing)
            } else {
                Err(BuildError::InvalidBuildPath {
                    path: path.to_path_buf(),
                })
            };
        }
        Err(e) => return Err(BuildError::io(path, e)),
    }

    set_mode(path)?;
    info!(path = %path.display(), "created build directory");
    Ok(EnsureOutcome::Created)
}

#[cfg(unix)]
fn set_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(BUILD_DIR_MODE))
        .map_err(|e| BuildError::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path) -> Result<()> {
    Ok(())
}
