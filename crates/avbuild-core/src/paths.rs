//! Path resolution for the avfirmware tree.
//!
//! Layout:
//! ```text
//! <root>/
//!   <source_subdir>/                       — project CMakeLists.txt
//!   build-tools/cmake-avr/generic-gcc-avr.cmake
//!   build/
//!     <build_dirname>/                     — cmake runs here
//! ```
//!
//! Everything here is computed lexically; nothing touches the filesystem.

use std::path::{Component, Path, PathBuf};

use crate::error::{BuildError, Result};
use crate::registry::ProjectConfig;

/// Name of the shared build directory under the tree root.
pub const ROOT_BUILD_DIRNAME: &str = "build";

/// Toolchain file for embedded projects, relative to the tree root.
pub const AVR_TOOLCHAIN_FILE: &str = "build-tools/cmake-avr/generic-gcc-avr.cmake";

/// Make `path` absolute against the current directory and normalize it.
pub fn absolute_root(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path).map_err(|e| BuildError::io(path, e))?;
    Ok(normalize(&abs))
}

/// Lexically normalize a path: drop `.` components and fold `..` into
/// the preceding component. Symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    out.pop();
                } else if !matches!(last, Some(Component::RootDir | Component::Prefix(_))) {
                    // `/..` is `/`; anything else keeps the `..`
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Directory containing the project's build description.
pub fn source_path(root: &Path, config: &ProjectConfig) -> PathBuf {
    normalize(&root.join(&config.source_subdir))
}

/// The build directory shared by every project.
pub fn root_build_path(root: &Path) -> PathBuf {
    normalize(&root.join(ROOT_BUILD_DIRNAME))
}

/// The directory cmake is run in for this project.
pub fn project_build_path(root: &Path, config: &ProjectConfig) -> PathBuf {
    normalize(&root_build_path(root).join(&config.build_dirname))
}

/// The cross-compilation toolchain file used for embedded projects.
pub fn toolchain_file_path(root: &Path) -> PathBuf {
    normalize(&root.join(AVR_TOOLCHAIN_FILE))
}
