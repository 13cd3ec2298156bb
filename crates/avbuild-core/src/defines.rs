//! cmake `-D` definition flags for a project.
//!
//! Flags come out in a fixed order: the project's own defines as written,
//! then the dependency's build directory, then the debug build type. No
//! deduplication is done; when the same key appears twice, cmake decides.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::paths::project_build_path;
use crate::registry::{ProjectConfig, Registry};

/// Definition that carries the dependency's build directory.
pub const LIBS_PATH_DEFINE: &str = "CMAKE_AVRLIBS_PATH";

/// Definition appended in debug mode.
pub const DEBUG_BUILD_TYPE: &str = "CMAKE_BUILD_TYPE=Debug";

/// Render one definition as a flag.
pub fn flag(definition: impl AsRef<OsStr>) -> OsString {
    let mut flag = OsString::from("-D");
    flag.push(definition);
    flag
}

/// Render `-D<key>=<path>`, keeping the path's bytes as they are.
pub fn path_flag(key: &str, path: &Path) -> OsString {
    let mut flag = flag(key);
    flag.push("=");
    flag.push(path.as_os_str());
    flag
}

/// Assemble the definition flags for `config`.
///
/// The dependency's build directory is only computed, never checked: it is
/// up to the caller to have configured that project first.
pub fn build_definitions(
    registry: &Registry,
    config: &ProjectConfig,
    root: &Path,
    debug: bool,
) -> Result<Vec<OsString>> {
    let mut flags: Vec<OsString> = config.defines.iter().map(flag).collect();

    if let Some(dep) = registry.dependency_of(config)? {
        let dep_path = project_build_path(root, dep);
        debug!(
            project = %config.name,
            dependency = %dep.name,
            path = %dep_path.display(),
            "injecting dependency build path"
        );
        flags.push(path_flag(LIBS_PATH_DEFINE, &dep_path));
    }

    if debug {
        flags.push(flag(DEBUG_BUILD_TYPE));
    }

    Ok(flags)
}
