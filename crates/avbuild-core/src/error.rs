//! Error types for project resolution and build-directory orchestration.

use std::path::PathBuf;

/// Errors that can occur while resolving or configuring a project build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The requested project name is not in the registry.
    #[error("unknown project '{name}' (known projects: {})", known.join(", "))]
    UnknownProject {
        /// The name that was looked up.
        name: String,
        /// Every registered name, sorted.
        known: Vec<String>,
    },

    /// A path that must be a directory exists as something else.
    #[error("build path '{}' exists but is not a directory", path.display())]
    InvalidBuildPath { path: PathBuf },

    /// The external build-configuration tool could not be run.
    #[error("failed to run '{program}': {source}")]
    ExternalTool {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but was killed instead of exiting. `output` holds
    /// whatever it printed first.
    #[error(
        "'{program}' terminated abnormally{}",
        signal.map(|s| format!(" (signal {s})")).unwrap_or_default()
    )]
    ToolTerminated {
        program: String,
        signal: Option<i32>,
        output: String,
    },

    /// Malformed command-line invocation.
    #[error("usage: {detail}")]
    Usage { detail: String },

    /// Two configs were registered under the same name.
    #[error("project '{name}' is registered more than once")]
    DuplicateProject { name: String },

    /// A project names a dependency that is not registered.
    #[error("project '{project}' depends on unknown project '{dependency}'")]
    DanglingDependency { project: String, dependency: String },

    /// Following dependency references from a project leads back to it.
    #[error("dependency cycle: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    /// The registry file declares a format version this build does not read.
    #[error("unsupported registry format version {found} (expected {expected})")]
    UnsupportedRegistryVersion { found: u32, expected: u32 },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error on a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for build orchestration.
pub type Result<T> = std::result::Result<T, BuildError>;
