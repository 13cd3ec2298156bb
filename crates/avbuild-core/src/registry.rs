//! Project registry: the immutable name → [`ProjectConfig`] table.
//!
//! The registry is read from a versioned TOML document. The built-in table
//! ships inside the binary (`projects.toml`); a replacement can be loaded
//! from disk. Either way, dependency references are validated once, when the
//! registry is constructed, and never again.
//!
//! Format:
//! ```toml
//! version = 1
//!
//! [projects.ahrs]
//! platform = "embedded"
//! source = "ahrs"
//! build-dir = "ahrs"
//! generator = "Unix Makefiles"
//! defines = ["F_CPU=16000000"]
//! depends-on = "avrlibs"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BuildError, Result};
use crate::platform::Platform;

/// The registry file format version this crate reads.
pub const REGISTRY_FORMAT_VERSION: u32 = 1;

const BUILTIN_REGISTRY: &str = include_str!("../projects.toml");

/// Build parameters for one registered project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Registry key; filled in from the table name when loaded.
    #[serde(skip_deserializing, default)]
    pub name: String,
    /// Target kind.
    pub platform: Platform,
    /// Directory holding the project's CMakeLists.txt, relative to the tree root.
    #[serde(rename = "source")]
    pub source_subdir: PathBuf,
    /// Directory name (not path) under the shared build root.
    #[serde(rename = "build-dir")]
    pub build_dirname: String,
    /// cmake generator, passed through verbatim.
    pub generator: String,
    /// `KEY=VALUE` or bare `KEY` definitions, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defines: Vec<String>,
    /// Project whose build directory is injected as `CMAKE_AVRLIBS_PATH`.
    #[serde(
        rename = "depends-on",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dependency_ref: Option<String>,
}

impl ProjectConfig {
    /// Create a config with no defines and no dependency.
    pub fn new(
        name: impl Into<String>,
        platform: Platform,
        source_subdir: impl Into<PathBuf>,
        build_dirname: impl Into<String>,
        generator: impl Into<String>,
    ) -> Self {
        ProjectConfig {
            name: name.into(),
            platform,
            source_subdir: source_subdir.into(),
            build_dirname: build_dirname.into(),
            generator: generator.into(),
            defines: Vec::new(),
            dependency_ref: None,
        }
    }

    /// Replace the definition list.
    pub fn with_defines<I, S>(mut self, defines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defines = defines.into_iter().map(Into::into).collect();
        self
    }

    /// Declare the project whose build directory this one links against.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependency_ref = Some(name.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    version: u32,
    #[serde(default)]
    projects: BTreeMap<String, ProjectConfig>,
}

/// Immutable lookup table of every known project.
#[derive(Debug, Clone)]
pub struct Registry {
    projects: BTreeMap<String, ProjectConfig>,
}

impl Registry {
    /// The registry compiled into this binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_REGISTRY)
    }

    /// Load a registry file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse a registry document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(toml_str)?;
        if file.version != REGISTRY_FORMAT_VERSION {
            return Err(BuildError::UnsupportedRegistryVersion {
                found: file.version,
                expected: REGISTRY_FORMAT_VERSION,
            });
        }
        let configs = file.projects.into_iter().map(|(name, mut config)| {
            config.name = name;
            config
        });
        Self::from_configs(configs)
    }

    /// Build a registry from configs, rejecting duplicate names, dangling
    /// dependencies, and dependency cycles.
    pub fn from_configs(configs: impl IntoIterator<Item = ProjectConfig>) -> Result<Self> {
        let mut projects = BTreeMap::new();
        for config in configs {
            if projects.contains_key(&config.name) {
                return Err(BuildError::DuplicateProject { name: config.name });
            }
            projects.insert(config.name.clone(), config);
        }
        let registry = Registry { projects };
        registry.validate()?;
        debug!(projects = registry.projects.len(), "registry loaded");
        Ok(registry)
    }

    fn validate(&self) -> Result<()> {
        for config in self.projects.values() {
            if let Some(dep) = &config.dependency_ref {
                if !self.projects.contains_key(dep) {
                    return Err(BuildError::DanglingDependency {
                        project: config.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        // Each project has at most one outgoing reference, so walking the
        // chain from every start point finds any cycle.
        for start in self.projects.keys() {
            let mut chain = vec![start.clone()];
            let mut current = start;
            while let Some(next) = self
                .projects
                .get(current)
                .and_then(|c| c.dependency_ref.as_ref())
            {
                if chain.contains(next) {
                    chain.push(next.clone());
                    return Err(BuildError::DependencyCycle { chain });
                }
                chain.push(next.clone());
                current = next;
            }
        }
        Ok(())
    }

    /// Look up a project by name.
    pub fn lookup(&self, name: &str) -> Result<&ProjectConfig> {
        self.projects
            .get(name)
            .ok_or_else(|| BuildError::UnknownProject {
                name: name.to_string(),
                known: self.list_names().iter().map(|n| n.to_string()).collect(),
            })
    }

    /// The config a project depends on, if it declares one.
    pub fn dependency_of(&self, config: &ProjectConfig) -> Result<Option<&ProjectConfig>> {
        config
            .dependency_ref
            .as_deref()
            .map(|dep| self.lookup(dep))
            .transpose()
    }

    /// All registered names, sorted.
    pub fn list_names(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
