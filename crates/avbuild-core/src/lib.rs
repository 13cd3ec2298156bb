//! Build orchestration for the avfirmware tree.
//!
//! Given a project name, resolves that project's build parameters from the
//! registry, creates `<root>/build/<build_dirname>/`, and runs cmake there
//! with the right generator, toolchain file, and definitions.
//!
//! # Components
//!
//! - **Registry** — immutable name → [`ProjectConfig`] table, validated once
//! - **Paths** — source, shared build root, and per-project build paths
//! - **Defines** — ordered `-D` flags, including the dependency's build path
//! - **Build directories** — idempotent creation with a fixed mode
//! - **Dispatch** — embedded (toolchain file) vs. native command lines
//! - **Pipeline** — the `create` sequence tying the above together

pub mod build_dir;
pub mod defines;
pub mod dispatch;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod platform;
pub mod registry;

pub use build_dir::{ensure, EnsureOutcome};
pub use defines::build_definitions;
pub use dispatch::{Invocation, ProcessRunner, ToolOutput, ToolRunner};
pub use error::{BuildError, Result};
pub use pipeline::{create, plan_create, CreateReport, CreateRequest};
pub use platform::Platform;
pub use registry::{ProjectConfig, Registry};
