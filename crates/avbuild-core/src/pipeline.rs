//! The `create` sequence.
//!
//! 1. Look the project up (nothing touches disk before this succeeds).
//! 2. Ensure `<root>/build`, then `<root>/build/<build_dirname>`.
//! 3. Assemble definitions.
//! 4. Run the tool inside the project build directory.
//!
//! Each step blocks until done. Directories created before a later failure
//! are left in place.

use std::path::PathBuf;

use tracing::info;

use crate::build_dir::{ensure, EnsureOutcome};
use crate::defines::build_definitions;
use crate::dispatch::{self, Invocation, ToolOutput, ToolRunner, DEFAULT_TOOL};
use crate::error::Result;
use crate::paths::{absolute_root, project_build_path, root_build_path};
use crate::registry::Registry;

/// Parameters for configuring one project.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Root of the avfirmware tree; may be relative.
    pub root: PathBuf,
    /// Registry name of the project.
    pub project: String,
    /// Append `CMAKE_BUILD_TYPE=Debug`.
    pub debug: bool,
    /// Program to run.
    pub tool: String,
}

impl CreateRequest {
    pub fn new(root: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        CreateRequest {
            root: root.into(),
            project: project.into(),
            debug: false,
            tool: DEFAULT_TOOL.to_string(),
        }
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }
}

/// Result of a completed `create`.
#[derive(Debug, Clone)]
pub struct CreateReport {
    /// What was run.
    pub invocation: Invocation,
    /// Whether `<root>/build` was created by this call.
    pub root_dir: EnsureOutcome,
    /// Whether the project build directory was created by this call.
    pub project_dir: EnsureOutcome,
    /// Captured tool output.
    pub output: ToolOutput,
}

/// Resolve the command for a request without touching the filesystem.
pub fn plan_create(registry: &Registry, request: &CreateRequest) -> Result<Invocation> {
    let config = registry.lookup(&request.project)?;
    let root = absolute_root(&request.root)?;
    let definitions = build_definitions(registry, config, &root, request.debug)?;
    Ok(dispatch::plan(&request.tool, &root, config, &definitions))
}

/// Create the build directories and run the configuration step.
pub fn create(
    registry: &Registry,
    runner: &dyn ToolRunner,
    request: &CreateRequest,
) -> Result<CreateReport> {
    let config = registry.lookup(&request.project)?;
    let root = absolute_root(&request.root)?;

    let root_dir = ensure(&root_build_path(&root))?;
    let build_path = project_build_path(&root, config);
    let project_dir = ensure(&build_path)?;
    info!(project = %config.name, "in build directory: {}", build_path.display());

    let definitions = build_definitions(registry, config, &root, request.debug)?;
    let invocation = dispatch::plan(&request.tool, &root, config, &definitions);
    let output = dispatch::execute(runner, &invocation)?;

    Ok(CreateReport {
        invocation,
        root_dir,
        project_dir,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use std::cell::RefCell;
    use std::ffi::OsString;
    use std::fs;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<Invocation>>,
    }

    impl ToolRunner for Recorder {
        fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
            assert!(invocation.working_dir.is_dir(), "build dir must exist first");
            self.seen.borrow_mut().push(invocation.clone());
            Ok(ToolOutput {
                text: "-- Generating done\n".into(),
                status: Some(0),
                signal: None,
            })
        }
    }

    #[test]
    fn create_embedded_project() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::builtin().unwrap();
        let recorder = Recorder::default();

        let request = CreateRequest::new(dir.path(), "ahrs").debug(true);
        let report = create(&registry, &recorder, &request).unwrap();

        let build = dir.path().join("build");
        assert!(build.join("ahrs").is_dir());
        assert_eq!(report.root_dir, EnsureOutcome::Created);
        assert_eq!(report.project_dir, EnsureOutcome::Created);
        assert_eq!(report.output.text, "-- Generating done\n");

        let seen = recorder.seen.borrow();
        let inv = &seen[0];
        assert_eq!(inv, &report.invocation);
        assert!(inv.has_toolchain_file());
        assert_eq!(inv.working_dir, build.join("ahrs"));
        let mut libs = OsString::from("-DCMAKE_AVRLIBS_PATH=");
        libs.push(build.join("avrlibs"));
        assert!(inv.args.contains(&libs));
        assert_eq!(inv.args[inv.args.len() - 2], "-DCMAKE_BUILD_TYPE=Debug");
        assert_eq!(inv.args.last().unwrap(), dir.path().join("ahrs").as_os_str());
    }

    #[test]
    fn create_native_project_has_no_toolchain() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::builtin().unwrap();
        let recorder = Recorder::default();

        create(&registry, &recorder, &CreateRequest::new(dir.path(), "libuavcan")).unwrap();

        let seen = recorder.seen.borrow();
        let inv = &seen[0];
        assert!(!inv.has_toolchain_file());
        assert_eq!(&inv.args[..2], &["-G", "Ninja"]);
    }

    #[test]
    fn second_create_reuses_directories() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::builtin().unwrap();
        let recorder = Recorder::default();
        let request = CreateRequest::new(dir.path(), "avrlibs");

        create(&registry, &recorder, &request).unwrap();
        let report = create(&registry, &recorder, &request).unwrap();
        assert_eq!(report.root_dir, EnsureOutcome::Existing);
        assert_eq!(report.project_dir, EnsureOutcome::Existing);
        assert_eq!(recorder.seen.borrow().len(), 2);
    }

    #[test]
    fn shared_root_is_reused_across_projects() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::builtin().unwrap();
        let recorder = Recorder::default();

        create(&registry, &recorder, &CreateRequest::new(dir.path(), "avrlibs")).unwrap();
        let report =
            create(&registry, &recorder, &CreateRequest::new(dir.path(), "libuavcan")).unwrap();
        assert_eq!(report.root_dir, EnsureOutcome::Existing);
        assert_eq!(report.project_dir, EnsureOutcome::Created);
    }

    #[test]
    fn unknown_project_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::builtin().unwrap();
        let recorder = Recorder::default();

        let err = create(&registry, &recorder, &CreateRequest::new(dir.path(), "ghost")).unwrap_err();
        assert!(matches!(err, BuildError::UnknownProject { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn root_build_path_as_file_stops_before_tool() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("build"), b"").unwrap();
        let registry = Registry::builtin().unwrap();
        let recorder = Recorder::default();

        let err = create(&registry, &recorder, &CreateRequest::new(dir.path(), "ahrs")).unwrap_err();
        assert!(matches!(err, BuildError::InvalidBuildPath { .. }));
        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn project_build_path_as_file_keeps_root_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/ahrs"), b"").unwrap();
        let registry = Registry::builtin().unwrap();
        let recorder = Recorder::default();

        let err = create(&registry, &recorder, &CreateRequest::new(dir.path(), "ahrs")).unwrap_err();
        assert!(matches!(err, BuildError::InvalidBuildPath { .. }));
        assert!(dir.path().join("build").is_dir());
        assert!(dir.path().join("build/ahrs").is_file());
    }

    #[test]
    fn plan_create_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::builtin().unwrap();

        let inv = plan_create(&registry, &CreateRequest::new(dir.path(), "ahrs").tool("/opt/cmake")).unwrap();
        assert_eq!(inv.program, "/opt/cmake");
        assert_eq!(inv.working_dir, dir.path().join("build/ahrs"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
