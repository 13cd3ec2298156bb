//! `avbuild create` — make the build directory and run cmake in it.

use std::ffi::OsString;
use std::io::{self, Write};

use anyhow::Result;
use avbuild_core::{create, plan_create, BuildError, CreateRequest, Registry, ToolRunner};

/// Token that may precede the positional arguments to request a Debug build.
pub const DEBUG_TOKEN: &str = "debug";

/// Interpret `[debug] <root_dir> <project_name>`.
///
/// The root is kept as raw OS bytes; the project name must be UTF-8.
pub fn parse_args(
    args: &[OsString],
    debug_flag: bool,
) -> std::result::Result<CreateRequest, BuildError> {
    match args {
        [root, project] => Ok(CreateRequest::new(root, project_name(project)?).debug(debug_flag)),
        [token, root, project] if token == DEBUG_TOKEN => {
            Ok(CreateRequest::new(root, project_name(project)?).debug(true))
        }
        [token, _, _] => Err(BuildError::Usage {
            detail: format!(
                "unexpected argument '{}' (expected [{DEBUG_TOKEN}] <ROOT_DIR> <PROJECT_NAME>)",
                token.to_string_lossy()
            ),
        }),
        _ => Err(BuildError::Usage {
            detail: format!(
                "expected [{DEBUG_TOKEN}] <ROOT_DIR> <PROJECT_NAME>, got {} arguments",
                args.len()
            ),
        }),
    }
}

fn project_name(arg: &OsString) -> std::result::Result<&str, BuildError> {
    arg.to_str().ok_or_else(|| BuildError::Usage {
        detail: format!("project name '{}' is not valid UTF-8", arg.to_string_lossy()),
    })
}

/// Create the directories, run the tool, and print what it printed.
pub fn run(registry: &Registry, runner: &dyn ToolRunner, request: &CreateRequest) -> Result<()> {
    let stdout = io::stdout();
    run_to(registry, runner, request, &mut stdout.lock())
}

fn run_to(
    registry: &Registry,
    runner: &dyn ToolRunner,
    request: &CreateRequest,
    out: &mut impl Write,
) -> Result<()> {
    match create(registry, runner, request) {
        Ok(report) => {
            out.write_all(report.output.text.as_bytes())?;
            Ok(())
        }
        Err(err) => {
            // A killed tool still gets its diagnostics relayed.
            if let BuildError::ToolTerminated { output, .. } = &err {
                out.write_all(output.as_bytes())?;
            }
            Err(err.into())
        }
    }
}

/// Print the command `run` would execute, touching nothing.
pub fn dry_run(registry: &Registry, request: &CreateRequest) -> Result<()> {
    let invocation = plan_create(registry, request)?;
    println!("Would run in {}:", invocation.working_dir.display());
    println!("  {invocation}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use avbuild_core::{Invocation, ToolOutput};
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    struct Killed;

    impl ToolRunner for Killed {
        fn run(&self, _invocation: &Invocation) -> avbuild_core::Result<ToolOutput> {
            Ok(ToolOutput {
                text: "-- The C compiler identification".into(),
                status: None,
                signal: Some(9),
            })
        }
    }

    #[test]
    fn two_args() {
        let request = parse_args(&args(&["/r", "ahrs"]), false).unwrap();
        assert_eq!(request.root, PathBuf::from("/r"));
        assert_eq!(request.project, "ahrs");
        assert!(!request.debug);
    }

    #[test]
    fn debug_token() {
        let request = parse_args(&args(&["debug", "/r", "ahrs"]), false).unwrap();
        assert!(request.debug);
        assert_eq!(request.project, "ahrs");
    }

    #[test]
    fn debug_flag() {
        assert!(parse_args(&args(&["/r", "ahrs"]), true).unwrap().debug);
    }

    #[test]
    fn wrong_token() {
        let err = parse_args(&args(&["Debug", "/r", "ahrs"]), false).unwrap_err();
        assert!(matches!(err, BuildError::Usage { .. }));
    }

    #[test]
    fn wrong_count() {
        assert!(parse_args(&args(&["/r"]), false).is_err());
        assert!(parse_args(&args(&["debug", "/r", "a", "b"]), false).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_root_is_kept_and_non_utf8_name_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = OsStr::from_bytes(b"/r/tree\xff").to_os_string();
        let request = parse_args(&[root.clone(), "ahrs".into()], false).unwrap();
        assert_eq!(request.root, PathBuf::from(&root));

        let name = OsStr::from_bytes(b"ahrs\xff").to_os_string();
        let err = parse_args(&["/r".into(), name], false).unwrap_err();
        assert!(matches!(err, BuildError::Usage { .. }));
    }

    #[test]
    fn killed_tool_output_is_relayed_then_error_returned() {
        let registry = Registry::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();

        let err = run_to(&registry, &Killed, &CreateRequest::new(dir.path(), "avrlibs"), &mut out)
            .unwrap_err();
        assert_eq!(String::from_utf8(out).unwrap(), "-- The C compiler identification");
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::ToolTerminated { signal: Some(9), .. })
        ));
    }

    #[test]
    fn dry_run_known_project() {
        let registry = Registry::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        dry_run(&registry, &CreateRequest::new(dir.path(), "ahrs")).unwrap();
        assert!(!dir.path().join("build").exists());
    }
}
