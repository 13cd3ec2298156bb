//! cmake invocation: building the command line and running it.
//!
//! Embedded projects are configured with an explicit toolchain file;
//! native projects use whatever compiler cmake finds on the host. The
//! command runs with the project's build directory as its working
//! directory, since cmake writes the generated build files there.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{info, warn};

use crate::defines::path_flag;
use crate::error::{BuildError, Result};
use crate::paths::{project_build_path, source_path, toolchain_file_path};
use crate::registry::ProjectConfig;

/// Default build-configuration tool.
pub const DEFAULT_TOOL: &str = "cmake";

/// A fully resolved command, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: String,
    /// Arguments, in order. Passed without a shell, byte for byte.
    pub args: Vec<OsString>,
    /// Directory the program runs in.
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Whether a `-DCMAKE_TOOLCHAIN_FILE=` argument is present.
    pub fn has_toolchain_file(&self) -> bool {
        self.args
            .iter()
            .any(|a| a.to_string_lossy().starts_with("-DCMAKE_TOOLCHAIN_FILE="))
    }
}

impl fmt::Display for Invocation {
    /// Shell-style rendering, for logs only. Non-UTF-8 bytes are shown
    /// lossily; the arguments themselves are untouched.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        f.write_str(&shell_words::join(words))
    }
}

/// What the tool printed, plus how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// stdout followed by stderr.
    pub text: String,
    /// Exit code; `None` if the process did not exit on its own.
    pub status: Option<i32>,
    /// Terminating signal, when there is one.
    pub signal: Option<i32>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Something that can execute an [`Invocation`].
pub trait ToolRunner {
    /// Run to completion and capture the output.
    ///
    /// Errors only when the program cannot be started; a non-zero exit or
    /// a kill is reported through [`ToolOutput`].
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput>;
}

/// Runs invocations as child processes, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BuildError::ExternalTool {
                program: invocation.program.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ToolOutput {
            text,
            status: output.status.code(),
            signal: exit_signal(&output.status),
        })
    }
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

/// Build the command line for configuring `config`.
///
/// `-G <generator>`, then the toolchain file for embedded projects, then
/// `definitions`, then the source directory.
pub fn plan(
    tool: &str,
    root: &Path,
    config: &ProjectConfig,
    definitions: &[OsString],
) -> Invocation {
    let mut args = vec![OsString::from("-G"), OsString::from(&config.generator)];
    if config.platform.needs_toolchain_file() {
        args.push(path_flag("CMAKE_TOOLCHAIN_FILE", &toolchain_file_path(root)));
    }
    args.extend(definitions.iter().cloned());
    args.push(source_path(root, config).into_os_string());

    Invocation {
        program: tool.to_string(),
        args,
        working_dir: project_build_path(root, config),
    }
}

/// Run a planned invocation, logging the command line.
///
/// The output is returned whatever the exit code; the tool's own
/// diagnostics are the report. A tool that never exited (killed by a
/// signal) is an error, which still carries what it printed.
pub fn execute(runner: &dyn ToolRunner, invocation: &Invocation) -> Result<ToolOutput> {
    info!(dir = %invocation.working_dir.display(), "Executing: {invocation}");
    let output = runner.run(invocation)?;
    if output.status.is_none() {
        return Err(BuildError::ToolTerminated {
            program: invocation.program.clone(),
            signal: output.signal,
            output: output.text,
        });
    }
    if !output.success() {
        warn!(status = ?output.status, "{} exited unsuccessfully", invocation.program);
    }
    Ok(output)
}

/// Plan and run the configuration step for `config`.
pub fn invoke(
    runner: &dyn ToolRunner,
    tool: &str,
    root: &Path,
    config: &ProjectConfig,
    definitions: &[OsString],
) -> Result<ToolOutput> {
    execute(runner, &plan(tool, root, config, definitions))
}
