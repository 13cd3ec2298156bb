//! avbuild — configure avfirmware project build directories with cmake.

mod commands;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use avbuild_core::dispatch::DEFAULT_TOOL;
use avbuild_core::{BuildError, ProcessRunner, Registry, ToolRunner};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "avbuild",
    version,
    about = "Configure avfirmware project build directories with cmake"
)]
struct Cli {
    /// Registry file to use instead of the built-in project table
    #[arg(long, global = true, value_name = "FILE")]
    registry: Option<PathBuf>,
    /// Build-configuration program to run
    #[arg(long, global = true, value_name = "PROGRAM", default_value = DEFAULT_TOOL)]
    tool: String,
    /// Log resolved paths and flags
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project's build directory and run cmake in it
    #[command(override_usage = "avbuild create [OPTIONS] [debug] <ROOT_DIR> <PROJECT_NAME>")]
    Create {
        /// Configure a Debug build (same as the leading `debug` token)
        #[arg(long)]
        debug: bool,
        /// Print the command without creating directories or running it
        #[arg(long)]
        dry_run: bool,
        /// [debug] <ROOT_DIR> <PROJECT_NAME>
        #[arg(required = true, num_args = 2..=3, value_name = "ARGS")]
        args: Vec<OsString>,
    },
    /// List registered project names
    List,
    /// Show the configuration of one project
    Describe {
        /// Project name
        name: String,
        /// Print the raw record instead (toml, json)
        #[arg(long)]
        format: Option<String>,
        /// Tree root, to show resolved paths and flags
        #[arg(long, value_name = "ROOT_DIR")]
        root: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli, &ProcessRunner) {
        if let Some(BuildError::Usage { detail }) = e.downcast_ref::<BuildError>() {
            Cli::command().error(ErrorKind::InvalidValue, detail).exit();
        }
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli, runner: &dyn ToolRunner) -> anyhow::Result<()> {
    match cli.command {
        Commands::Create {
            debug,
            dry_run,
            args,
        } => {
            // Argument errors are reported before the registry is read.
            let request = commands::create::parse_args(&args, debug)?.tool(cli.tool);
            let registry = load_registry(cli.registry.as_deref())?;
            if dry_run {
                commands::create::dry_run(&registry, &request)
            } else {
                commands::create::run(&registry, runner, &request)
            }
        }

        Commands::List => {
            let registry = load_registry(cli.registry.as_deref())?;
            commands::list::run(&registry)
        }

        Commands::Describe { name, format, root } => {
            let registry = load_registry(cli.registry.as_deref())?;
            commands::describe::run(&registry, &name, format.as_deref(), root.as_deref())
        }
    }
}

/// Load the registry from `path`, or the built-in one.
fn load_registry(path: Option<&Path>) -> anyhow::Result<Registry> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading registry file");
            Registry::load(path).with_context(|| format!("loading registry {}", path.display()))
        }
        None => Registry::builtin().context("loading built-in registry"),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("avbuild=debug,avbuild_core=debug,warn")
    } else {
        EnvFilter::new("avbuild=info,avbuild_core=info,warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
