//! `avbuild describe` — show one project's configuration.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use avbuild_core::paths::{
    absolute_root, project_build_path, source_path, toolchain_file_path, AVR_TOOLCHAIN_FILE,
    ROOT_BUILD_DIRNAME,
};
use avbuild_core::{build_definitions, Registry};

/// Describe a project, either human-readable or as a raw record.
pub fn run(
    registry: &Registry,
    name: &str,
    format: Option<&str>,
    root: Option<&Path>,
) -> Result<()> {
    let stdout = io::stdout();
    write_description(registry, name, format, root, &mut stdout.lock())
}

fn write_description(
    registry: &Registry,
    name: &str,
    format: Option<&str>,
    root: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let config = registry.lookup(name)?;

    match format {
        None => {}
        Some("toml") => {
            let text = toml::to_string_pretty(config).context("serializing project to TOML")?;
            write!(out, "{text}")?;
            return Ok(());
        }
        Some("json") => {
            let text =
                serde_json::to_string_pretty(config).context("serializing project to JSON")?;
            writeln!(out, "{text}")?;
            return Ok(());
        }
        Some(other) => bail!("unknown format '{other}' (expected toml or json)"),
    }

    writeln!(out, "=== Project: {} ===", config.name)?;
    writeln!(out, "Platform:   {}", config.platform)?;
    writeln!(out, "Generator:  {}", config.generator)?;
    if let Some(dep) = &config.dependency_ref {
        writeln!(out, "Depends on: {dep}")?;
    }

    match root {
        Some(root) => {
            let root = absolute_root(root)?;
            writeln!(out, "Source:     {}", source_path(&root, config).display())?;
            writeln!(
                out,
                "Build dir:  {}",
                project_build_path(&root, config).display()
            )?;
            if config.platform.needs_toolchain_file() {
                writeln!(out, "Toolchain:  {}", toolchain_file_path(&root).display())?;
            }
            writeln!(out)?;
            writeln!(out, "--- Definitions ---")?;
            let flags = build_definitions(registry, config, &root, false)?;
            if flags.is_empty() {
                writeln!(out, "  (none)")?;
            }
            for flag in flags {
                writeln!(out, "  {}", flag.to_string_lossy())?;
            }
        }
        None => {
            writeln!(out, "Source:     {}", config.source_subdir.display())?;
            writeln!(
                out,
                "Build dir:  {ROOT_BUILD_DIRNAME}/{}",
                config.build_dirname
            )?;
            if config.platform.needs_toolchain_file() {
                writeln!(out, "Toolchain:  {AVR_TOOLCHAIN_FILE}")?;
            }
            writeln!(out)?;
            writeln!(out, "--- Defines ---")?;
            if config.defines.is_empty() {
                writeln!(out, "  (none)")?;
            }
            for define in &config.defines {
                writeln!(out, "  {define}")?;
            }
        }
    }

    Ok(())
}
