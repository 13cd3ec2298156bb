//! `avbuild list` — registered project names.

use std::io::{self, Write};

use anyhow::Result;
use avbuild_core::Registry;

/// Print every project name, one per line, sorted.
pub fn run(registry: &Registry) -> Result<()> {
    let stdout = io::stdout();
    write_names(registry, &mut stdout.lock())
}

fn write_names(registry: &Registry, out: &mut impl Write) -> Result<()> {
    for name in registry.list_names() {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_sorted() {
        let registry = Registry::builtin().unwrap();
        let mut out = Vec::new();
        write_names(&registry, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ahrs\navrlibs\nlibuavcan\n");
    }

    #[test]
    fn empty_registry_prints_nothing() {
        let registry = Registry::from_toml_str("version = 1\n").unwrap();
        let mut out = Vec::new();
        write_names(&registry, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
