//! Target platform tag.
//!
//! The platform decides whether cmake is handed a cross-compilation
//! toolchain file when a project is configured.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of target a project is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Cross-compiled AVR firmware; needs a toolchain file.
    #[serde(alias = "avr")]
    Embedded,
    /// Host-architecture build with the ambient toolchain.
    #[serde(alias = "linux-x86_64")]
    Native,
}

impl Platform {
    /// Whether configuring for this platform requires a toolchain file.
    pub fn needs_toolchain_file(self) -> bool {
        matches!(self, Platform::Embedded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Embedded => "embedded",
            Platform::Native => "native",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
