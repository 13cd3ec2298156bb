//! CLI command implementations.

pub mod create;
pub mod describe;
pub mod list;
