//! Shared utilities for the PEGY workspace
//!
//! Logging setup and environment lookups used by the binaries.

pub mod env;
pub mod logging;

pub use env::{env_parse, env_var};
pub use logging::init_tracing;
