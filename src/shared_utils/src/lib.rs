//! Small helpers shared by the workspace binaries.

#![deny(missing_docs)]

pub mod config;
pub mod env;

pub use config::ConfigError;
pub use env::{get_env_var, get_env_var_or, parse_env_var};
