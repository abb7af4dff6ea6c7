//! Configuration loading and env substitution.
//!
//! Config file: `palaver.toml`, searched in `./` then `~/.config/palaver/`.
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{ConfigError, config_dir, discover_and_load, load_config},
    schema::{BackendConfig, PalaverConfig, ServerConfig},
};
