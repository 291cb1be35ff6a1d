//! Configuration loading, env substitution, and directory helpers.
//!
//! Config files: `skillpm.toml`, `skillpm.yaml`, or `skillpm.json`
//! Searched in `./` then `~/.config/skillpm/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, clear_home_dir, config_dir, discover_and_load, discover_and_load_from,
        home_dir, load_config, set_home_dir,
    },
    schema::{
        AgentOverride, DEFAULT_REGISTRY, InstallConfig, InstallMode, RegistryConfig, SkillpmConfig,
    },
};
