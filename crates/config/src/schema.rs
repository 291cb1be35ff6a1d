//! Config schema types (registries, install defaults, agent overrides).

use std::{collections::HashMap, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Registry used when a shorthand reference carries no `<registry>:` prefix.
pub const DEFAULT_REGISTRY: &str = "github";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillpmConfig {
    pub registry: RegistryConfig,
    pub install: InstallConfig,
    /// Per-agent directory overrides, keyed by agent id. Unknown ids that
    /// carry both directories register an additional agent.
    pub agents: HashMap<String, AgentOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry name applied to `owner/repo` shorthand.
    pub default: String,
    /// Registry name → base URL. Consulted before the built-in hosts.
    pub urls: HashMap<String, String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_REGISTRY.into(),
            urls: HashMap::new(),
        }
    }
}

/// How a skill is materialized into an agent directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    /// Symlink the agent directory to the shared canonical copy.
    #[default]
    Symlink,
    /// Give the agent an independent copy.
    Copy,
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symlink => write!(f, "symlink"),
            Self::Copy => write!(f, "copy"),
        }
    }
}

impl FromStr for InstallMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symlink" | "link" => Ok(Self::Symlink),
            "copy" => Ok(Self::Copy),
            other => Err(format!("unknown install mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    pub mode: InstallMode,
    /// Replaces the global canonical directory (`~/.agents/skills`).
    pub canonical_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOverride {
    /// Project-relative skills directory.
    pub skills_dir: Option<PathBuf>,
    /// Absolute (or `~/`-prefixed) global skills directory.
    pub global_skills_dir: Option<PathBuf>,
}
