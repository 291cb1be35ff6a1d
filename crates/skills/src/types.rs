use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

pub use skillpm_config::InstallMode;

/// Where a skill is installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Below the project root.
    #[default]
    Project,
    /// Below the user's home directory.
    Global,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub scope: Scope,
    pub mode: InstallMode,
}

impl InstallOptions {
    pub fn new(scope: Scope, mode: InstallMode) -> Self {
        Self { scope, mode }
    }
}

/// Outcome of one (skill, agent) install attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallResult {
    pub success: bool,
    /// The agent-specific skill path.
    pub path: PathBuf,
    /// The shared copy the agent path links to (symlink mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_path: Option<PathBuf>,
    pub mode: InstallMode,
    /// Symlinking failed and the agent received a plain copy instead.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub symlink_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstallResult {
    pub(crate) fn linked(path: PathBuf, canonical_path: PathBuf) -> Self {
        Self {
            success: true,
            path,
            canonical_path: Some(canonical_path),
            mode: InstallMode::Symlink,
            symlink_failed: false,
            error: None,
        }
    }

    pub(crate) fn copied(path: PathBuf) -> Self {
        Self {
            success: true,
            path,
            canonical_path: None,
            mode: InstallMode::Copy,
            symlink_failed: false,
            error: None,
        }
    }

    pub(crate) fn copy_fallback(path: PathBuf, canonical_path: PathBuf) -> Self {
        Self {
            symlink_failed: true,
            ..Self::linked(path, canonical_path)
        }
    }

    pub(crate) fn failed(path: PathBuf, mode: InstallMode, error: impl ToString) -> Self {
        Self {
            success: false,
            path,
            canonical_path: None,
            mode,
            symlink_failed: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstallResult {
    pub success: bool,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UninstallResult {
    pub(crate) fn removed(path: PathBuf) -> Self {
        Self {
            success: true,
            path,
            error: None,
        }
    }

    pub(crate) fn failed(path: PathBuf, error: impl ToString) -> Self {
        Self {
            success: false,
            path,
            error: Some(error.to_string()),
        }
    }
}

/// Outcome of removing a skill from several agents plus its canonical copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstallReport {
    pub agents: BTreeMap<String, UninstallResult>,
    pub canonical: UninstallResult,
}

impl UninstallReport {
    pub fn is_success(&self) -> bool {
        self.canonical.success && self.agents.values().all(|r| r.success)
    }
}

/// A skill found on disk by [`crate::install::Installer::list_installed_skills`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledSkill {
    /// Directory name (already sanitized).
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_path: Option<PathBuf>,
    /// Ids of the agents whose skills directory contains this skill.
    pub agents: Vec<String>,
}
