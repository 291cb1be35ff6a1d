use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid skill reference '{raw}': {reason}")]
    InvalidReference { raw: String, reason: String },

    #[error("invalid git url '{raw}': {reason}")]
    InvalidGitUrl { raw: String, reason: String },

    #[error("skill '{name}' not found in {}", .root.display())]
    SkillNotFound { name: String, root: PathBuf },

    #[error("skill '{name}' is ambiguous, candidates: {}", .candidates.join(", "))]
    AmbiguousSkill {
        name: String,
        candidates: Vec<String>,
    },

    #[error("subpath '{sub_path}' does not exist in {}", .root.display())]
    SubPathNotFound { sub_path: String, root: PathBuf },

    #[error("path {} escapes {}", .target.display(), .base.display())]
    PathTraversalRejected { base: PathBuf, target: PathBuf },

    #[error("unknown agent '{id}'")]
    UnknownAgent { id: String },

    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walkdir(#[from] walkdir::Error),

    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn invalid_reference(raw: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_git_url(raw: &str, reason: impl Into<String>) -> Self {
        Self::InvalidGitUrl {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn path_traversal(base: &Path, target: &Path) -> Self {
        Self::PathTraversalRejected {
            base: base.to_path_buf(),
            target: target.to_path_buf(),
        }
    }

    #[must_use]
    pub fn unknown_agent(id: impl Into<String>) -> Self {
        Self::UnknownAgent { id: id.into() }
    }

    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
