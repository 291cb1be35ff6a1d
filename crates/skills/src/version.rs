use std::fmt;

use serde::{Deserialize, Serialize};

/// Branch assumed when a reference carries no version.
pub const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    /// A tag, e.g. `v1.0.0` or `1.2.3-beta.1+build`.
    Exact,
    Latest,
    /// `^1.2` / `~1.2`. Recorded only; nothing solves constraints.
    Range,
    Branch,
    Commit,
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exact => "exact",
            Self::Latest => "latest",
            Self::Range => "range",
            Self::Branch => "branch",
            Self::Commit => "commit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedVersion {
    pub kind: VersionKind,
    pub value: String,
    pub raw: String,
}

impl ParsedVersion {
    fn new(kind: VersionKind, value: &str, raw: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            raw: raw.to_string(),
        }
    }

    /// The git ref a fetcher should check out, or `None` when the remote's
    /// default head (latest/range) is wanted.
    pub fn git_ref(&self) -> Option<&str> {
        match self.kind {
            VersionKind::Exact | VersionKind::Branch | VersionKind::Commit => Some(&self.value),
            VersionKind::Latest | VersionKind::Range => None,
        }
    }
}

/// Classify a version spec.
///
/// Rules, first match wins: empty → branch `main`; `branch:<x>`; `commit:<x>`;
/// `latest`; leading `^`/`~` → range; anything else is an exact tag.
pub fn parse_version(spec: Option<&str>) -> ParsedVersion {
    let raw = spec.map(str::trim).unwrap_or_default();

    if raw.is_empty() {
        return ParsedVersion::new(VersionKind::Branch, DEFAULT_BRANCH, "");
    }
    if let Some(branch) = raw.strip_prefix("branch:") {
        return ParsedVersion::new(VersionKind::Branch, branch, raw);
    }
    if let Some(commit) = raw.strip_prefix("commit:") {
        return ParsedVersion::new(VersionKind::Commit, commit, raw);
    }
    if raw == "latest" {
        return ParsedVersion::new(VersionKind::Latest, "latest", raw);
    }
    if raw.starts_with(['^', '~']) {
        return ParsedVersion::new(VersionKind::Range, raw, raw);
    }
    ParsedVersion::new(VersionKind::Exact, raw, raw)
}
