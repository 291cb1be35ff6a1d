//! `SKILL.md` frontmatter reading.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Manifest file every skill directory carries.
pub const SKILL_FILE: &str = "SKILL.md";

/// The frontmatter fields the installer cares about. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SkillManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SkillManifest {
    /// Non-blank description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Parse the YAML frontmatter of a `SKILL.md` file.
pub fn parse_manifest(content: &str) -> Result<SkillManifest> {
    let Some(frontmatter) = split_frontmatter(content) else {
        return Err(Error::message(
            "SKILL.md must start with YAML frontmatter delimited by ---",
        ));
    };
    if frontmatter.trim().is_empty() {
        return Ok(SkillManifest::default());
    }
    Ok(serde_yaml::from_str(frontmatter)?)
}

/// Read `<dir>/SKILL.md`. Missing or malformed manifests yield `None`.
pub fn read_manifest(dir: &Path) -> Option<SkillManifest> {
    let path = dir.join(SKILL_FILE);
    let content = std::fs::read_to_string(&path).ok()?;
    match parse_manifest(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable SKILL.md");
            None
        },
    }
}

fn split_frontmatter(content: &str) -> Option<&str> {
    let after_open = content.trim_start().strip_prefix("---")?;
    let close = after_open.find("\n---")?;
    Some(&after_open[..close])
}
