//! Rules-file bridges for agents that only pick up skills through a rules
//! directory (Cursor's `.cursor/rules/*.mdc`).
//!
//! Every generated file carries [`BRIDGE_MARKER`]; files without it belong
//! to the user and are never overwritten or deleted.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{agents::RulesBridge, error::Result, manifest::SKILL_FILE};

pub const BRIDGE_MARKER: &str = "<!-- skillpm:auto-generated -->";

pub fn bridge_path(project_root: &Path, bridge: &RulesBridge, name: &str) -> PathBuf {
    project_root
        .join(&bridge.rules_dir)
        .join(format!("{name}.{}", bridge.extension))
}

/// Whether the file at `path` was written by us.
pub fn is_generated(path: &Path) -> bool {
    fs::read_to_string(path).is_ok_and(|content| content.contains(BRIDGE_MARKER))
}

/// Write (or refresh) the bridge for skill `name`.
///
/// `skill_rel` is the agent's skill directory relative to the project root.
/// Returns `Ok(false)` when a user-authored file already sits at the path.
pub fn write_bridge(
    project_root: &Path,
    bridge: &RulesBridge,
    name: &str,
    description: &str,
    skill_rel: &Path,
) -> Result<bool> {
    let path = bridge_path(project_root, bridge, name);
    if path.exists() && !is_generated(&path) {
        debug!(path = %path.display(), "leaving user-authored rules file alone");
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, render(description, &skill_rel.join(SKILL_FILE)))?;
    debug!(path = %path.display(), "wrote rules bridge");
    Ok(true)
}

/// Delete the bridge for `name` if we generated it. Returns whether a file
/// was removed.
pub fn remove_bridge(project_root: &Path, bridge: &RulesBridge, name: &str) -> Result<bool> {
    let path = bridge_path(project_root, bridge, name);
    if !is_generated(&path) {
        return Ok(false);
    }
    fs::remove_file(&path)?;
    Ok(true)
}

fn render(description: &str, skill_file: &Path) -> String {
    // A JSON string is valid YAML and survives colons and quotes.
    let description = serde_json::to_string(description).unwrap_or_else(|_| "\"\"".into());
    let skill_file = skill_file.to_string_lossy().replace('\\', "/");
    format!(
        "---\ndescription: {description}\nalwaysApply: false\n---\n{BRIDGE_MARKER}\n\nRead and follow the instructions in `{skill_file}` when this rule applies.\n"
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_bridge() -> RulesBridge {
        RulesBridge {
            rules_dir: ".cursor/rules".into(),
            extension: "mdc".into(),
        }
    }

    #[test]
    fn writes_marked_file_with_quoted_description() {
        let tmp = tempfile::tempdir().unwrap();
        let written = write_bridge(
            tmp.path(),
            &cursor_bridge(),
            "pdf",
            "Handle PDFs: \"extract\" text",
            Path::new(".cursor/skills/pdf"),
        )
        .unwrap();
        assert!(written);

        let path = tmp.path().join(".cursor/rules/pdf.mdc");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(BRIDGE_MARKER));
        assert!(content.contains(r#"description: "Handle PDFs: \"extract\" text""#));
        assert!(content.contains(".cursor/skills/pdf/SKILL.md"));
        assert!(content.contains("alwaysApply: false"));
    }

    #[test]
    fn user_files_are_never_touched() {
        let tmp = tempfile::tempdir().unwrap();
        let path = bridge_path(tmp.path(), &cursor_bridge(), "pdf");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "my own rule").unwrap();

        let written = write_bridge(
            tmp.path(),
            &cursor_bridge(),
            "pdf",
            "desc",
            Path::new(".cursor/skills/pdf"),
        )
        .unwrap();
        assert!(!written);
        assert!(!remove_bridge(tmp.path(), &cursor_bridge(), "pdf").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "my own rule");
    }

    #[test]
    fn generated_files_are_refreshed_and_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let skill = Path::new(".cursor/skills/pdf");
        write_bridge(tmp.path(), &cursor_bridge(), "pdf", "old", skill).unwrap();
        write_bridge(tmp.path(), &cursor_bridge(), "pdf", "new", skill).unwrap();

        let path = bridge_path(tmp.path(), &cursor_bridge(), "pdf");
        assert!(fs::read_to_string(&path).unwrap().contains("\"new\""));

        assert!(remove_bridge(tmp.path(), &cursor_bridge(), "pdf").unwrap());
        assert!(!path.exists());
        assert!(!remove_bridge(tmp.path(), &cursor_bridge(), "pdf").unwrap());
    }
}
