//! Agent capability table: where each coding agent looks for skills.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use skillpm_config::AgentOverride;

/// A per-skill rules file some agents need before they notice a skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesBridge {
    /// Project-relative directory holding the bridge files.
    pub rules_dir: PathBuf,
    /// File extension, without the dot.
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    pub id: String,
    pub display_name: String,
    /// Skills directory relative to the project root.
    pub skills_dir: PathBuf,
    /// Absolute skills directory for global installs.
    pub global_skills_dir: PathBuf,
    pub bridge: Option<RulesBridge>,
}

impl AgentDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        skills_dir: impl Into<PathBuf>,
        global_skills_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            skills_dir: skills_dir.into(),
            global_skills_dir: global_skills_dir.into(),
            bridge: None,
        }
    }

    pub fn with_bridge(mut self, rules_dir: impl Into<PathBuf>, extension: &str) -> Self {
        self.bridge = Some(RulesBridge {
            rules_dir: rules_dir.into(),
            extension: extension.to_string(),
        });
        self
    }
}

/// Immutable id → descriptor lookup, injected into the installer.
#[derive(Debug, Clone, Default)]
pub struct AgentTable {
    agents: BTreeMap<String, AgentDescriptor>,
}

impl AgentTable {
    pub fn new(agents: impl IntoIterator<Item = AgentDescriptor>) -> Self {
        Self {
            agents: agents.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }

    /// The agents known out of the box, with global dirs under `home`.
    pub fn builtin(home: &Path) -> Self {
        Self::new([
            AgentDescriptor::new(
                "claude-code",
                "Claude Code",
                ".claude/skills",
                home.join(".claude/skills"),
            ),
            AgentDescriptor::new(
                "cursor",
                "Cursor",
                ".cursor/skills",
                home.join(".cursor/skills"),
            )
            .with_bridge(".cursor/rules", "mdc"),
            AgentDescriptor::new("codex", "Codex", ".codex/skills", home.join(".codex/skills")),
            AgentDescriptor::new(
                "opencode",
                "OpenCode",
                ".opencode/skills",
                home.join(".config/opencode/skills"),
            ),
            AgentDescriptor::new(
                "windsurf",
                "Windsurf",
                ".windsurf/skills",
                home.join(".codeium/windsurf/skills"),
            ),
            AgentDescriptor::new("cline", "Cline", ".cline/skills", home.join(".cline/skills")),
            AgentDescriptor::new(
                "github-copilot",
                "GitHub Copilot",
                ".github/skills",
                home.join(".copilot/skills"),
            ),
            AgentDescriptor::new(
                "gemini-cli",
                "Gemini CLI",
                ".gemini/skills",
                home.join(".gemini/skills"),
            ),
            AgentDescriptor::new(
                "goose",
                "Goose",
                ".goose/skills",
                home.join(".config/goose/skills"),
            ),
            AgentDescriptor::new("roo", "Roo Code", ".roo/skills", home.join(".roo/skills")),
            AgentDescriptor::new(
                "amp",
                "Amp",
                ".agents/skills",
                home.join(".config/agents/skills"),
            ),
        ])
    }

    /// Apply config overrides. Unknown ids become new agents when both
    /// directories are given; otherwise they are skipped.
    pub fn with_overrides(mut self, overrides: &HashMap<String, AgentOverride>, home: &Path) -> Self {
        for (id, agent_override) in overrides {
            let skills_dir = agent_override.skills_dir.clone();
            let global_dir = agent_override
                .global_skills_dir
                .as_deref()
                .map(|p| expand_home(p, home));

            match self.agents.get_mut(id) {
                Some(agent) => {
                    if let Some(dir) = skills_dir {
                        agent.skills_dir = dir;
                    }
                    if let Some(dir) = global_dir {
                        agent.global_skills_dir = dir;
                    }
                },
                None => match (skills_dir, global_dir) {
                    (Some(skills_dir), Some(global_dir)) => {
                        self.agents.insert(
                            id.clone(),
                            AgentDescriptor::new(id.clone(), id.clone(), skills_dir, global_dir),
                        );
                    },
                    _ => {
                        tracing::warn!(agent = %id, "ignoring override for unknown agent without both directories");
                    },
                },
            }
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&AgentDescriptor> {
        self.agents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.values()
    }
}

pub(crate) fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Asks whether an agent is present on this machine. Only orchestration
/// code (agent pickers, `doctor`-style reports) calls this; the installer
/// never asks.
pub trait AgentDetector: Send + Sync {
    fn is_present(&self, agent: &AgentDescriptor) -> bool;
}

/// Treats an agent as present when the parent of its global skills
/// directory (e.g. `~/.claude`) exists.
pub struct DirectoryDetector;

impl AgentDetector for DirectoryDetector {
    fn is_present(&self, agent: &AgentDescriptor) -> bool {
        agent
            .global_skills_dir
            .parent()
            .is_some_and(Path::is_dir)
    }
}

/// Agents in `table` that `detector` reports as present.
pub fn detect_agents<'a>(
    table: &'a AgentTable,
    detector: &dyn AgentDetector,
) -> Vec<&'a AgentDescriptor> {
    table.iter().filter(|a| detector.is_present(a)).collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_home_relative() {
        let table = AgentTable::builtin(Path::new("/home/dev"));
        let claude = table.get("claude-code").unwrap();
        assert_eq!(claude.skills_dir, PathBuf::from(".claude/skills"));
        assert_eq!(
            claude.global_skills_dir,
            PathBuf::from("/home/dev/.claude/skills")
        );
        assert!(claude.bridge.is_none());
        assert!(table.get("cursor").unwrap().bridge.is_some());
        assert!(table.get("nonexistent").is_none());
    }

    #[test]
    fn overrides_patch_and_extend() {
        let home = Path::new("/home/dev");
        let overrides = HashMap::from([
            (
                "cursor".to_string(),
                AgentOverride {
                    skills_dir: Some(".cursor/custom".into()),
                    global_skills_dir: None,
                },
            ),
            (
                "zed".to_string(),
                AgentOverride {
                    skills_dir: Some(".zed/skills".into()),
                    global_skills_dir: Some("~/.config/zed/skills".into()),
                },
            ),
            (
                "half".to_string(),
                AgentOverride {
                    skills_dir: Some(".half/skills".into()),
                    global_skills_dir: None,
                },
            ),
        ]);
        let table = AgentTable::builtin(home).with_overrides(&overrides, home);

        let cursor = table.get("cursor").unwrap();
        assert_eq!(cursor.skills_dir, PathBuf::from(".cursor/custom"));
        assert_eq!(
            cursor.global_skills_dir,
            PathBuf::from("/home/dev/.cursor/skills")
        );
        assert!(cursor.bridge.is_some());

        let zed = table.get("zed").unwrap();
        assert_eq!(
            zed.global_skills_dir,
            PathBuf::from("/home/dev/.config/zed/skills")
        );
        assert!(!table.contains("half"));
    }

    #[test]
    fn directory_detector_checks_agent_home() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join(".claude")).unwrap();
        let table = AgentTable::builtin(tmp.path());

        let present: Vec<&str> = detect_agents(&table, &DirectoryDetector)
            .into_iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(present, vec!["claude-code"]);
    }
}
