//! Multi-agent installation engine.
//!
//! A skill named `pdf` installed in symlink mode lives once at
//! `<canonical-base>/pdf` and every agent gets `<agent-base>/pdf` pointing at
//! it. Copy mode skips the canonical copy and gives each agent its own tree.
//!
//! Install and uninstall never return `Err`: every failure is captured in the
//! per-agent result so a multi-agent run always completes.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use skillpm_config::SkillpmConfig;
use tracing::{debug, info, warn};

use crate::{
    agents::{AgentDescriptor, AgentTable, expand_home},
    bridge,
    copy::{remove_path, replace_with_copy},
    error::{Error, Result},
    link::{LinkOutcome, Linker, SystemLinker, ensure_link},
    manifest::read_manifest,
    path_safety::{absolutize, ensure_path_safe, sanitize_name},
    types::{
        InstallMode, InstallOptions, InstallResult, InstalledSkill, Scope, UninstallReport,
        UninstallResult,
    },
};

/// Canonical skills directory, relative to the project root (project scope)
/// or the home directory (global scope).
pub const CANONICAL_DIR: &str = ".agents/skills";

pub struct Installer {
    project_root: PathBuf,
    global_canonical_dir: PathBuf,
    agents: AgentTable,
    linker: Box<dyn Linker>,
}

impl Installer {
    pub fn new(project_root: impl Into<PathBuf>, home: &Path, agents: AgentTable) -> Self {
        Self {
            project_root: project_root.into(),
            global_canonical_dir: home.join(CANONICAL_DIR),
            agents,
            linker: Box::new(SystemLinker),
        }
    }

    /// Built-in agents patched with `config.agents`, rooted at the detected
    /// home directory.
    pub fn from_config(config: &SkillpmConfig, project_root: impl Into<PathBuf>) -> Result<Self> {
        let home = skillpm_config::home_dir()
            .ok_or_else(|| Error::message("could not determine the home directory"))?;
        let agents = AgentTable::builtin(&home).with_overrides(&config.agents, &home);
        let mut installer = Self::new(project_root, &home, agents);
        if let Some(dir) = &config.install.canonical_dir {
            installer.global_canonical_dir = expand_home(dir, &home);
        }
        Ok(installer)
    }

    #[must_use]
    pub fn with_linker(mut self, linker: impl Linker + 'static) -> Self {
        self.linker = Box::new(linker);
        self
    }

    #[must_use]
    pub fn with_global_canonical_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_canonical_dir = dir.into();
        self
    }

    pub fn agents(&self) -> &AgentTable {
        &self.agents
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn canonical_base(&self, scope: Scope) -> PathBuf {
        match scope {
            Scope::Project => self.project_root.join(CANONICAL_DIR),
            Scope::Global => self.global_canonical_dir.clone(),
        }
    }

    fn agent_base(&self, agent: &AgentDescriptor, scope: Scope) -> PathBuf {
        match scope {
            Scope::Project => self.project_root.join(&agent.skills_dir),
            Scope::Global => agent.global_skills_dir.clone(),
        }
    }

    /// Where the shared copy of `name` lives for `scope`.
    pub fn canonical_path(&self, name: &str, scope: Scope) -> PathBuf {
        self.canonical_base(scope).join(sanitize_name(name))
    }

    /// Where `agent_id` sees skill `name` for `scope`.
    pub fn agent_skill_path(&self, name: &str, agent_id: &str, scope: Scope) -> Result<PathBuf> {
        let agent = self
            .agents
            .get(agent_id)
            .ok_or_else(|| Error::unknown_agent(agent_id))?;
        Ok(self.agent_base(agent, scope).join(sanitize_name(name)))
    }

    pub fn is_installed(&self, name: &str, agent_id: &str, scope: Scope) -> bool {
        self.agent_skill_path(name, agent_id, scope)
            .is_ok_and(|path| path.exists())
    }

    pub fn is_installed_in_canonical(&self, name: &str, scope: Scope) -> bool {
        self.canonical_path(name, scope).is_dir()
    }

    /// Install the skill at `source` for one agent.
    pub fn install_for_agent(
        &self,
        source: &Path,
        raw_name: &str,
        agent_id: &str,
        options: InstallOptions,
    ) -> InstallResult {
        let name = sanitize_name(raw_name);
        let Some(agent) = self.agents.get(agent_id) else {
            warn!(skill = %name, agent = %agent_id, "install for unknown agent");
            return InstallResult::failed(PathBuf::new(), options.mode, Error::unknown_agent(agent_id));
        };

        let agent_base = self.agent_base(agent, options.scope);
        let agent_dir = agent_base.join(&name);
        let canonical_base = self.canonical_base(options.scope);
        let canonical_dir = canonical_base.join(&name);

        let guarded = ensure_path_safe(&agent_base, &agent_dir)
            .and_then(|()| ensure_path_safe(&canonical_base, &canonical_dir));
        if let Err(e) = guarded {
            warn!(skill = %name, agent = %agent_id, error = %e, "refusing install outside base");
            return InstallResult::failed(agent_dir, options.mode, e);
        }

        let outcome = match options.mode {
            InstallMode::Copy => self.install_copy(source, &agent_dir),
            InstallMode::Symlink => self.install_linked(source, &canonical_dir, &agent_dir),
        };
        let result = outcome.unwrap_or_else(|e| {
            warn!(skill = %name, agent = %agent_id, error = %e, "install failed");
            InstallResult::failed(agent_dir.clone(), options.mode, e)
        });

        if result.success {
            info!(
                skill = %name,
                agent = %agent_id,
                mode = %result.mode,
                symlink_failed = result.symlink_failed,
                path = %result.path.display(),
                "installed skill"
            );
            if options.scope == Scope::Project {
                self.refresh_bridge(agent, &name, &agent_dir);
            }
        }
        result
    }

    /// Install for each agent in order. One agent failing never blocks the rest.
    pub fn install_to_agents<S: AsRef<str>>(
        &self,
        source: &Path,
        raw_name: &str,
        agent_ids: &[S],
        options: InstallOptions,
    ) -> BTreeMap<String, InstallResult> {
        let mut results = BTreeMap::new();
        for agent_id in agent_ids {
            let agent_id = agent_id.as_ref();
            let result = self.install_for_agent(source, raw_name, agent_id, options);
            results.insert(agent_id.to_string(), result);
        }
        results
    }

    fn install_copy(&self, source: &Path, agent_dir: &Path) -> Result<InstallResult> {
        let files = replace_with_copy(source, agent_dir)?;
        debug!(path = %agent_dir.display(), files, "copied skill");
        Ok(InstallResult::copied(agent_dir.to_path_buf()))
    }

    fn install_linked(
        &self,
        source: &Path,
        canonical_dir: &Path,
        agent_dir: &Path,
    ) -> Result<InstallResult> {
        if !same_location(source, canonical_dir) {
            let files = replace_with_copy(source, canonical_dir)?;
            debug!(path = %canonical_dir.display(), files, "refreshed canonical copy");
        }

        // Agents that read the canonical directory directly need no link.
        if same_location(agent_dir, canonical_dir) {
            return Ok(InstallResult::linked(
                agent_dir.to_path_buf(),
                canonical_dir.to_path_buf(),
            ));
        }

        match ensure_link(self.linker.as_ref(), canonical_dir, agent_dir)? {
            LinkOutcome::AlreadyLinked | LinkOutcome::Linked => Ok(InstallResult::linked(
                agent_dir.to_path_buf(),
                canonical_dir.to_path_buf(),
            )),
            LinkOutcome::Failed(e) => {
                warn!(path = %agent_dir.display(), error = %e, "symlink failed, copying instead");
                replace_with_copy(source, agent_dir)?;
                Ok(InstallResult::copy_fallback(
                    agent_dir.to_path_buf(),
                    canonical_dir.to_path_buf(),
                ))
            },
        }
    }

    fn refresh_bridge(&self, agent: &AgentDescriptor, name: &str, agent_dir: &Path) {
        let Some(rules) = &agent.bridge else {
            return;
        };
        let Some(manifest) = read_manifest(agent_dir) else {
            return;
        };
        let Some(description) = manifest.description() else {
            return;
        };

        let skill_rel = agent.skills_dir.join(name);
        if let Err(e) = bridge::write_bridge(&self.project_root, rules, name, description, &skill_rel) {
            warn!(skill = %name, agent = %agent.id, error = %e, "could not write rules bridge");
        }
    }

    /// Remove skill `name` from one agent. The canonical copy is left alone,
    /// including when the agent reads the canonical directory directly.
    pub fn uninstall_from_agent(&self, name: &str, agent_id: &str, scope: Scope) -> UninstallResult {
        let name = sanitize_name(name);
        let Some(agent) = self.agents.get(agent_id) else {
            return UninstallResult::failed(PathBuf::new(), Error::unknown_agent(agent_id));
        };

        let agent_base = self.agent_base(agent, scope);
        let agent_dir = agent_base.join(&name);
        if let Err(e) = ensure_path_safe(&agent_base, &agent_dir) {
            return UninstallResult::failed(agent_dir, e);
        }

        if scope == Scope::Project
            && let Some(rules) = &agent.bridge
        {
            match bridge::remove_bridge(&self.project_root, rules, &name) {
                Ok(true) => debug!(skill = %name, agent = %agent_id, "removed rules bridge"),
                Ok(false) => {},
                Err(e) => warn!(skill = %name, agent = %agent_id, error = %e, "could not remove rules bridge"),
            }
        }

        if same_location(&agent_dir, &self.canonical_path(&name, scope)) {
            debug!(skill = %name, agent = %agent_id, "agent uses the canonical copy directly");
            return UninstallResult::removed(agent_dir);
        }

        match remove_path(&agent_dir) {
            Ok(()) => {
                debug!(skill = %name, agent = %agent_id, "removed agent skill path");
                UninstallResult::removed(agent_dir)
            },
            Err(e) => {
                warn!(skill = %name, agent = %agent_id, error = %e, "uninstall failed");
                UninstallResult::failed(agent_dir, e)
            },
        }
    }

    /// Remove skill `name` from every listed agent, then delete the shared
    /// canonical copy once.
    pub fn uninstall_from_agents<S: AsRef<str>>(
        &self,
        name: &str,
        agent_ids: &[S],
        scope: Scope,
    ) -> UninstallReport {
        let agents = agent_ids
            .iter()
            .map(|id| {
                let id = id.as_ref();
                (id.to_string(), self.uninstall_from_agent(name, id, scope))
            })
            .collect();

        let canonical = self.remove_canonical(name, scope);
        info!(skill = %sanitize_name(name), scope = ?scope, "uninstalled skill");
        UninstallReport { agents, canonical }
    }

    fn remove_canonical(&self, name: &str, scope: Scope) -> UninstallResult {
        let base = self.canonical_base(scope);
        let path = base.join(sanitize_name(name));
        if let Err(e) = ensure_path_safe(&base, &path) {
            return UninstallResult::failed(path, e);
        }
        match remove_path(&path) {
            Ok(()) => UninstallResult::removed(path),
            Err(e) => UninstallResult::failed(path, e),
        }
    }

    /// Every skill present in the canonical directory or any agent directory
    /// for `scope`, sorted by name.
    pub fn list_installed_skills(&self, scope: Scope) -> Vec<InstalledSkill> {
        let mut skills: BTreeMap<String, InstalledSkill> = BTreeMap::new();

        for (name, path) in skill_dirs(&self.canonical_base(scope)) {
            let description = describe(&path);
            skills.insert(name.clone(), InstalledSkill {
                name,
                description,
                canonical_path: Some(path),
                agents: Vec::new(),
            });
        }

        for agent in self.agents.iter() {
            for (name, path) in skill_dirs(&self.agent_base(agent, scope)) {
                let entry = skills.entry(name.clone()).or_insert_with(|| InstalledSkill {
                    name,
                    description: describe(&path),
                    canonical_path: None,
                    agents: Vec::new(),
                });
                entry.agents.push(agent.id.clone());
            }
        }

        skills.into_values().collect()
    }
}

/// Skill directories (or links to them) directly below `base`.
fn skill_dirs(base: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = fs::read_dir(base) else {
        return Vec::new();
    };
    let mut dirs: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            (!name.starts_with('.') && path.is_dir()).then_some((name, path))
        })
        .collect();
    dirs.sort();
    dirs
}

fn describe(dir: &Path) -> Option<String> {
    read_manifest(dir).and_then(|m| m.description().map(str::to_string))
}

/// Whether two paths name the same entry. Parent directories are resolved,
/// the final component is not, so a link to the canonical copy is not the
/// canonical copy.
fn same_location(a: &Path, b: &Path) -> bool {
    match (resolve_parent(a), resolve_parent(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn resolve_parent(path: &Path) -> Option<PathBuf> {
    let path = absolutize(path)?;
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
            Some(parent.join(name))
        },
        _ => Some(path),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::copy::occupied,
        std::{
            io,
            sync::{
                Arc,
                atomic::{AtomicUsize, Ordering},
            },
        },
    };

    struct Fixture {
        _tmp: tempfile::TempDir,
        project: PathBuf,
        home: PathBuf,
        source: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let project = tmp.path().join("project");
            let home = tmp.path().join("home");
            let source = tmp.path().join("checkout");
            fs::create_dir_all(&project).unwrap();
            fs::create_dir_all(&home).unwrap();
            fs::create_dir_all(source.join("scripts")).unwrap();
            fs::create_dir_all(source.join(".git")).unwrap();
            fs::write(
                source.join("SKILL.md"),
                "---\nname: pdf\ndescription: Work with PDF files\n---\n# PDF\n",
            )
            .unwrap();
            fs::write(source.join("scripts/extract.py"), "print('pdf')").unwrap();
            fs::write(source.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
            Self {
                _tmp: tmp,
                project,
                home,
                source,
            }
        }

        fn installer(&self) -> Installer {
            Installer::new(&self.project, &self.home, AgentTable::builtin(&self.home))
        }
    }

    #[derive(Clone, Default)]
    struct CountingLinker(Arc<AtomicUsize>);

    impl Linker for CountingLinker {
        fn link_dir(&self, target: &Path, link: &Path) -> io::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            SystemLinker.link_dir(target, link)
        }
    }

    struct FailingLinker;

    impl Linker for FailingLinker {
        fn link_dir(&self, _target: &Path, _link: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "symlinks disabled"))
        }
    }

    fn symlink() -> InstallOptions {
        InstallOptions::default()
    }

    fn copy() -> InstallOptions {
        InstallOptions::new(Scope::Project, InstallMode::Copy)
    }

    #[cfg(unix)]
    #[test]
    fn fresh_symlink_install_links_to_canonical() {
        let fx = Fixture::new();
        let installer = fx.installer();

        let result = installer.install_for_agent(&fx.source, "pdf", "claude-code", symlink());
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.mode, InstallMode::Symlink);
        assert!(!result.symlink_failed);

        let canonical = fx.project.join(".agents/skills/pdf");
        assert_eq!(result.canonical_path.as_deref(), Some(canonical.as_path()));
        assert!(canonical.join("SKILL.md").is_file());
        assert!(!canonical.join(".git").exists());

        let agent = fx.project.join(".claude/skills/pdf");
        assert_eq!(result.path, agent);
        assert!(fs::symlink_metadata(&agent).unwrap().file_type().is_symlink());
        assert!(crate::link::points_to(&agent, &canonical));
        assert!(agent.join("scripts/extract.py").is_file());

        assert!(installer.is_installed("pdf", "claude-code", Scope::Project));
        assert!(installer.is_installed_in_canonical("pdf", Scope::Project));
        assert!(!installer.is_installed("pdf", "codex", Scope::Project));
    }

    #[cfg(unix)]
    #[test]
    fn reinstall_over_correct_link_does_not_relink() {
        let fx = Fixture::new();
        let linker = CountingLinker::default();
        let calls = Arc::clone(&linker.0);
        let installer = fx.installer().with_linker(linker);

        let first = installer.install_for_agent(&fx.source, "pdf", "claude-code", symlink());
        let second = installer.install_for_agent(&fx.source, "pdf", "claude-code", symlink());

        assert!(first.success && second.success);
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_symlink_falls_back_to_copy() {
        let fx = Fixture::new();
        let installer = fx.installer().with_linker(FailingLinker);

        let result = installer.install_for_agent(&fx.source, "pdf", "codex", symlink());
        assert!(result.success);
        assert_eq!(result.mode, InstallMode::Symlink);
        assert!(result.symlink_failed);

        let agent = fx.project.join(".codex/skills/pdf");
        let meta = fs::symlink_metadata(&agent).unwrap();
        assert!(meta.is_dir() && !meta.file_type().is_symlink());
        assert!(agent.join("SKILL.md").is_file());
        assert!(agent.join("scripts/extract.py").is_file());
        assert!(!agent.join(".git").exists());
    }

    #[test]
    fn copy_mode_writes_independent_tree() {
        let fx = Fixture::new();
        let result = fx
            .installer()
            .install_for_agent(&fx.source, "pdf", "claude-code", copy());

        assert!(result.success);
        assert_eq!(result.mode, InstallMode::Copy);
        assert!(result.canonical_path.is_none());
        let agent = fx.project.join(".claude/skills/pdf");
        assert!(!fs::symlink_metadata(&agent).unwrap().file_type().is_symlink());
        assert!(agent.join("SKILL.md").is_file());
        assert!(!fx.project.join(".agents/skills/pdf").exists());
    }

    #[test]
    fn copy_mode_replaces_previous_contents() {
        let fx = Fixture::new();
        let installer = fx.installer();
        let agent = fx.project.join(".claude/skills/pdf");
        fs::create_dir_all(&agent).unwrap();
        fs::write(agent.join("stale.md"), "old").unwrap();

        installer.install_for_agent(&fx.source, "pdf", "claude-code", copy());
        assert!(!agent.join("stale.md").exists());
    }

    #[test]
    fn unknown_agent_fails_without_blocking_others() {
        let fx = Fixture::new();
        let results = fx.installer().install_to_agents(
            &fx.source,
            "pdf",
            &["nope", "claude-code"],
            copy(),
        );

        let nope = &results["nope"];
        assert!(!nope.success);
        assert!(nope.error.as_deref().unwrap().contains("unknown agent"));
        assert!(results["claude-code"].success);
        assert_eq!(results.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn missing_source_leaves_linked_agents_working() {
        let fx = Fixture::new();
        let installer = fx.installer();
        let codex = installer.install_for_agent(&fx.source, "pdf", "codex", symlink());
        assert!(codex.success, "{:?}", codex.error);

        let missing = fx.project.join("no-such-checkout");
        let result = installer.install_for_agent(&missing, "pdf", "claude-code", symlink());

        assert!(!result.success);
        assert!(result.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(fx.project.join(".codex/skills/pdf/SKILL.md").is_file());
        assert!(installer.is_installed_in_canonical("pdf", Scope::Project));
        assert!(!installer.is_installed("pdf", "claude-code", Scope::Project));
        assert!(!occupied(&fx.project.join(".claude/skills/pdf")));
    }

    #[test]
    fn failed_copy_keeps_previous_install() {
        let fx = Fixture::new();
        let installer = fx.installer();
        assert!(installer.install_for_agent(&fx.source, "pdf", "claude-code", copy()).success);

        let missing = fx.project.join("no-such-checkout");
        let result = installer.install_for_agent(&missing, "pdf", "claude-code", copy());
        assert!(!result.success);
        assert_eq!(result.path, fx.project.join(".claude/skills/pdf"));

        let skill = fx.project.join(".claude/skills/pdf");
        assert!(skill.join("SKILL.md").is_file());
        assert!(skill.join("scripts/extract.py").is_file());
        let entries = fs::read_dir(fx.project.join(".claude/skills")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn missing_source_in_copy_mode_installs_nothing() {
        let fx = Fixture::new();
        let installer = fx.installer();
        let missing = fx.project.join("no-such-checkout");

        let result = installer.install_for_agent(&missing, "pdf", "codex", copy());
        assert!(!result.success);
        assert!(!installer.is_installed("pdf", "codex", Scope::Project));
        assert!(installer.list_installed_skills(Scope::Project).is_empty());
    }

    #[test]
    fn filesystem_error_is_reported_while_other_agents_install() {
        let fx = Fixture::new();
        // A plain file where the agent's config directory should be.
        fs::write(fx.project.join(".codex"), "not a directory").unwrap();

        let results = fx.installer().install_to_agents(
            &fx.source,
            "pdf",
            &["codex", "claude-code"],
            copy(),
        );

        let codex = &results["codex"];
        assert!(!codex.success);
        assert_eq!(codex.mode, InstallMode::Copy);
        assert_eq!(codex.path, fx.project.join(".codex/skills/pdf"));
        assert!(codex.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(fx.project.join(".codex").is_file());

        let claude = &results["claude-code"];
        assert!(claude.success, "{:?}", claude.error);
        assert!(fx.project.join(".claude/skills/pdf/SKILL.md").is_file());

        let listed = fx.installer().list_installed_skills(Scope::Project);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].agents, vec!["claude-code"]);
    }

    #[test]
    fn hostile_names_stay_inside_bases() {
        let fx = Fixture::new();
        let installer = fx.installer();
        let result = installer.install_for_agent(&fx.source, "../../../etc", "claude-code", copy());
        assert!(result.success);
        assert_eq!(result.path, fx.project.join(".claude/skills/etc"));

        let placeholder = installer.install_for_agent(&fx.source, "..", "claude-code", copy());
        assert_eq!(
            placeholder.path,
            fx.project.join(".claude/skills/unnamed-skill")
        );
    }

    #[cfg(unix)]
    #[test]
    fn canonical_agent_needs_no_link() {
        let fx = Fixture::new();
        let linker = CountingLinker::default();
        let calls = Arc::clone(&linker.0);
        let installer = fx.installer().with_linker(linker);

        let result = installer.install_for_agent(&fx.source, "pdf", "amp", symlink());
        assert!(result.success);
        assert_eq!(result.path, fx.project.join(".agents/skills/pdf"));
        assert!(result.path.join("SKILL.md").is_file());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[cfg(unix)]
    #[test]
    fn uninstall_from_agents_removes_canonical_once() {
        let fx = Fixture::new();
        let installer = fx.installer();
        let agents = ["claude-code", "codex", "cursor"];
        let installed = installer.install_to_agents(&fx.source, "pdf", &agents, symlink());
        assert!(installed.values().all(|r| r.success));

        // A single-agent uninstall keeps the shared copy for the others.
        let single = installer.uninstall_from_agent("pdf", "codex", Scope::Project);
        assert!(single.success);
        assert!(installer.is_installed_in_canonical("pdf", Scope::Project));
        assert!(installer.is_installed("pdf", "claude-code", Scope::Project));

        let report = installer.uninstall_from_agents("pdf", &agents, Scope::Project);
        assert!(report.is_success(), "{report:?}");
        assert_eq!(report.agents.len(), 3);
        assert_eq!(report.canonical.path, fx.project.join(".agents/skills/pdf"));
        assert!(!installer.is_installed_in_canonical("pdf", Scope::Project));
        for agent in agents {
            assert!(!installer.is_installed("pdf", agent, Scope::Project));
            assert!(!occupied(&installer.agent_skill_path("pdf", agent, Scope::Project).unwrap()));
        }
    }

    #[test]
    fn cursor_install_writes_and_removes_bridge() {
        let fx = Fixture::new();
        let installer = fx.installer();
        let bridge_file = fx.project.join(".cursor/rules/pdf.mdc");

        let result = installer.install_for_agent(&fx.source, "pdf", "cursor", copy());
        assert!(result.success);
        let content = fs::read_to_string(&bridge_file).unwrap();
        assert!(content.contains(bridge::BRIDGE_MARKER));
        assert!(content.contains("Work with PDF files"));
        assert!(content.contains(".cursor/skills/pdf/SKILL.md"));

        installer.uninstall_from_agent("pdf", "cursor", Scope::Project);
        assert!(!bridge_file.exists());
    }

    #[test]
    fn cursor_bridge_never_overwrites_user_rules() {
        let fx = Fixture::new();
        let bridge_file = fx.project.join(".cursor/rules/pdf.mdc");
        fs::create_dir_all(bridge_file.parent().unwrap()).unwrap();
        fs::write(&bridge_file, "hand written").unwrap();

        let installer = fx.installer();
        assert!(installer.install_for_agent(&fx.source, "pdf", "cursor", copy()).success);
        installer.uninstall_from_agent("pdf", "cursor", Scope::Project);
        assert_eq!(fs::read_to_string(&bridge_file).unwrap(), "hand written");
    }

    #[test]
    fn global_scope_uses_home_directories() {
        let fx = Fixture::new();
        let installer = fx.installer().with_linker(FailingLinker);
        let options = InstallOptions::new(Scope::Global, InstallMode::Symlink);

        let result = installer.install_for_agent(&fx.source, "pdf", "claude-code", options);
        assert!(result.success);
        assert_eq!(result.path, fx.home.join(".claude/skills/pdf"));
        assert_eq!(
            installer.canonical_path("pdf", Scope::Global),
            fx.home.join(".agents/skills/pdf")
        );
        assert!(installer.is_installed_in_canonical("pdf", Scope::Global));
        assert!(!fx.project.join(".cursor/rules").exists());
    }

    #[test]
    fn list_merges_canonical_and_agent_dirs() {
        let fx = Fixture::new();
        let installer = fx.installer().with_linker(FailingLinker);
        installer.install_to_agents(&fx.source, "pdf", &["claude-code", "cursor"], symlink());
        installer.install_for_agent(&fx.source, "docx", "codex", copy());

        let skills = installer.list_installed_skills(Scope::Project);
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["docx", "pdf"]);

        let pdf = &skills[1];
        assert_eq!(pdf.description.as_deref(), Some("Work with PDF files"));
        assert!(pdf.canonical_path.is_some());
        assert_eq!(pdf.agents, vec!["amp", "claude-code", "cursor"]);

        let docx = &skills[0];
        assert!(docx.canonical_path.is_none());
        assert_eq!(docx.agents, vec!["codex"]);
    }

    #[test]
    fn agent_skill_path_rejects_unknown_agent() {
        let fx = Fixture::new();
        let installer = fx.installer();
        assert!(matches!(
            installer.agent_skill_path("pdf", "nope", Scope::Project),
            Err(Error::UnknownAgent { .. })
        ));
        assert_eq!(
            installer
                .agent_skill_path("pdf", "cursor", Scope::Project)
                .unwrap(),
            fx.project.join(".cursor/skills/pdf")
        );
    }
}
