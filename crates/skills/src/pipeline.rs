//! Batch add/remove: parse, fetch, resolve and install a list of references.
//!
//! References are processed strictly one after another. A failure anywhere
//! in one reference's chain is recorded in its [`SkillOutcome`] and the batch
//! moves on to the next.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::Serialize;
use skillpm_config::{DEFAULT_REGISTRY, SkillpmConfig};
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    install::Installer,
    manifest::read_manifest,
    reference::{ParsedReference, parse_ref_with_registry},
    registry::RegistryResolver,
    resolve::resolve_skill_dir,
    types::{InstallOptions, InstallResult, Scope, UninstallReport},
    version::ParsedVersion,
};

/// A local checkout produced by a [`SkillFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRepo {
    pub root: PathBuf,
    /// Commit the checkout is at, when the fetcher knows it.
    pub commit: Option<String>,
}

/// Clones or fetches a repository at a version. The returned tree must be
/// complete before this resolves.
#[async_trait]
pub trait SkillFetcher: Send + Sync {
    async fn fetch(&self, url: &str, version: &ParsedVersion) -> anyhow::Result<FetchedRepo>;
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillOutcome {
    /// The reference as given.
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    pub results: BTreeMap<String, InstallResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SkillOutcome {
    fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            skill_name: None,
            source_url: None,
            commit: None,
            results: BTreeMap::new(),
            error: None,
        }
    }

    /// True when the reference resolved and every agent install succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.results.values().all(|r| r.success)
    }
}

pub struct Pipeline {
    resolver: RegistryResolver,
    installer: Installer,
    fetcher: Arc<dyn SkillFetcher>,
    default_registry: String,
}

impl Pipeline {
    pub fn new(resolver: RegistryResolver, installer: Installer, fetcher: Arc<dyn SkillFetcher>) -> Self {
        Self {
            resolver,
            installer,
            fetcher,
            default_registry: DEFAULT_REGISTRY.to_string(),
        }
    }

    pub fn from_config(
        config: &SkillpmConfig,
        project_root: impl Into<PathBuf>,
        fetcher: Arc<dyn SkillFetcher>,
    ) -> Result<Self> {
        let installer = Installer::from_config(config, project_root)?;
        Ok(Self::new(RegistryResolver::from_config(&config.registry), installer, fetcher)
            .with_default_registry(config.registry.default.clone()))
    }

    #[must_use]
    pub fn with_default_registry(mut self, registry: impl Into<String>) -> Self {
        self.default_registry = registry.into();
        self
    }

    pub fn installer(&self) -> &Installer {
        &self.installer
    }

    /// Install every reference for every agent in `agents`.
    pub async fn add<R, A>(&self, refs: &[R], agents: &[A], options: InstallOptions) -> Vec<SkillOutcome>
    where
        R: AsRef<str>,
        A: AsRef<str>,
    {
        let mut outcomes = Vec::with_capacity(refs.len());
        for raw in refs {
            let raw = raw.as_ref();
            let mut outcome = SkillOutcome::new(raw);
            if let Err(e) = self.add_one(raw, agents, options, &mut outcome).await {
                warn!(reference = %raw, error = %e, "skipping skill");
                outcome.error = Some(e.to_string());
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn add_one<A: AsRef<str>>(
        &self,
        raw: &str,
        agents: &[A],
        options: InstallOptions,
        outcome: &mut SkillOutcome,
    ) -> Result<()> {
        let parsed = parse_ref_with_registry(raw, &self.default_registry)?;
        let url = self.resolver.build_repo_url(&parsed);
        outcome.source_url = Some(url.clone());

        let fetched = self
            .fetcher
            .fetch(&url, &parsed.parsed_version())
            .await
            .map_err(|e| Error::fetch(&url, format!("{e:#}")))?;
        outcome.commit = fetched.commit.clone();

        let skill_dir = resolve_skill_dir(&fetched.root, &parsed)?;
        let name = skill_name(&parsed, &skill_dir);
        outcome.skill_name = Some(name.clone());

        outcome.results = self
            .installer
            .install_to_agents(&skill_dir, &name, agents, options);
        info!(
            skill = %name,
            url = %url,
            agents = outcome.results.len(),
            "added skill"
        );
        Ok(())
    }

    /// Uninstall each named skill from `agents`, canonical copies included.
    pub fn remove<N, A>(&self, names: &[N], agents: &[A], scope: Scope) -> Vec<UninstallReport>
    where
        N: AsRef<str>,
        A: AsRef<str>,
    {
        names
            .iter()
            .map(|name| self.installer.uninstall_from_agents(name.as_ref(), agents, scope))
            .collect()
    }
}

/// Manifest name, else the `#fragment`, else the last subpath segment, else
/// the repository name.
pub fn skill_name(parsed: &ParsedReference, skill_dir: &Path) -> String {
    read_manifest(skill_dir)
        .and_then(|m| m.name)
        .filter(|n| !n.trim().is_empty())
        .or_else(|| parsed.skill_name.clone())
        .or_else(|| {
            parsed
                .sub_path
                .as_deref()
                .and_then(|p| p.rsplit('/').find(|s| !s.is_empty()))
                .map(str::to_string)
        })
        .unwrap_or_else(|| parsed.repo.clone())
}
