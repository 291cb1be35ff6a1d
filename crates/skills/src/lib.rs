//! Skill references and multi-agent installation.
//!
//! A skill is a directory with a `SKILL.md` manifest. References such as
//! `github:anthropics/skills@v1.0.0#pdf` are parsed into [`ParsedReference`],
//! turned into clone URLs by [`RegistryResolver`], and once fetched, the
//! resolved directory is installed into each agent's skills directory by
//! [`Installer`].

pub mod agents;
pub mod bridge;
pub mod copy;
pub mod error;
pub mod install;
pub mod link;
pub mod manifest;
pub mod path_safety;
pub mod pipeline;
pub mod reference;
pub mod registry;
pub mod resolve;
pub mod types;
pub mod version;

pub use {
    agents::{AgentDescriptor, AgentDetector, AgentTable, DirectoryDetector, RulesBridge},
    error::{Error, Result},
    install::Installer,
    path_safety::{is_path_safe, sanitize_name},
    pipeline::{FetchedRepo, Pipeline, SkillFetcher, SkillOutcome},
    reference::{ParsedReference, parse_ref, parse_ref_with_registry},
    registry::{RegistryLookup, RegistryResolver},
    resolve::resolve_skill_dir,
    types::{
        InstallMode, InstallOptions, InstallResult, InstalledSkill, Scope, UninstallReport,
        UninstallResult,
    },
    version::{ParsedVersion, VersionKind, parse_version},
};
