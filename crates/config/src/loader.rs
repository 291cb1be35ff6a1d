use std::{
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::{InstallMode, SkillpmConfig},
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "skillpm.toml",
    "skillpm.yaml",
    "skillpm.yml",
    "skillpm.json",
];

const ENV_DEFAULT_REGISTRY: &str = "SKILLPM_DEFAULT_REGISTRY";
const ENV_INSTALL_MODE: &str = "SKILLPM_INSTALL_MODE";

static HOME_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<SkillpmConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config relative to the process working directory.
pub fn discover_and_load() -> SkillpmConfig {
    discover_and_load_from(Path::new("."))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `<cwd>/skillpm.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/skillpm/skillpm.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `SkillpmConfig::default()`. Env overrides are applied last.
pub fn discover_and_load_from(cwd: &Path) -> SkillpmConfig {
    let config = match find_config_file(cwd) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                SkillpmConfig::default()
            })
        },
        None => {
            debug!("no config file found, using defaults");
            SkillpmConfig::default()
        },
    };
    apply_env_overrides(config)
}

/// Apply `SKILLPM_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: SkillpmConfig) -> SkillpmConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: SkillpmConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SkillpmConfig {
    if let Some(registry) = lookup(ENV_DEFAULT_REGISTRY).filter(|v| !v.trim().is_empty()) {
        config.registry.default = registry.trim().to_string();
    }
    if let Some(mode) = lookup(ENV_INSTALL_MODE) {
        match mode.parse::<InstallMode>() {
            Ok(mode) => config.install.mode = mode,
            Err(e) => warn!(var = ENV_INSTALL_MODE, error = %e, "ignoring invalid override"),
        }
    }
    config
}

fn find_config_file(cwd: &Path) -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(|name| cwd.join(name));
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.is_file())
}

fn parse_config(raw: &str, path: &Path) -> Result<SkillpmConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::unsupported_format(other)),
    }
}

/// Returns the user-global config directory (`~/.config/skillpm/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "skillpm").map(|d| d.config_dir().to_path_buf())
}

/// Home directory used for global installs, honoring [`set_home_dir`].
pub fn home_dir() -> Option<PathBuf> {
    let pinned = HOME_DIR_OVERRIDE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    pinned.or_else(|| directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()))
}

/// Pin the home directory (tests, sandboxed runs).
pub fn set_home_dir(path: PathBuf) {
    *HOME_DIR_OVERRIDE
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(path);
}

pub fn clear_home_dir() {
    *HOME_DIR_OVERRIDE
        .write()
        .unwrap_or_else(PoisonError::into_inner) = None;
}
