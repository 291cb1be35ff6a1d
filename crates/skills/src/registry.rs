//! Registry-name → base-URL resolution and clone URL construction.

use std::collections::HashMap;

use skillpm_config::RegistryConfig;

use crate::reference::ParsedReference;

/// One link in the registry lookup chain.
pub trait RegistryLookup: Send + Sync {
    /// Base URL for `name`, or `None` to defer to the next provider.
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<F> RegistryLookup for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Hosts every install knows about.
pub struct WellKnownRegistries;

impl RegistryLookup for WellKnownRegistries {
    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "github" => Some("https://github.com".into()),
            "gitlab" => Some("https://gitlab.com".into()),
            _ => None,
        }
    }
}

/// Resolves registry names through, in order: an optional override
/// function, the explicit registries map, the well-known hosts, and finally
/// `https://<name>`.
#[derive(Default)]
pub struct RegistryResolver {
    override_lookup: Option<Box<dyn RegistryLookup>>,
    registries: HashMap<String, String>,
}

impl RegistryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new().with_registries(config.urls.clone())
    }

    /// Install a lookup consulted before everything else.
    pub fn with_override(mut self, lookup: impl RegistryLookup + 'static) -> Self {
        self.override_lookup = Some(Box::new(lookup));
        self
    }

    pub fn with_registries(mut self, registries: HashMap<String, String>) -> Self {
        self.registries.extend(registries);
        self
    }

    /// Base URL for a registry name, without a trailing slash.
    pub fn registry_url(&self, name: &str) -> String {
        self.override_lookup
            .as_ref()
            .and_then(|lookup| lookup.lookup(name))
            .or_else(|| self.registries.get(name).cloned())
            .or_else(|| WellKnownRegistries.lookup(name))
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{name}"))
    }

    /// Clone URL for a parsed reference. Subpath and version are applied
    /// after fetching, so neither appears here.
    pub fn build_repo_url(&self, parsed: &ParsedReference) -> String {
        if let Some(git_url) = &parsed.git_url {
            return git_url.clone();
        }
        format!(
            "{}/{}/{}",
            self.registry_url(&parsed.registry),
            parsed.owner,
            parsed.repo
        )
    }
}
