//! Skill reference grammar.
//!
//! Accepted forms, matched in this order after the `#skill` fragment is cut:
//!
//! - direct git URLs: `git@host:owner[/group...]/repo[.git][/sub][@ver]`,
//!   `https://`, `http://`, `git://` and `ssh://` URLs
//! - shorthand: `[registry:]owner/repo[/sub...][@ver]`
//!
//! In both forms a `tree|blob|raw/<branch>/...` tail copied from a web
//! browser becomes `branch:<branch>` plus a subpath, unless an explicit
//! `@version` is present, in which case those segments stay literal.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use skillpm_config::DEFAULT_REGISTRY;

use crate::{
    error::{Error, Result},
    version::{ParsedVersion, parse_version},
};

const WEB_MARKERS: &[&str] = &["tree", "blob", "raw"];

const SCHEMES: &[&str] = &["https", "http", "git", "ssh"];

/// A parsed skill reference. Produced fresh per operation, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReference {
    /// Registry name, or the URL host when `git_url` is set.
    pub registry: String,
    /// Owner; may contain `/` for nested groups in direct git URLs.
    pub owner: String,
    pub repo: String,
    /// Path inside the repo, without leading or trailing `/`.
    pub sub_path: Option<String>,
    /// Raw version spec, see [`parse_version`].
    pub version: Option<String>,
    /// Skill selected with `#name`.
    pub skill_name: Option<String>,
    /// Canonical clone URL, set iff the input was a direct git URL.
    pub git_url: Option<String>,
    /// The input, verbatim.
    pub raw: String,
}

impl ParsedReference {
    pub fn parsed_version(&self) -> ParsedVersion {
        parse_version(self.version.as_deref())
    }

    pub fn is_git_url(&self) -> bool {
        self.git_url.is_some()
    }

    /// Render the reference in a form that parses back to the same record
    /// (modulo `raw`). This is what lock and config files store.
    pub fn to_reference_string(&self) -> String {
        let mut out = match &self.git_url {
            Some(url) => url.clone(),
            None => format!("{}:{}/{}", self.registry, self.owner, self.repo),
        };
        if let Some(sub_path) = &self.sub_path {
            out.push('/');
            out.push_str(&sub_path.replace('@', "\\@"));
        }
        if let Some(version) = &self.version {
            out.push('@');
            out.push_str(version);
        }
        if let Some(skill_name) = &self.skill_name {
            out.push('#');
            out.push_str(skill_name);
        }
        out
    }
}

impl fmt::Display for ParsedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_reference_string())
    }
}

impl FromStr for ParsedReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_ref(s)
    }
}

/// Parse a reference, using [`DEFAULT_REGISTRY`] for bare shorthand.
pub fn parse_ref(raw: &str) -> Result<ParsedReference> {
    parse_ref_with_registry(raw, DEFAULT_REGISTRY)
}

/// Parse a reference, using `default_registry` for bare shorthand.
pub fn parse_ref_with_registry(raw: &str, default_registry: &str) -> Result<ParsedReference> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(Error::invalid_reference(raw, "reference is empty"));
    }

    let (body, skill_name) = split_fragment(input);
    if body.is_empty() {
        return Err(Error::invalid_reference(raw, "nothing before '#'"));
    }

    match split_git_url(body, raw)? {
        Some(url) => parse_git_url(url, skill_name, raw),
        None => parse_shorthand(body, skill_name, raw, default_registry),
    }
}

fn split_fragment(input: &str) -> (&str, Option<String>) {
    match input.split_once('#') {
        Some((body, fragment)) => {
            let fragment = fragment.trim();
            (
                body.trim_end(),
                (!fragment.is_empty()).then(|| fragment.to_string()),
            )
        },
        None => (input, None),
    }
}

// ── Direct git URLs ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Transport<'a> {
    /// scp-like `user@host:path`.
    Scp,
    Url { scheme: &'a str },
}

#[derive(Debug)]
struct UrlParts<'a> {
    transport: Transport<'a>,
    /// `user@host` for scp, `[userinfo@]host[:port]` for URLs.
    authority: &'a str,
    host: &'a str,
    path: &'a str,
}

fn split_git_url<'a>(body: &'a str, raw: &str) -> Result<Option<UrlParts<'a>>> {
    for &scheme in SCHEMES {
        let Some(rest) = body
            .strip_prefix(scheme)
            .and_then(|r| r.strip_prefix("://"))
        else {
            continue;
        };
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        if host.is_empty() {
            return Err(Error::invalid_git_url(raw, "missing host"));
        }
        return Ok(Some(UrlParts {
            transport: Transport::Url { scheme },
            authority,
            host,
            path,
        }));
    }

    if let Some((prefix, path)) = body.split_once(':')
        && !prefix.contains('/')
        && let Some((user, host)) = prefix.split_once('@')
    {
        if user.is_empty() || host.is_empty() {
            return Err(Error::invalid_git_url(raw, "expected user@host:owner/repo"));
        }
        return Ok(Some(UrlParts {
            transport: Transport::Scp,
            authority: prefix,
            host,
            path,
        }));
    }

    Ok(None)
}

fn parse_git_url(
    url: UrlParts<'_>,
    skill_name: Option<String>,
    raw: &str,
) -> Result<ParsedReference> {
    let (path, version) = split_version(url.path).map_err(|r| Error::invalid_git_url(raw, r))?;
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let repo_idx = repo_boundary(&segments);
    if segments.len() <= repo_idx {
        return Err(Error::invalid_git_url(raw, "expected owner/repo"));
    }

    let owner_segments = &segments[..repo_idx];
    let repo_segment = segments[repo_idx];
    let repo = repo_segment.strip_suffix(".git").unwrap_or(repo_segment);
    if !owner_segments.iter().all(|s| is_valid_name(s)) || !is_valid_name(repo) {
        return Err(Error::invalid_git_url(
            raw,
            "owner and repo may only contain letters, digits, '.', '-' and '_'",
        ));
    }

    let rest = &segments[repo_idx + 1..];
    check_sub_path(rest).map_err(|r| Error::invalid_git_url(raw, r))?;

    let owner = owner_segments.join("/");
    let git_url = match url.transport {
        Transport::Scp => format!("{}:{owner}/{repo}.git", url.authority),
        Transport::Url { scheme } => format!("{scheme}://{}/{owner}/{repo}.git", url.authority),
    };
    let (sub_path, version) = apply_web_heuristic(rest, version);

    Ok(ParsedReference {
        registry: url.host.to_string(),
        owner,
        repo: repo.to_string(),
        sub_path,
        version,
        skill_name,
        git_url: Some(git_url),
        raw: raw.to_string(),
    })
}

/// Index of the repo segment: the first `*.git` segment after the owner,
/// else the segment before a GitLab-style `/-/` separator, else the second.
/// A `*.git` segment only counts before any `-` or `tree|blob|raw` marker,
/// so one inside a web subpath never becomes the repo.
fn repo_boundary(segments: &[&str]) -> usize {
    let limit = segments
        .iter()
        .skip(2)
        .position(|s| *s == "-" || WEB_MARKERS.contains(s))
        .map_or(segments.len(), |i| i + 2);
    let dot_git = segments[..limit]
        .iter()
        .skip(1)
        .position(|s| s.len() > ".git".len() && s.ends_with(".git"))
        .map(|i| i + 1);
    let gitlab_dash = || {
        segments
            .iter()
            .skip(2)
            .position(|s| *s == "-")
            .map(|i| i + 1)
    };
    dot_git.or_else(gitlab_dash).unwrap_or(1)
}

// ── Shorthand ───────────────────────────────────────────────────────────────

fn parse_shorthand(
    body: &str,
    skill_name: Option<String>,
    raw: &str,
    default_registry: &str,
) -> Result<ParsedReference> {
    let (registry, rest) = split_registry_prefix(body).unwrap_or((default_registry, body));
    let (path, version) = split_version(rest).map_err(|r| Error::invalid_reference(raw, r))?;

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return Err(Error::invalid_reference(raw, "expected owner/repo[/path]"));
    }

    let owner = segments[0];
    let repo = segments[1].strip_suffix(".git").unwrap_or(segments[1]);
    if !is_valid_name(owner) || !is_valid_name(repo) {
        return Err(Error::invalid_reference(
            raw,
            "owner and repo may only contain letters, digits, '.', '-' and '_'",
        ));
    }

    let rest = &segments[2..];
    check_sub_path(rest).map_err(|r| Error::invalid_reference(raw, r))?;
    let (sub_path, version) = apply_web_heuristic(rest, version);

    Ok(ParsedReference {
        registry: registry.to_string(),
        owner: owner.to_string(),
        repo: repo.to_string(),
        sub_path,
        version,
        skill_name,
        git_url: None,
        raw: raw.to_string(),
    })
}

fn split_registry_prefix(body: &str) -> Option<(&str, &str)> {
    let (prefix, rest) = body.split_once(':')?;
    let valid = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    valid.then_some((prefix, rest))
}

// ── Shared pieces ───────────────────────────────────────────────────────────

/// Split at the last unescaped `@` that follows the owner segment. `\@`
/// elsewhere is unescaped to a literal `@`.
fn split_version(s: &str) -> std::result::Result<(String, Option<String>), &'static str> {
    let Some(first_slash) = s.find('/') else {
        return Ok((s.replace("\\@", "@"), None));
    };
    let at = s
        .char_indices()
        .filter(|&(i, c)| c == '@' && i > first_slash && !s[..i].ends_with('\\'))
        .map(|(i, _)| i)
        .last();

    match at {
        Some(i) => {
            let version = s[i + 1..].trim();
            if version.is_empty() {
                return Err("empty version after '@'");
            }
            Ok((s[..i].replace("\\@", "@"), Some(version.to_string())))
        },
        None => Ok((s.replace("\\@", "@"), None)),
    }
}

/// Rewrite a `tree|blob|raw/<branch>/<path...>` tail into `branch:<branch>`
/// plus subpath. Suppressed when an explicit version was given. A leading
/// GitLab `-` segment is a separator, never part of the subpath.
fn apply_web_heuristic(rest: &[&str], version: Option<String>) -> (Option<String>, Option<String>) {
    let tail = rest.strip_prefix(&["-"]).unwrap_or(rest);
    if version.is_none()
        && let [marker, branch, path @ ..] = tail
        && WEB_MARKERS.contains(marker)
    {
        return (join_sub_path(path), Some(format!("branch:{branch}")));
    }
    (join_sub_path(tail), version)
}

fn join_sub_path(segments: &[&str]) -> Option<String> {
    (!segments.is_empty()).then(|| segments.join("/"))
}

fn check_sub_path(segments: &[&str]) -> std::result::Result<(), &'static str> {
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err("subpath must not contain '.' or '..' segments");
    }
    Ok(())
}

fn is_valid_name(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}
