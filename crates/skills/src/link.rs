//! Symlink manager: reconciles an agent path with the canonical copy.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{copy::remove_path, error::Result, path_safety::normalize};

/// Creates directory links. Swappable so tests can force failures.
pub trait Linker: Send + Sync {
    /// Create `link` pointing at `target` (which may be relative to the
    /// link's parent directory).
    fn link_dir(&self, target: &Path, link: &Path) -> io::Result<()>;
}

/// Native directory links. On Windows a symlink needs Developer Mode or
/// elevation, so a refused symlink is retried as a junction; only when both
/// fail does the installer fall back to copying.
pub struct SystemLinker;

impl Linker for SystemLinker {
    #[cfg(unix)]
    fn link_dir(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    fn link_dir(&self, target: &Path, link: &Path) -> io::Result<()> {
        match std::os::windows::fs::symlink_dir(target, link) {
            Ok(()) => Ok(()),
            Err(symlink_err) => {
                // Junctions take absolute targets only.
                let absolute = resolve_link_target(link, target);
                junction::create(&absolute, link).map_err(|e| {
                    debug!(link = %link.display(), error = %e, "junction failed");
                    symlink_err
                })?;
                debug!(link = %link.display(), target = %absolute.display(), "created junction");
                Ok(())
            },
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn link_dir(&self, _target: &Path, _link: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symlinks are not supported on this platform",
        ))
    }
}

#[derive(Debug)]
pub enum LinkOutcome {
    /// The link already resolved to the canonical directory; nothing touched.
    AlreadyLinked,
    Linked,
    /// Link creation failed; the caller decides how to recover.
    Failed(io::Error),
}

/// Make `agent_dir` a relative symlink to `canonical_dir`.
///
/// Anything else occupying `agent_dir` is removed first. Errors preparing the
/// parent directory propagate; a failure of the link call itself is returned
/// as [`LinkOutcome::Failed`].
pub fn ensure_link(linker: &dyn Linker, canonical_dir: &Path, agent_dir: &Path) -> Result<LinkOutcome> {
    if points_to(agent_dir, canonical_dir) {
        debug!(path = %agent_dir.display(), "agent link already up to date");
        return Ok(LinkOutcome::AlreadyLinked);
    }

    if let Err(e) = remove_path(agent_dir) {
        warn!(path = %agent_dir.display(), error = %e, "could not clear agent path before linking");
    }
    if let Some(parent) = agent_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let target = relative_target(agent_dir, canonical_dir);
    match linker.link_dir(&target, agent_dir) {
        Ok(()) => {
            debug!(link = %agent_dir.display(), target = %target.display(), "created skill link");
            Ok(LinkOutcome::Linked)
        },
        Err(e) => Ok(LinkOutcome::Failed(e)),
    }
}

/// Whether `link` is a symlink whose resolved target is `target`.
pub fn points_to(link: &Path, target: &Path) -> bool {
    let Ok(dest) = fs::read_link(link) else {
        return false;
    };
    match (fs::canonicalize(resolve_link_target(link, &dest)), fs::canonicalize(target)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Absolute form of a link's `target`, read relative to the link's parent.
pub fn resolve_link_target(link: &Path, target: &Path) -> PathBuf {
    match link.parent() {
        Some(parent) if target.is_relative() => normalize(&parent.join(target)),
        _ => target.to_path_buf(),
    }
}

/// Path to write into the link at `link` so it reaches `target`: relative
/// when both share a root, absolute otherwise. Existing ancestors are
/// resolved first so `/tmp` vs `/private/tmp` style aliases don't leak in.
pub fn relative_target(link: &Path, target: &Path) -> PathBuf {
    let base = link.parent().map(real_or_normal).unwrap_or_default();
    let target = real_or_normal(target);
    diff_paths(&target, &base).unwrap_or(target)
}

fn real_or_normal(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
}

fn diff_paths(path: &Path, base: &Path) -> Option<PathBuf> {
    let path: Vec<Component<'_>> = path.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    let common = path.iter().zip(&base).take_while(|(a, b)| a == b).count();
    // Nothing shared (different drives): only an absolute path works.
    if common == 0 || !matches!(path.first(), Some(Component::RootDir | Component::Prefix(_))) {
        return None;
    }

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &path[common..] {
        out.push(component.as_os_str());
    }
    Some(out)
}
