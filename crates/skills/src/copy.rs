//! Filtered recursive copy and best-effort removal.

use std::{ffi::OsStr, fs, io, path::Path};

use tracing::{debug, warn};

use crate::error::Result;

/// Entry names never copied into an install, at any depth.
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", ".DS_Store", "metadata.json"];

/// Entries whose name starts with this are private to the source repo.
pub const PRIVATE_PREFIX: &str = "_";

pub fn is_excluded(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    DEFAULT_EXCLUDES.contains(&&*name) || name.starts_with(PRIVATE_PREFIX)
}

/// Copy `src` into `dest` (created if missing), skipping excluded entries and
/// symlinks. Returns the number of files written.
pub fn copy_skill_dir(src: &Path, dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest)?;

    let walker = walkdir::WalkDir::new(src)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        // min_depth still feeds the root to the filter.
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.file_name()));

    let mut copied = 0;
    for entry in walker {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            debug!(path = %entry.path().display(), "skipping symlink in skill source");
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Prefix of staging directories next to an install. Dot-prefixed, so
/// listings never report them.
const STAGING_PREFIX: &str = ".skillpm-staging-";

/// Replace `dest` with a filtered copy of `src`.
///
/// The copy is built in a sibling staging directory. Only once it is complete
/// is the old `dest` moved aside and the new tree renamed into place; if that
/// rename fails the old tree is moved back. Any failure leaves `dest` as it
/// was, and the staging directory is removed on return.
pub fn replace_with_copy(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("skill source {} is not a directory", src.display()),
        )
        .into());
    }
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)?;
    let fresh = staging.path().join("new");
    let copied = copy_skill_dir(src, &fresh)?;

    let backup = staging.path().join("old");
    if occupied(dest) {
        fs::rename(dest, &backup)?;
    }
    if let Err(e) = fs::rename(&fresh, dest) {
        if occupied(&backup)
            && let Err(restore) = fs::rename(&backup, dest)
        {
            warn!(path = %dest.display(), error = %restore, "could not restore previous install");
        }
        return Err(e.into());
    }
    debug!(path = %dest.display(), files = copied, "swapped in staged copy");
    Ok(copied)
}

/// Remove whatever occupies `path`: file, directory tree, or symlink (which
/// is unlinked, never followed). A missing path is not an error.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        // Loops and other oddities: try to unlink anyway.
        Err(e) => return remove_link(path).map_err(|_| e),
    };

    if meta.file_type().is_symlink() {
        remove_link(path)
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Windows directory links need `remove_dir`, everything else `remove_file`.
fn remove_link(path: &Path) -> io::Result<()> {
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

/// True when something (even a dangling link) occupies `path`.
pub fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
