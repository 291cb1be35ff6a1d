//! Traversal checks and directory-name sanitizing for everything that
//! writes below an install base.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Substituted when sanitizing leaves nothing usable.
pub const PLACEHOLDER_NAME: &str = "unnamed-skill";

/// Longest directory name we emit, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Turn an arbitrary skill name into a single safe path component.
///
/// Strips `/`, `\`, NUL and `:`, trims leading/trailing dots and whitespace,
/// and caps the result at [`MAX_NAME_LEN`] bytes. Never returns an empty
/// string, and `sanitize_name(sanitize_name(x)) == sanitize_name(x)`.
pub fn sanitize_name(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0' | ':'))
        .collect();
    let mut name = trim_edges(&stripped).to_string();

    if name.len() > MAX_NAME_LEN {
        let mut end = MAX_NAME_LEN;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
        // Truncation can expose a trailing dot or space.
        name = trim_edges(&name).to_string();
    }

    if name.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        name
    }
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c: char| c == '.' || c.is_whitespace())
}

/// True iff `target` is `base` or lies below it once both are made absolute
/// and lexically normalized. Symlinks are not followed.
pub fn is_path_safe(base: &Path, target: &Path) -> bool {
    match (absolutize(base), absolutize(target)) {
        (Some(base), Some(target)) => target.starts_with(&base),
        _ => false,
    }
}

/// [`is_path_safe`] as a `Result`, for `?` at mutation sites.
pub fn ensure_path_safe(base: &Path, target: &Path) -> Result<()> {
    if is_path_safe(base, target) {
        Ok(())
    } else {
        Err(Error::path_traversal(base, target))
    }
}

/// Resolve `path` against the working directory and normalize it.
pub fn absolutize(path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return Some(normalize(path));
    }
    let cwd = std::env::current_dir().ok()?;
    Some(normalize(&cwd.join(path)))
}

/// Lexically collapse `.` and `..` components. `..` never climbs above the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {},
            Component::ParentDir => {
                out.pop();
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
