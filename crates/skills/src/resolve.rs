//! Locate the skill directory inside a fetched repository tree.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::{Error, Result},
    manifest::read_manifest,
    path_safety::ensure_path_safe,
    reference::ParsedReference,
};

/// Resolve the directory to install for `parsed` below `root`.
///
/// An explicit subpath wins, then a `#fragment` matched against the
/// immediate subdirectories (directory name or manifest `name`), and
/// otherwise the whole repository is the skill.
pub fn resolve_skill_dir(root: &Path, parsed: &ParsedReference) -> Result<PathBuf> {
    if let Some(sub_path) = parsed.sub_path.as_deref() {
        let dir = root.join(sub_path);
        ensure_contained(root, &dir)?;
        if !dir.is_dir() {
            return Err(Error::SubPathNotFound {
                sub_path: sub_path.to_string(),
                root: root.to_path_buf(),
            });
        }
        return Ok(dir);
    }

    if let Some(name) = parsed.skill_name.as_deref() {
        let dir = find_named_skill(root, name)?;
        ensure_contained(root, &dir)?;
        return Ok(dir);
    }

    Ok(root.to_path_buf())
}

fn find_named_skill(root: &Path, name: &str) -> Result<PathBuf> {
    let mut exact = Vec::new();
    let mut folded = Vec::new();

    for entry in fs::read_dir(root)?.flatten() {
        let path = entry.path();
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        if dir_name.starts_with('.') || !path.is_dir() {
            continue;
        }

        let declared = read_manifest(&path).and_then(|m| m.name);
        let names = std::iter::once(dir_name.as_str()).chain(declared.as_deref());
        let (mut is_exact, mut is_folded) = (false, false);
        for candidate in names {
            is_exact |= candidate == name;
            is_folded |= candidate.to_lowercase() == name.to_lowercase();
        }

        if is_exact {
            exact.push((dir_name, path));
        } else if is_folded {
            folded.push((dir_name, path));
        }
    }

    exact.sort();
    folded.sort();

    let mut matches = if exact.is_empty() { folded } else { exact };
    if matches.len() > 1 {
        return Err(Error::AmbiguousSkill {
            name: name.to_string(),
            candidates: matches.into_iter().map(|(dir_name, _)| dir_name).collect(),
        });
    }
    match matches.pop() {
        Some((dir_name, path)) => {
            debug!(skill = %name, dir = %dir_name, "resolved skill by name");
            Ok(path)
        },
        None => Err(Error::SkillNotFound {
            name: name.to_string(),
            root: root.to_path_buf(),
        }),
    }
}

/// Lexical check first, then the real paths so a symlinked subdirectory
/// can't point outside the checkout.
fn ensure_contained(root: &Path, dir: &Path) -> Result<()> {
    ensure_path_safe(root, dir)?;
    if let (Ok(real_root), Ok(real_dir)) = (fs::canonicalize(root), fs::canonicalize(dir)) {
        ensure_path_safe(&real_root, &real_dir)?;
    }
    Ok(())
}
