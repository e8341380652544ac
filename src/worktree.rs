use std::fs;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::object::ObjectKind;
use crate::repo::Repo;

/// entries never scanned, committed, or erased. not configurable.
pub const IGNORE_ENTRIES: [&str; 5] = [".gitignore", ".gitkeep", ".git", ".got", ".DS_Store"];

/// check a basename against the ignore set
pub fn is_ignored(name: &str) -> bool {
    IGNORE_ENTRIES.contains(&name)
}

/// one scanned worktree entry, not yet linked into a graph
///
/// paths are worktree-relative; `parent_path` is `"."` for entries directly
/// below the worktree root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub kind: ObjectKind,
    pub name: String,
    pub path: String,
    pub parent_path: String,
}

/// pre-order walk of the worktree into a flat index
///
/// ignored entries prune their whole subtree; directories with no raw
/// entries produce nothing (emptiness is not re-evaluated after ignoring)
pub fn build_index(repo: &Repo) -> Result<Vec<IndexEntry>> {
    let root = repo.root();
    let mut index = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(keep_entry);

    for entry in walker {
        let entry = entry.map_err(walk_error(root))?;
        let path = entry.path();

        let kind = if entry.file_type().is_dir() {
            ObjectKind::Tree
        } else {
            ObjectKind::Blob
        };

        index.push(IndexEntry {
            kind,
            name: entry.file_name().to_string_lossy().into_owned(),
            path: rel_string(root, path),
            parent_path: parent_rel_string(root, path),
        });
    }

    Ok(index)
}

/// remove every worktree entry except the ignore set (so `.got` survives)
///
/// pre-order removal: a directory goes down with its contents, so children
/// visited later may already be gone. missing entries are benign.
pub fn erase(repo: &Repo) -> Result<()> {
    let root = repo.root();
    let mut doomed = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_ignored(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = entry.map_err(walk_error(root))?;
        doomed.push((entry.path().to_path_buf(), entry.file_type().is_dir()));
    }

    for (path, is_dir) in doomed {
        let removed = if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match removed {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::Io { path, source: e }),
        }
    }

    Ok(())
}

fn keep_entry(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if is_ignored(&name) {
        return false;
    }
    if entry.file_type().is_dir() && dir_is_empty(entry.path()) {
        return false;
    }
    true
}

fn dir_is_empty(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

fn walk_error(root: &Path) -> impl Fn(walkdir::Error) -> Error + '_ {
    move |e| {
        let path = e
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        Error::Io {
            path,
            source: e.into(),
        }
    }
}

fn rel_string(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn parent_rel_string(root: &Path, path: &Path) -> String {
    match path.parent() {
        Some(parent) if parent != root => rel_string(root, parent),
        _ => ".".to_string(),
    }
}
