use std::path::PathBuf;

use crate::archive::{self, ArchiveHeader};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::repo::Repo;

/// the three object kinds of the store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
}

impl ObjectKind {
    /// wire name used in content lines and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Commit => "commit",
            ObjectKind::Tree => "tree",
            ObjectKind::Blob => "blob",
        }
    }

    /// parse a wire name back into a kind
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "commit" => Ok(ObjectKind::Commit),
            "tree" => Ok(ObjectKind::Tree),
            "blob" => Ok(ObjectKind::Blob),
            other => Err(Error::InvalidObjType(other.to_string())),
        }
    }

    /// store directory holding archives of this kind
    pub fn store_dir(&self, repo: &Repo) -> PathBuf {
        match self {
            ObjectKind::Commit => repo.commit_dir(),
            ObjectKind::Tree => repo.tree_dir(),
            ObjectKind::Blob => repo.blob_dir(),
        }
    }
}

/// one parsed line of a commit or tree payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentLine {
    pub kind: ObjectKind,
    pub hash: Hash,
    pub name: String,
}

/// build the canonical `<kind>\t<hex>\t<name>` line for a child object
pub fn content_line(kind: ObjectKind, hash: &Hash, name: &str) -> String {
    format!("{}\t{}\t{}", kind.as_str(), hash.to_hex(), name)
}

/// parse a commit or tree payload into its content lines
///
/// blank lines are skipped: a tree whose directory held only ignored
/// entries serialises to an empty payload
pub fn parse_content(payload: &str) -> Result<Vec<ContentLine>> {
    let mut lines = Vec::new();
    for line in payload.split('\n') {
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let kind = match fields.next() {
            Some(kind) => ObjectKind::parse(kind)?,
            None => return Err(Error::CorruptObject(format!("malformed line: {line:?}"))),
        };
        let hash = match fields.next() {
            Some(hex) => Hash::from_hex(hex)?,
            None => return Err(Error::CorruptObject(format!("malformed line: {line:?}"))),
        };
        let name = fields.next().unwrap_or_default().to_string();
        lines.push(ContentLine { kind, hash, name });
    }
    Ok(lines)
}

/// filesystem path of an object archive
pub fn object_path(repo: &Repo, kind: ObjectKind, hash: &Hash) -> PathBuf {
    kind.store_dir(repo).join(hash.to_hex())
}

/// check for an object archive in the store
pub fn object_exists(repo: &Repo, kind: ObjectKind, hash: &Hash) -> bool {
    object_path(repo, kind, hash).exists()
}

/// write an object archive under its kind directory
///
/// tree and blob writes are content-addressed and idempotent: an existing
/// file with the same hash is left untouched. commit archives are always
/// rewritten (their mtime differs even for identical trees).
pub fn write_object(
    repo: &Repo,
    kind: ObjectKind,
    hash: &Hash,
    name: &str,
    mtime: u32,
    comment: Option<&str>,
    payload: &[u8],
) -> Result<bool> {
    let path = object_path(repo, kind, hash);
    if kind != ObjectKind::Commit && path.exists() {
        return Ok(false);
    }
    archive::write_archive(&path, name, mtime, comment, payload)?;
    Ok(true)
}

/// read an object archive back into (header, payload)
pub fn read_object(repo: &Repo, kind: ObjectKind, hash: &Hash) -> Result<(ArchiveHeader, Vec<u8>)> {
    let path = object_path(repo, kind, hash);
    if !path.exists() {
        return Err(Error::ObjDoesNotExist(hash.to_hex()));
    }
    archive::read_archive(&path)
}

/// content line a commit stores for its parent commit
///
/// the third field is the parent's commit message, read back from the
/// parent archive's gzip comment
pub fn parent_commit_line(repo: &Repo, parent: &Hash) -> Result<String> {
    let (header, _) = read_object(repo, ObjectKind::Commit, parent)?;
    Ok(content_line(ObjectKind::Commit, parent, &header.comment))
}

/// inflated content of any object, searched across all three kinds
pub fn show(repo: &Repo, hex: &str) -> Result<String> {
    let hash = Hash::from_hex(hex)?;
    for kind in [ObjectKind::Commit, ObjectKind::Tree, ObjectKind::Blob] {
        if object_exists(repo, kind, &hash) {
            let (_, payload) = read_object(repo, kind, &hash)?;
            return Ok(String::from_utf8_lossy(&payload).into_owned());
        }
    }
    Err(Error::ObjDoesNotExist(hex.to_string()))
}
