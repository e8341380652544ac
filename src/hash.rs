use std::fmt;

use sha1::{Digest, Sha1};

use crate::Error;

/// SHA-1 hash used for content addressing
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 20]);

impl Hash {
    /// zero hash, the "no commit yet" sentinel stored in HEAD
    pub const ZERO: Hash = Hash([0u8; 20]);

    /// create from raw bytes
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// parse from hex string
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidHashHex(s.to_string()))?;
        if bytes.len() != 20 {
            return Err(Error::InvalidHashHex(s.to_string()));
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// get raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// convert to 40-char lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..12])
    }
}

/// compute blob hash over (worktree-relative path, file bytes)
///
/// mixing the path in means identical bytes at two different paths are two
/// different objects. renaming a file therefore produces a new blob instead
/// of deduplicating against the old one.
pub fn compute_blob_hash(rel_path: &str, content: &[u8]) -> Hash {
    let mut hasher = Sha1::new();
    hasher.update(rel_path.as_bytes());
    hasher.update(content);
    Hash(hasher.finalize().into())
}

/// compute tree hash over (worktree-relative path, canonical content)
///
/// content must already be the sorted child-line serialisation, so the
/// digest is stable under directory enumeration order.
pub fn compute_tree_hash(rel_path: &str, content: &[u8]) -> Hash {
    compute_blob_hash(rel_path, content)
}

/// compute commit hash over canonical content alone
///
/// a commit has no worktree path, so nothing is mixed in.
pub fn compute_commit_hash(content: &[u8]) -> Hash {
    let digest = Sha1::digest(content);
    Hash(digest.into())
}
