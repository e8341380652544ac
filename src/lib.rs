//! got - minimal content-addressed version control
//!
//! tracks snapshots of a worktree as an immutable graph of three object
//! kinds - commit, tree, blob - each stored as one gzip archive named by
//! the SHA-1 of its content. two intents dominate: snapshot the worktree
//! into a commit, and restore the worktree to any prior commit.
//!
//! # Core concepts
//!
//! - **Blob**: one file; archive payload is the raw bytes
//! - **Tree**: one directory; payload is sorted `kind\thash\tname` lines
//! - **Commit**: a whole-worktree snapshot plus parent link and message
//! - **HEAD**: hex hash of the latest commit; 40 zeros before any commit
//!
//! # Hash format
//!
//! blob hash = SHA1(worktree-relative path | file bytes)
//! tree hash = SHA1(worktree-relative path | canonical content)
//! commit hash = SHA1(canonical content)
//!
//! mixing the path in is deliberate: the same bytes at two paths are two
//! objects, so a rename produces a new blob.
//!
//! # Example usage
//!
//! ```no_run
//! use got::{ops, Repo};
//! use std::path::Path;
//!
//! // initialize a repository in a worktree
//! let repo = Repo::init(Path::new("/path/to/worktree")).unwrap();
//!
//! // snapshot the worktree
//! let hash = ops::commit(&repo, "initial commit", chrono::Utc::now()).unwrap();
//!
//! // restore it later
//! ops::restore(&repo, &hash).unwrap();
//! ```

mod archive;
mod error;
mod graph;
mod hash;
mod object;
mod repo;
mod worktree;

pub mod ops;

pub use error::{Error, Result};
pub use hash::Hash;
pub use object::{show, ObjectKind};
pub use repo::Repo;
