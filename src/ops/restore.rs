use tracing::debug;

use crate::error::Result;
use crate::graph::Graph;
use crate::hash::Hash;
use crate::repo::Repo;
use crate::worktree;

/// restore the worktree to the state of a stored commit
///
/// the whole graph is inflated into memory before anything is erased, so a
/// missing or corrupt object aborts the restore with the worktree intact.
/// the LOG is not modified; only HEAD moves.
pub fn restore(repo: &Repo, hash: &Hash) -> Result<()> {
    let graph = Graph::read(repo, hash)?;
    debug!(commit = %hash, "inflated object graph");

    worktree::erase(repo)?;
    graph.materialize(repo.root())?;

    repo.write_head(hash)?;
    Ok(())
}
