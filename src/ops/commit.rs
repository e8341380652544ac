use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Graph, Node, NodeKind};
use crate::hash::Hash;
use crate::object;
use crate::repo::Repo;
use crate::worktree;

/// snapshot the whole worktree into a new commit
///
/// pipeline: scan, link, hash bottom-up, persist bottom-up, advance HEAD,
/// append a LOG line. there is no staging step.
pub fn commit(repo: &Repo, message: &str, timestamp: DateTime<Utc>) -> Result<Hash> {
    let parent = repo.read_head()?;

    let index = worktree::build_index(repo)?;
    debug!(entries = index.len(), "scanned worktree");

    let root = Node::commit(message, parent, timestamp);
    let mut graph = Graph::build(root, index)?;
    let commit_hash = graph.compute_hashes(repo)?;

    persist(repo, &graph)?;

    // objects are all on disk before HEAD moves; a crash in between leaves
    // only unreferenced archives behind
    repo.write_head(&commit_hash)?;
    repo.append_log(&log_line(&commit_hash, &parent, message, timestamp))?;

    Ok(commit_hash)
}

/// write every object archive, children before parents
fn persist(repo: &Repo, graph: &Graph) -> Result<()> {
    let now = Utc::now().timestamp() as u32;
    let mut written = 0usize;
    let mut skipped = 0usize;

    for id in graph.post_order() {
        let node = graph.node(id);
        let hash = match node.hash {
            Some(hash) => hash,
            None => return Err(Error::CorruptObject(format!("unhashed node {}", node.path))),
        };

        let (mtime, comment) = match &node.kind {
            NodeKind::Commit {
                message, timestamp, ..
            } => (timestamp.timestamp() as u32, Some(message.as_str())),
            _ => (now, None),
        };

        let wrote = object::write_object(
            repo,
            node.object_kind(),
            &hash,
            &node.name,
            mtime,
            comment,
            &node.content,
        )?;
        if wrote {
            written += 1;
        } else {
            skipped += 1;
        }
    }

    debug!(written, skipped, "persisted objects");
    Ok(())
}

fn log_line(hash: &Hash, parent: &Hash, message: &str, timestamp: DateTime<Utc>) -> String {
    [
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        hash.to_hex(),
        parent.to_hex(),
        message.to_string(),
    ]
    .join("\t")
}
