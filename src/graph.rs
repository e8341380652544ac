use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_blob_hash, compute_commit_hash, compute_tree_hash, Hash};
use crate::object::{self, ObjectKind};
use crate::repo::Repo;
use crate::worktree::IndexEntry;

/// arena index of a graph node
///
/// the parent back-reference is an index, not an owning edge; the arena
/// owns every node exactly once
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(usize);

/// per-kind payload of a graph node
#[derive(Clone, Debug)]
pub enum NodeKind {
    Commit {
        message: String,
        parent_commit: Hash,
        timestamp: DateTime<Utc>,
    },
    Tree,
    Blob,
}

/// one node of the in-memory object graph
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// last path component; empty for the commit root
    pub name: String,
    /// worktree-relative path; only populated for scanned entries
    pub path: String,
    /// worktree-relative path of the containing directory, "." at the root
    #[allow(dead_code)]
    pub parent_path: String,
    /// back-reference to the containing node; an index, never an owning edge
    #[allow(dead_code)]
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub hash: Option<Hash>,
    /// serialised payload written to the store; file bytes for a blob
    pub content: Vec<u8>,
}

impl Node {
    /// fresh commit root for a snapshot
    pub fn commit(message: &str, parent_commit: Hash, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: NodeKind::Commit {
                message: message.to_string(),
                parent_commit,
                timestamp,
            },
            name: String::new(),
            path: String::new(),
            parent_path: String::new(),
            parent: None,
            children: Vec::new(),
            hash: None,
            content: Vec::new(),
        }
    }

    /// store-level kind of this node
    pub fn object_kind(&self) -> ObjectKind {
        match self.kind {
            NodeKind::Commit { .. } => ObjectKind::Commit,
            NodeKind::Tree => ObjectKind::Tree,
            NodeKind::Blob => ObjectKind::Blob,
        }
    }
}

/// object graph rooted at a commit
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// link a flat worktree index into a graph under the given root
    ///
    /// single pass with a path -> node map; the scanner emits parents
    /// before children, so every `parent_path` resolves when reached
    pub fn build(root: Node, index: Vec<IndexEntry>) -> Result<Self> {
        if !matches!(root.kind, NodeKind::Commit { .. }) {
            return Err(Error::WrongRootType);
        }

        let mut graph = Self { nodes: vec![root] };
        let mut by_path: HashMap<String, NodeId> = HashMap::new();

        for entry in index {
            let kind = match entry.kind {
                ObjectKind::Tree => NodeKind::Tree,
                ObjectKind::Blob => NodeKind::Blob,
                ObjectKind::Commit => return Err(Error::InvalidObjType("commit".to_string())),
            };

            let parent = if entry.parent_path == "." {
                graph.root_id()
            } else {
                match by_path.get(&entry.parent_path) {
                    Some(id) => *id,
                    None => return Err(Error::DetachedEntry(entry.path)),
                }
            };

            let id = NodeId(graph.nodes.len());
            graph.nodes.push(Node {
                kind,
                name: entry.name,
                path: entry.path.clone(),
                parent_path: entry.parent_path,
                parent: Some(parent),
                children: Vec::new(),
                hash: None,
                content: Vec::new(),
            });
            graph.nodes[parent.0].children.push(id);
            by_path.insert(entry.path, id);
        }

        Ok(graph)
    }

    /// inflate a stored commit and everything below it into a graph
    pub fn read(repo: &Repo, hash: &Hash) -> Result<Self> {
        let mut graph = Self { nodes: Vec::new() };
        graph.read_node(repo, ObjectKind::Commit, hash, String::new(), None)?;
        Ok(graph)
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// hash of the root commit, available after `compute_hashes`
    pub fn root_hash(&self) -> Option<Hash> {
        self.nodes.first().and_then(|n| n.hash)
    }

    /// node ids in post-order: every child precedes its parent
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.collect_post_order(self.root_id(), &mut order);
        order
    }

    fn collect_post_order(&self, id: NodeId, order: &mut Vec<NodeId>) {
        for child in &self.nodes[id.0].children {
            self.collect_post_order(*child, order);
        }
        order.push(id);
    }

    /// bottom-up hashing: populates `content` and `hash` on every node
    ///
    /// child lines are sorted over the whole line before joining, so the
    /// result is insensitive to directory enumeration order
    pub fn compute_hashes(&mut self, repo: &Repo) -> Result<Hash> {
        self.hash_node(repo, self.root_id())
    }

    fn hash_node(&mut self, repo: &Repo, id: NodeId) -> Result<Hash> {
        let children = self.nodes[id.0].children.clone();
        let mut lines = Vec::with_capacity(children.len() + 1);
        for child in children {
            let child_hash = self.hash_node(repo, child)?;
            let child_node = &self.nodes[child.0];
            lines.push(object::content_line(
                child_node.object_kind(),
                &child_hash,
                &child_node.name,
            ));
        }

        let hash = match &self.nodes[id.0].kind {
            NodeKind::Commit { parent_commit, .. } => {
                if !parent_commit.is_zero() {
                    lines.push(object::parent_commit_line(repo, parent_commit)?);
                }
                lines.sort_unstable();
                let content = lines.join("\n").into_bytes();
                let hash = compute_commit_hash(&content);
                self.nodes[id.0].content = content;
                hash
            }
            NodeKind::Tree => {
                lines.sort_unstable();
                let content = lines.join("\n").into_bytes();
                let hash = compute_tree_hash(&self.nodes[id.0].path, &content);
                self.nodes[id.0].content = content;
                hash
            }
            NodeKind::Blob => {
                let file = repo.root().join(&self.nodes[id.0].path);
                let content = fs::read(&file).with_path(&file)?;
                let hash = compute_blob_hash(&self.nodes[id.0].path, &content);
                self.nodes[id.0].content = content;
                hash
            }
        };

        self.nodes[id.0].hash = Some(hash);
        Ok(hash)
    }

    fn read_node(
        &mut self,
        repo: &Repo,
        kind: ObjectKind,
        hash: &Hash,
        name: String,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let (header, payload) = object::read_object(repo, kind, hash)?;

        let node_kind = match kind {
            ObjectKind::Commit => NodeKind::Commit {
                message: header.comment,
                parent_commit: Hash::ZERO,
                timestamp: timestamp_from_secs(header.mtime),
            },
            ObjectKind::Tree => NodeKind::Tree,
            ObjectKind::Blob => NodeKind::Blob,
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: node_kind,
            name,
            path: String::new(),
            parent_path: String::new(),
            parent,
            children: Vec::new(),
            hash: Some(*hash),
            content: payload.clone(),
        });

        if kind == ObjectKind::Blob {
            return Ok(id);
        }

        let text = String::from_utf8_lossy(&payload).into_owned();
        for line in object::parse_content(&text)? {
            if line.kind == ObjectKind::Commit {
                // the parent pointer of a commit, not a child to inflate
                match (kind, &mut self.nodes[id.0].kind) {
                    (ObjectKind::Commit, NodeKind::Commit { parent_commit, .. }) => {
                        *parent_commit = line.hash;
                        continue;
                    }
                    _ => {
                        return Err(Error::CorruptObject(format!(
                            "commit entry inside a {} object",
                            kind.as_str()
                        )))
                    }
                }
            }
            let child = self.read_node(repo, line.kind, &line.hash, line.name, Some(id))?;
            self.nodes[id.0].children.push(child);
        }

        Ok(id)
    }

    /// write the graph back into the worktree rooted at `dir`
    pub fn materialize(&self, dir: &Path) -> Result<()> {
        self.write_node(self.root_id(), dir)
    }

    fn write_node(&self, id: NodeId, dir: &Path) -> Result<()> {
        let node = &self.nodes[id.0];
        match node.kind {
            NodeKind::Commit { .. } => {
                for child in &node.children {
                    self.write_node(*child, dir)?;
                }
            }
            NodeKind::Tree => {
                let path = dir.join(&node.name);
                fs::create_dir(&path).with_path(&path)?;
                for child in &node.children {
                    self.write_node(*child, &path)?;
                }
            }
            NodeKind::Blob => {
                let path = dir.join(&node.name);
                fs::write(&path, &node.content).with_path(&path)?;
            }
        }
        Ok(())
    }
}

fn timestamp_from_secs(secs: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(i64::from(secs), 0).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::worktree;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn write_file(repo: &Repo, rel: &str, contents: &str) {
        let path = repo.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn scan_graph(repo: &Repo) -> Graph {
        let index = worktree::build_index(repo).unwrap();
        let root = Node::commit("test", Hash::ZERO, Utc::now());
        Graph::build(root, index).unwrap()
    }

    #[test]
    fn test_build_links_parents_and_children() {
        let (_dir, repo) = test_repo();
        write_file(&repo, "a.txt", "hi");
        write_file(&repo, "app/lib/util.rs", "fn x() {}");

        let graph = scan_graph(&repo);
        let root = graph.node(graph.root_id());
        assert_eq!(root.children.len(), 2); // a.txt and app

        for &child in &root.children {
            assert_eq!(graph.node(child).parent, Some(graph.root_id()));
        }

        // walk down to the nested blob
        let app = root
            .children
            .iter()
            .map(|&id| graph.node(id))
            .find(|n| n.name == "app")
            .unwrap();
        assert!(matches!(app.kind, NodeKind::Tree));
        let lib = graph.node(app.children[0]);
        assert_eq!(lib.name, "lib");
        let util = graph.node(lib.children[0]);
        assert_eq!(util.name, "util.rs");
        assert!(matches!(util.kind, NodeKind::Blob));
        assert!(util.children.is_empty());
    }

    #[test]
    fn test_build_rejects_non_commit_root() {
        let mut root = Node::commit("x", Hash::ZERO, Utc::now());
        root.kind = NodeKind::Tree;
        let result = Graph::build(root, Vec::new());
        assert!(matches!(result, Err(Error::WrongRootType)));
    }

    #[test]
    fn test_build_rejects_detached_entry() {
        let root = Node::commit("x", Hash::ZERO, Utc::now());
        let index = vec![IndexEntry {
            kind: ObjectKind::Blob,
            name: "f".to_string(),
            path: "gone/f".to_string(),
            parent_path: "gone".to_string(),
        }];
        let result = Graph::build(root, index);
        assert!(matches!(result, Err(Error::DetachedEntry(_))));
    }

    #[test]
    fn test_hashes_are_deterministic() {
        let (_dir, repo) = test_repo();
        write_file(&repo, "a.txt", "hi");
        write_file(&repo, "app/b.txt", "there");

        let h1 = scan_graph(&repo).compute_hashes(&repo).unwrap();
        let h2 = scan_graph(&repo).compute_hashes(&repo).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_tree_content_lines_sorted() {
        let (_dir, repo) = test_repo();
        write_file(&repo, "app/z.txt", "z");
        write_file(&repo, "app/a.txt", "a");
        write_file(&repo, "app/m.txt", "m");

        let mut graph = scan_graph(&repo);
        graph.compute_hashes(&repo).unwrap();

        let root = graph.node(graph.root_id());
        let app = graph.node(root.children[0]);
        let content = String::from_utf8(app.content.clone()).unwrap();
        let lines: Vec<&str> = content.split('\n').collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_first_commit_has_no_parent_line() {
        let (_dir, repo) = test_repo();
        write_file(&repo, "a.txt", "hi");

        let mut graph = scan_graph(&repo);
        graph.compute_hashes(&repo).unwrap();

        let content = String::from_utf8(graph.node(graph.root_id()).content.clone()).unwrap();
        assert!(!content.contains("commit\t"));
        assert!(content.starts_with("blob\t"));
    }

    #[test]
    fn test_blob_content_is_file_bytes() {
        let (_dir, repo) = test_repo();
        write_file(&repo, "a.txt", "hi");

        let mut graph = scan_graph(&repo);
        graph.compute_hashes(&repo).unwrap();

        let root = graph.node(graph.root_id());
        let blob = graph.node(root.children[0]);
        assert_eq!(blob.content, b"hi");
        assert_eq!(
            blob.hash,
            Some(crate::hash::compute_blob_hash("a.txt", b"hi"))
        );
    }

    #[test]
    fn test_post_order_children_first() {
        let (_dir, repo) = test_repo();
        write_file(&repo, "app/lib/util.rs", "fn x() {}");

        let graph = scan_graph(&repo);
        let order = graph.post_order();
        assert_eq!(order.len(), 4); // commit, app, lib, util.rs
        assert_eq!(order.last(), Some(&graph.root_id()));

        // every child appears before its parent
        for (pos, id) in order.iter().enumerate() {
            if let Some(parent) = graph.node(*id).parent {
                let parent_pos = order.iter().position(|o| *o == parent).unwrap();
                assert!(pos < parent_pos);
            }
        }
    }
}
