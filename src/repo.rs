use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;

const GOT_DIR: &str = ".got";
const HEAD_FILE: &str = "HEAD";
const LOG_FILE: &str = "LOG";

/// header line mixed into `read_log` output; sorts above RFC-3339
/// timestamps under the reverse lexicographic ordering
const LOG_HEADER: &str =
    "Time\t\t\tCommit hash\t\t\t\t\tParent hash\t\t\t\t\tCommit message\n";

/// a got repository: the worktree root and the `.got` metadata inside it
pub struct Repo {
    root: PathBuf,
}

impl Repo {
    /// initialize a repository in the given worktree directory
    pub fn init(worktree: &Path) -> Result<Self> {
        let got = worktree.join(GOT_DIR);
        if got.exists() {
            return Err(Error::RepoAlreadyInited(worktree.to_path_buf()));
        }

        let repo = Self {
            root: worktree.to_path_buf(),
        };

        fs::create_dir_all(repo.commit_dir()).with_path(repo.commit_dir())?;
        fs::create_dir_all(repo.tree_dir()).with_path(repo.tree_dir())?;
        fs::create_dir_all(repo.blob_dir()).with_path(repo.blob_dir())?;

        repo.write_head(&Hash::ZERO)?;
        fs::write(repo.log_path(), b"").with_path(repo.log_path())?;

        Ok(repo)
    }

    /// open a repository rooted exactly at the given directory
    pub fn open(worktree: &Path) -> Result<Self> {
        if !worktree.join(GOT_DIR).is_dir() {
            return Err(Error::NotGotRepo(worktree.to_path_buf()));
        }
        Ok(Self {
            root: worktree.to_path_buf(),
        })
    }

    /// locate the repository root by searching the start directory and its
    /// ancestors for a `.got` entry
    pub fn discover(start: &Path) -> Result<Self> {
        let mut dir = start;
        loop {
            if dir.join(GOT_DIR).is_dir() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Err(Error::NotGotRepo(start.to_path_buf())),
            }
        }
    }

    /// worktree root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn got_path(&self) -> PathBuf {
        self.root.join(GOT_DIR)
    }

    /// path to the HEAD file
    pub fn head_path(&self) -> PathBuf {
        self.got_path().join(HEAD_FILE)
    }

    /// path to the LOG file
    pub fn log_path(&self) -> PathBuf {
        self.got_path().join(LOG_FILE)
    }

    /// path to the objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.got_path().join("objects")
    }

    /// path to commit archives
    pub fn commit_dir(&self) -> PathBuf {
        self.objects_path().join("commit")
    }

    /// path to tree archives
    pub fn tree_dir(&self) -> PathBuf {
        self.objects_path().join("tree")
    }

    /// path to blob archives
    pub fn blob_dir(&self) -> PathBuf {
        self.objects_path().join("blob")
    }

    /// read the current commit hash from HEAD
    ///
    /// the all-zero hash means no commit has been made yet
    pub fn read_head(&self) -> Result<Hash> {
        let path = self.head_path();
        let contents = fs::read_to_string(&path).with_path(&path)?;
        Hash::from_hex(contents.trim())
    }

    /// replace HEAD with the given commit hash (whole-file write, no
    /// trailing newline)
    pub fn write_head(&self, hash: &Hash) -> Result<()> {
        let path = self.head_path();
        fs::write(&path, hash.to_hex().as_bytes()).with_path(&path)
    }

    /// append one entry line to LOG
    pub fn append_log(&self, line: &str) -> Result<()> {
        let path = self.log_path();
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .with_path(&path)?;
        writeln!(file, "{}", line).with_path(&path)
    }

    /// render LOG for display: newest entries first, header line on top
    ///
    /// the header is appended to the raw contents before the reverse
    /// lexicographic sort; RFC-3339 timestamps order chronologically under
    /// it, so no parsing is needed
    pub fn read_log(&self) -> Result<String> {
        let path = self.log_path();
        let contents = fs::read_to_string(&path).with_path(&path)?;
        let with_header = format!("{}{}", contents, LOG_HEADER);
        let mut entries: Vec<&str> = with_header.split('\n').collect();
        entries.sort_unstable_by(|a, b| b.cmp(a));
        Ok(entries.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_repo_init_layout() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        assert!(repo.commit_dir().is_dir());
        assert!(repo.tree_dir().is_dir());
        assert!(repo.blob_dir().is_dir());

        let head = fs::read_to_string(repo.head_path()).unwrap();
        assert_eq!(head, "0".repeat(40));

        let log = fs::read_to_string(repo.log_path()).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_repo_init_already_exists() {
        let dir = tempdir().unwrap();
        Repo::init(dir.path()).unwrap();
        let result = Repo::init(dir.path());
        assert!(matches!(result, Err(Error::RepoAlreadyInited(_))));
    }

    #[test]
    fn test_repo_open_not_found() {
        let dir = tempdir().unwrap();
        let result = Repo::open(dir.path());
        assert!(matches!(result, Err(Error::NotGotRepo(_))));
    }

    #[test]
    fn test_repo_discover_from_nested_dir() {
        let dir = tempdir().unwrap();
        Repo::init(dir.path()).unwrap();

        let nested = dir.path().join("app/views");
        fs::create_dir_all(&nested).unwrap();

        let repo = Repo::discover(&nested).unwrap();
        assert_eq!(repo.root(), dir.path());
    }

    #[test]
    fn test_repo_discover_not_a_repo() {
        let dir = tempdir().unwrap();
        let result = Repo::discover(dir.path());
        assert!(matches!(result, Err(Error::NotGotRepo(_))));
    }

    #[test]
    fn test_head_roundtrip() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        assert!(repo.read_head().unwrap().is_zero());

        let hash = Hash::from_hex("d143528ac209d5d927e485e0f923758a21d0901e").unwrap();
        repo.write_head(&hash).unwrap();
        assert_eq!(repo.read_head().unwrap(), hash);

        // whole-file replacement, exactly 40 bytes
        let raw = fs::read(repo.head_path()).unwrap();
        assert_eq!(raw.len(), 40);
    }

    #[test]
    fn test_log_append_and_read_order() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        repo.append_log("2024-01-01T00:00:00Z\taaaa\t0000\tfirst").unwrap();
        repo.append_log("2024-01-02T00:00:00Z\tbbbb\taaaa\tsecond").unwrap();

        let log = repo.read_log().unwrap();
        let lines: Vec<&str> = log.split('\n').collect();

        // header first, then newest to oldest
        assert!(lines[0].starts_with("Time"));
        assert!(lines[1].starts_with("2024-01-02"));
        assert!(lines[2].starts_with("2024-01-01"));
    }

    #[test]
    fn test_log_read_empty() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        let log = repo.read_log().unwrap();
        assert!(log.starts_with("Time"));
    }
}
