use std::path::PathBuf;

/// error type for got operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repo already initialized at {0}")]
    RepoAlreadyInited(PathBuf),

    #[error("not a got repo: {0}")]
    NotGotRepo(PathBuf),

    #[error("object does not exist: {0}")]
    ObjDoesNotExist(String),

    #[error("invalid object type: {0}")]
    InvalidObjType(String),

    #[error("only a commit can be the object graph root")]
    WrongRootType,

    #[error("index entry {0} has no parent in the graph")]
    DetachedEntry(String),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("corrupt object: {0}")]
    CorruptObject(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
