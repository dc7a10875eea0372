use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Remote error: {0}")]
    Remote(RemoteError),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<RemoteError> for FsError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(path) => FsError::NotFound(path),
            other => FsError::Remote(other),
        }
    }
}

/// 构造存储时的配置错误，不可恢复
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Illegal character in Document Library Name: {0}")]
    IllegalLibraryName(String),

    #[error("No user or password given")]
    MissingCredentials,

    #[error("Cache capacity must be at least 1, got {0}")]
    InvalidCacheCapacity(usize),

    #[error("Failed to read configuration: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 远端客户端返回的错误，只有 `NotFound` 被单独区分
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote object not found: {0}")]
    NotFound(String),

    #[error("Remote request failed: {0}")]
    Request(String),

    #[error("Remote IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, FsError>;
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;
