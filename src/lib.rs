pub mod error;
pub mod config;
pub mod path;
pub mod cache;
pub mod remote;
pub mod fs;
pub mod storage;

pub use error::{ConfigError, FsError, RemoteError, Result};
pub use config::StorageConfig;
pub use path::RemotePath;
pub use cache::{CachedMetadata, CacheStats, MetadataCache};
pub use remote::{
    ClientFactory, Credentials, DirectoryListing, ItemDescriptor, ItemKind, LocalClientFactory,
    LocalLibraryClient, RemoteClient,
};
pub use fs::{DirectoryStream, FileSize, FileSystem, OpenMode, Stat};
pub use storage::{SharePointStorage, StorageBuilder};
