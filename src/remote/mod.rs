use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::RemoteResult;

pub mod local;

pub use local::{LocalClientFactory, LocalLibraryClient};

/// 文件大小属性（字节数）
pub const PROPERTY_SIZE: &str = "Length";
/// 最后修改时间属性
pub const PROPERTY_MTIME: &str = "TimeLastModified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Folder,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::File => f.write_str("file"),
            ItemKind::Folder => f.write_str("dir"),
        }
    }
}

/// 远端文件或文件夹的元数据，缓存后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub kind: ItemKind,
    pub name: String,
    pub server_relative_url: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ItemDescriptor {
    pub fn file(url: impl Into<String>, size: Option<u64>, last_modified: Option<DateTime<Utc>>) -> Self {
        Self::new(ItemKind::File, url.into(), size, last_modified)
    }

    pub fn folder(url: impl Into<String>, last_modified: Option<DateTime<Utc>>) -> Self {
        Self::new(ItemKind::Folder, url.into(), None, last_modified)
    }

    fn new(kind: ItemKind, url: String, size: Option<u64>, last_modified: Option<DateTime<Utc>>) -> Self {
        let name = url.trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_string();
        Self {
            kind,
            name,
            server_relative_url: url,
            size,
            last_modified,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }
}

/// 一个文件夹的内容：子文件夹集合与文件集合，保持远端返回的顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryListing {
    pub folders: Vec<ItemDescriptor>,
    pub files: Vec<ItemDescriptor>,
}

impl DirectoryListing {
    pub fn new(folders: Vec<ItemDescriptor>, files: Vec<ItemDescriptor>) -> Self {
        Self { folders, files }
    }

    /// 先文件夹后文件
    pub fn items(&self) -> impl Iterator<Item = &ItemDescriptor> {
        self.folders.iter().chain(self.files.iter())
    }

    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// 远端文档库客户端
///
/// 适配层只消费这个接口；路径不存在时必须返回 `RemoteError::NotFound`，
/// 其他失败一律视为普通远端错误。
#[async_trait]
pub trait RemoteClient: Send + Sync + fmt::Debug {
    async fn create_folder(&self, path: &str) -> RemoteResult<ItemDescriptor>;

    /// `folder` 为已缓存的文件夹实例，客户端可以借此省去一次查询
    async fn fetch_folder_contents(
        &self,
        path: &str,
        properties: Option<&[&str]>,
        folder: Option<&ItemDescriptor>,
    ) -> RemoteResult<DirectoryListing>;

    /// `kind` 为调用方已知的类型；为 `None` 时由客户端自行判断
    async fn fetch_file_or_folder(
        &self,
        path: &str,
        properties: &[&str],
        kind: Option<ItemKind>,
    ) -> RemoteResult<ItemDescriptor>;

    async fn delete_object(&self, item: &ItemDescriptor) -> RemoteResult<()>;

    fn is_hidden(&self, item: &ItemDescriptor) -> bool;
}

/// 按连接参数创建客户端，测试中可替换
pub trait ClientFactory: Send + Sync {
    fn client(
        &self,
        host: &str,
        credentials: &Credentials,
        library: &str,
    ) -> RemoteResult<Arc<dyn RemoteClient>>;
}

impl<F> ClientFactory for F
where
    F: Fn(&str, &Credentials, &str) -> RemoteResult<Arc<dyn RemoteClient>> + Send + Sync,
{
    fn client(
        &self,
        host: &str,
        credentials: &Credentials,
        library: &str,
    ) -> RemoteResult<Arc<dyn RemoteClient>> {
        self(host, credentials, library)
    }
}
