use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use crate::cache::{CachedMetadata, MetadataCache};
use crate::config::StorageConfig;
use crate::error::{FsError, RemoteResult, Result};
use crate::fs::{DirectoryStream, FileHandle, FileSystem, FileSize, OpenMode, Stat};
use crate::path::RemotePath;
use crate::remote::{
    ClientFactory, DirectoryListing, ItemDescriptor, ItemKind, RemoteClient, PROPERTY_MTIME,
    PROPERTY_SIZE,
};

/// 查询单个对象时请求的属性
const STAT_PROPERTIES: [&str; 2] = [PROPERTY_SIZE, PROPERTY_MTIME];

/// 删除时依次尝试的对象类型，先文件后文件夹
const DELETE_ATTEMPTS: [ItemKind; 2] = [ItemKind::File, ItemKind::Folder];

/// SharePoint 文档库存储
///
/// 把类文件系统调用转换为远端客户端调用，并在进程内缓存远端元数据。
/// 缓存的"查询-请求-写入"过程没有加锁，只能在单写者的前提下使用。
pub struct SharePointStorage {
    host: String,
    library: String,
    user: String,
    client: Arc<dyn RemoteClient>,
    cache: Arc<MetadataCache>,
}

impl fmt::Debug for SharePointStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharePointStorage")
            .field("host", &self.host)
            .field("library", &self.library)
            .field("user", &self.user)
            .field("cache_stats", &self.cache.stats().to_string())
            .finish()
    }
}

pub struct StorageBuilder<'f> {
    config: StorageConfig,
    factory: Option<&'f dyn ClientFactory>,
    cache: Option<Arc<MetadataCache>>,
}

impl<'f> StorageBuilder<'f> {
    pub fn client_factory(mut self, factory: &'f dyn ClientFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<SharePointStorage> {
        let credentials = self.config.validate()?;
        let factory = self
            .factory
            .ok_or_else(|| FsError::InvalidOperation("no remote client factory given".to_string()))?;

        let StorageConfig {
            host,
            document_library: library,
            cache_capacity,
            ..
        } = self.config;

        let client = factory.client(&host, &credentials, &library)?;
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MetadataCache::new(cache_capacity)));

        info!(
            "SharePoint storage ready: host={}, library={}, user={}, cache_capacity={}",
            host,
            library,
            credentials.user,
            cache.capacity()
        );

        Ok(SharePointStorage {
            host,
            library,
            user: credentials.user,
            client,
            cache,
        })
    }
}

impl SharePointStorage {
    pub fn builder<'f>(config: StorageConfig) -> StorageBuilder<'f> {
        StorageBuilder {
            config,
            factory: None,
            cache: None,
        }
    }

    pub fn new(config: StorageConfig, factory: &dyn ClientFactory) -> Result<Self> {
        Self::builder(config).client_factory(factory).build()
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// 获取缓存统计信息
    pub fn cache_stats(&self) -> String {
        self.cache.stats().to_string()
    }

    pub fn remote_path(&self, path: &str) -> RemotePath {
        RemotePath::from_relative(&self.library, path)
    }

    /// 目录内容：先查缓存，未命中时请求远端并缓存每个子项
    async fn folder_contents(&self, url: &RemotePath) -> RemoteResult<Arc<DirectoryListing>> {
        let entry = self.cache.get(url).unwrap_or_default();
        if let Some(children) = entry.children {
            debug!("folder_contents: cache hit for {}", url);
            return Ok(children);
        }

        debug!("folder_contents: fetching {}", url);
        let listing = self
            .client
            .fetch_folder_contents(url.as_str(), None, entry.instance.as_deref())
            .await?;
        let listing = Arc::new(listing);

        self.cache.set(
            url,
            CachedMetadata {
                instance: None,
                children: Some(listing.clone()),
            },
        );

        // 缓存子项实例，之后 stat 子项不需要再请求远端
        for item in listing.items() {
            let child = RemotePath::from_server_url(item.server_relative_url.clone());
            let has_instance = self
                .cache
                .get(&child)
                .map_or(false, |cached| cached.instance.is_some());
            if !has_instance {
                self.cache.set_instance(&child, item.clone());
            }
        }

        Ok(listing)
    }

    /// 单个对象：先查缓存，未命中时请求远端
    async fn file_or_folder(&self, url: &RemotePath) -> RemoteResult<Arc<ItemDescriptor>> {
        if let Some(instance) = self.cache.get(url).and_then(|entry| entry.instance) {
            debug!("file_or_folder: cache hit for {}", url);
            return Ok(instance);
        }

        debug!("file_or_folder: fetching {}", url);
        let item = self
            .client
            .fetch_file_or_folder(url.as_str(), &STAT_PROPERTIES, None)
            .await?;
        let item = Arc::new(item);
        self.cache.set(
            url,
            CachedMetadata {
                instance: Some(item.clone()),
                children: None,
            },
        );
        Ok(item)
    }

    /// 路径本身及其子路径的条目整体删除，所有上级目录只丢弃目录内容
    ///
    /// 远端创建文件夹时会补齐中间目录，删除文件夹时连同子项一起删除。
    fn invalidate(&self, url: &RemotePath) {
        self.cache.remove_prefix(url);
        let mut ancestor = url.parent();
        while let Some(parent) = ancestor {
            self.cache.forget_children(&parent);
            ancestor = parent.parent();
        }
    }

    async fn delete_as(&self, url: &RemotePath, kind: ItemKind) -> RemoteResult<()> {
        let item = self
            .client
            .fetch_file_or_folder(url.as_str(), &[], Some(kind))
            .await?;
        self.client.delete_object(&item).await
    }
}

#[async_trait]
impl FileSystem for SharePointStorage {
    fn id(&self) -> String {
        format!("SharePoint::{}::{}::{}", self.host, self.library, self.user)
    }

    async fn create_directory<'a>(&'a self, path: &'a str) -> bool {
        let url = self.remote_path(path);
        match self.client.create_folder(url.as_str()).await {
            Ok(_) => {
                self.invalidate(&url);
                debug!("create_directory: created {}", url);
                true
            }
            Err(e) => {
                warn!("create_directory: failed for {}: {}", url, e);
                false
            }
        }
    }

    async fn remove_directory<'a>(&'a self, path: &'a str) -> bool {
        // TODO: 远端删除文件夹尚未实现，目前只报告成功
        debug!("remove_directory: not implemented, ignoring {}", path);
        true
    }

    async fn list_directory<'a>(&'a self, path: &'a str) -> Result<DirectoryStream> {
        let url = self.remote_path(path);
        let listing = self.folder_contents(&url).await.map_err(|e| {
            debug!("list_directory: {} failed: {}", url, e);
            FsError::from(e)
        })?;

        let names = listing
            .items()
            .filter(|item| !self.client.is_hidden(item))
            .map(|item| item.name.clone())
            .collect();
        Ok(DirectoryStream::new(names))
    }

    async fn stat<'a>(&'a self, path: &'a str) -> Option<Stat> {
        let url = self.remote_path(path);
        let item = match self.file_or_folder(&url).await {
            Ok(item) => item,
            Err(e) => {
                debug!("stat: {} failed: {}", url, e);
                return None;
            }
        };

        // 远端没有修改时间时按 stat 失败处理
        let Some(mtime) = item.last_modified else {
            warn!("stat: {} has no modification time", url);
            return None;
        };

        Some(Stat {
            size: FileSize::from(item.size),
            mtime,
            // 远端不记录访问时间
            atime: Utc::now(),
        })
    }

    async fn file_type<'a>(&'a self, path: &'a str) -> Option<ItemKind> {
        let url = self.remote_path(path);
        match self.file_or_folder(&url).await {
            Ok(item) => Some(item.kind),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!("file_type: {} failed: {}", url, e);
                None
            }
        }
    }

    async fn exists<'a>(&'a self, path: &'a str) -> bool {
        let url = self.remote_path(path);
        match self.file_or_folder(&url).await {
            Ok(_) => true,
            Err(e) => {
                if !e.is_not_found() {
                    warn!("exists: {} failed, reporting missing: {}", url, e);
                }
                false
            }
        }
    }

    async fn delete<'a>(&'a self, path: &'a str) -> bool {
        let path = path.trim();
        if path.trim_matches('/').is_empty() {
            debug!("delete: refusing to delete root {:?}", path);
            return false;
        }

        let url = self.remote_path(path);
        for kind in DELETE_ATTEMPTS {
            match self.delete_as(&url, kind).await {
                Ok(()) => {
                    self.invalidate(&url);
                    debug!("delete: removed {} as {}", url, kind);
                    return true;
                }
                Err(e) => debug!("delete: {} as {} failed: {}", url, kind, e),
            }
        }
        false
    }

    async fn open<'a>(&'a self, path: &'a str, mode: OpenMode) -> Result<FileHandle> {
        Err(FsError::Unsupported(format!("open {} ({:?})", path, mode)))
    }

    async fn set_modification_time<'a>(&'a self, path: &'a str, _mtime: Option<DateTime<Utc>>) -> bool {
        debug!("set_modification_time: not supported, ignoring {}", path);
        true
    }
}
