use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use crate::error::{RemoteError, RemoteResult};
use super::{
    ClientFactory, Credentials, DirectoryListing, ItemDescriptor, ItemKind, RemoteClient,
    PROPERTY_MTIME, PROPERTY_SIZE,
};

/// 文档库根目录下的系统文件夹，不对用户展示
const FORMS_FOLDER: &str = "Forms";

/// 以本地目录模拟远端文档库：`root/<文档库>/...` 对应 `/<文档库>/...`
#[derive(Debug, Clone)]
pub struct LocalLibraryClient {
    root: PathBuf,
    library: String,
}

impl LocalLibraryClient {
    pub fn new(root: PathBuf, library: impl Into<String>) -> Self {
        Self {
            root,
            library: library.into(),
        }
    }

    fn local_path(&self, url: &str) -> RemoteResult<PathBuf> {
        let relative = Path::new(url.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(RemoteError::Request(format!("path escapes library root: {}", url)));
        }
        Ok(self.root.join(relative))
    }

    fn describe(url: &str, metadata: &Metadata, properties: Option<&[&str]>) -> ItemDescriptor {
        let wants = |name: &str| properties.map_or(true, |props| props.contains(&name));

        let last_modified = if wants(PROPERTY_MTIME) {
            metadata.modified().ok().map(DateTime::<Utc>::from)
        } else {
            None
        };

        if metadata.is_dir() {
            ItemDescriptor::folder(url, last_modified)
        } else {
            let size = if wants(PROPERTY_SIZE) { Some(metadata.len()) } else { None };
            ItemDescriptor::file(url, size, last_modified)
        }
    }

    async fn metadata(&self, url: &str) -> RemoteResult<Metadata> {
        let path = self.local_path(url)?;
        tokio::fs::metadata(&path).await.map_err(|e| map_io(url, e))
    }
}

fn map_io(url: &str, err: std::io::Error) -> RemoteError {
    if err.kind() == std::io::ErrorKind::NotFound {
        RemoteError::NotFound(url.to_string())
    } else {
        RemoteError::Io(err)
    }
}

#[async_trait]
impl RemoteClient for LocalLibraryClient {
    async fn create_folder(&self, path: &str) -> RemoteResult<ItemDescriptor> {
        let full_path = self.local_path(path)?;
        debug!("create_folder: creating {:?}", full_path);
        tokio::fs::create_dir_all(&full_path).await?;
        let metadata = tokio::fs::metadata(&full_path).await?;
        Ok(Self::describe(path, &metadata, None))
    }

    async fn fetch_folder_contents(
        &self,
        path: &str,
        properties: Option<&[&str]>,
        folder: Option<&ItemDescriptor>,
    ) -> RemoteResult<DirectoryListing> {
        match folder {
            Some(item) if !item.is_folder() => {
                return Err(RemoteError::NotFound(path.to_string()));
            }
            Some(_) => {}
            None => {
                if !self.metadata(path).await?.is_dir() {
                    return Err(RemoteError::NotFound(path.to_string()));
                }
            }
        }

        let full_path = self.local_path(path)?;
        let mut dir = tokio::fs::read_dir(&full_path)
            .await
            .map_err(|e| map_io(path, e))?;

        let base = path.trim_end_matches('/');
        let mut listing = DirectoryListing::default();
        while let Some(entry) = dir.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!("fetch_folder_contents: skipping non UTF-8 name in {:?}", full_path);
                continue;
            };
            let metadata = entry.metadata().await?;
            let item = Self::describe(&format!("{}/{}", base, name), &metadata, properties);
            if item.is_folder() {
                listing.folders.push(item);
            } else {
                listing.files.push(item);
            }
        }

        listing.folders.sort_by(|a, b| a.name.cmp(&b.name));
        listing.files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    async fn fetch_file_or_folder(
        &self,
        path: &str,
        properties: &[&str],
        kind: Option<ItemKind>,
    ) -> RemoteResult<ItemDescriptor> {
        let metadata = self.metadata(path).await?;
        let item = Self::describe(path, &metadata, Some(properties));
        match kind {
            Some(expected) if expected != item.kind => Err(RemoteError::NotFound(path.to_string())),
            _ => Ok(item),
        }
    }

    async fn delete_object(&self, item: &ItemDescriptor) -> RemoteResult<()> {
        let url = &item.server_relative_url;
        let full_path = self.local_path(url)?;
        debug!("delete_object: removing {:?} ({})", full_path, item.kind);
        let result = match item.kind {
            ItemKind::File => tokio::fs::remove_file(&full_path).await,
            ItemKind::Folder => tokio::fs::remove_dir_all(&full_path).await,
        };
        result.map_err(|e| map_io(url, e))
    }

    fn is_hidden(&self, item: &ItemDescriptor) -> bool {
        if item.name.starts_with('.') {
            return true;
        }
        let forms = format!("/{}/{}", self.library, FORMS_FOLDER);
        item.is_folder() && item.server_relative_url.trim_end_matches('/') == forms
    }
}

/// 在同一个本地根目录下为每个文档库创建客户端
#[derive(Debug, Clone)]
pub struct LocalClientFactory {
    root: PathBuf,
}

impl LocalClientFactory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ClientFactory for LocalClientFactory {
    fn client(
        &self,
        host: &str,
        credentials: &Credentials,
        library: &str,
    ) -> RemoteResult<Arc<dyn RemoteClient>> {
        debug!(
            "local client for host={} user={} library={} at {:?}",
            host, credentials.user, library, self.root
        );
        Ok(Arc::new(LocalLibraryClient::new(self.root.clone(), library)))
    }
}
