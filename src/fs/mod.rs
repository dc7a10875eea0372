use std::fmt;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;
use crate::error::Result;
use crate::remote::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSize {
    Known(u64),
    Unknown,
}

impl From<Option<u64>> for FileSize {
    fn from(size: Option<u64>) -> Self {
        size.map_or(FileSize::Unknown, FileSize::Known)
    }
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSize::Known(size) => write!(f, "{}", size),
            FileSize::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub size: FileSize,
    pub mtime: DateTime<Utc>,
    pub atime: DateTime<Utc>,
}

/// 目录项名称流，只能遍历一次
#[derive(Debug)]
pub struct DirectoryStream {
    names: std::vec::IntoIter<String>,
}

impl DirectoryStream {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: names.into_iter(),
        }
    }
}

impl Iterator for DirectoryStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.names.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
    ReadWrite,
}

pub type FileHandle = Box<dyn AsyncRead + Send + Unpin>;

#[async_trait]
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// 相同参数创建的存储必须返回相同的标识
    fn id(&self) -> String;

    async fn create_directory<'a>(&'a self, path: &'a str) -> bool;
    async fn remove_directory<'a>(&'a self, path: &'a str) -> bool;
    async fn list_directory<'a>(&'a self, path: &'a str) -> Result<DirectoryStream>;
    async fn stat<'a>(&'a self, path: &'a str) -> Option<Stat>;
    async fn file_type<'a>(&'a self, path: &'a str) -> Option<ItemKind>;
    async fn exists<'a>(&'a self, path: &'a str) -> bool;
    async fn delete<'a>(&'a self, path: &'a str) -> bool;
    async fn open<'a>(&'a self, path: &'a str, mode: OpenMode) -> Result<FileHandle>;
    async fn set_modification_time<'a>(&'a self, path: &'a str, mtime: Option<DateTime<Utc>>) -> bool;

    async fn is_dir<'a>(&'a self, path: &'a str) -> bool {
        self.file_type(path).await == Some(ItemKind::Folder)
    }

    async fn is_file<'a>(&'a self, path: &'a str) -> bool {
        self.file_type(path).await == Some(ItemKind::File)
    }

    async fn file_size<'a>(&'a self, path: &'a str) -> Option<FileSize> {
        self.stat(path).await.map(|stat| stat.size)
    }

    async fn modification_time<'a>(&'a self, path: &'a str) -> Option<DateTime<Utc>> {
        self.stat(path).await.map(|stat| stat.mtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_size_from_option() {
        assert_eq!(FileSize::from(Some(10)), FileSize::Known(10));
        assert_eq!(FileSize::from(None), FileSize::Unknown);
        assert_eq!(FileSize::Known(0).to_string(), "0");
        assert_eq!(FileSize::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_directory_stream_is_consumed_once() {
        let mut stream = DirectoryStream::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(stream.size_hint(), (2, Some(2)));
        assert_eq!(stream.next().as_deref(), Some("a"));
        assert_eq!(stream.by_ref().collect::<Vec<_>>(), vec!["b".to_string()]);
        assert_eq!(stream.next(), None);
    }
}
