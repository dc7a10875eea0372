use std::borrow::Borrow;
use std::fmt;

/// 远端存储中的绝对路径（server relative url），以 `/<文档库>` 开头
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemotePath(String);

impl RemotePath {
    /// 将存储内的相对路径转换为远端路径
    ///
    /// 末尾的 `.` 段连同前面的 `/` 一起被截掉，不做通用的点段解析：
    /// `sub/.` 在文档库 `Lib` 下得到 `/Lib/sub`。
    pub fn from_relative(library: &str, path: &str) -> Self {
        let path = path.trim_matches('/');
        let mut url = format!("/{}", library);
        if !path.is_empty() {
            url.push('/');
            url.push_str(path);
        }

        if url.rsplit('/').next() == Some(".") {
            // 去掉结尾的 "/."
            url.truncate(url.len() - 2);
        }

        Self(url)
    }

    /// 直接封装远端返回的 url，不做任何规范化
    pub fn from_server_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 上一级远端路径；文档库根目录没有上一级
    pub fn parent(&self) -> Option<RemotePath> {
        let trimmed = self.0.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) | None => None,
            Some(idx) => Some(Self(trimmed[..idx].to_string())),
        }
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RemotePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}
