use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::cache::DEFAULT_CAPACITY;
use crate::error::ConfigError;
use crate::remote::Credentials;

fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    pub host: String,
    pub document_library: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl StorageConfig {
    pub fn new(
        host: String,
        document_library: String,
        user: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            host,
            document_library,
            user,
            password,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_json_str(&contents)
    }

    /// 校验配置并返回登录凭据
    ///
    /// 文档库名中的双引号会破坏远端查询的过滤语法，直接拒绝。
    pub fn validate(&self) -> Result<Credentials, ConfigError> {
        if self.document_library.contains('"') {
            return Err(ConfigError::IllegalLibraryName(self.document_library.clone()));
        }

        let (Some(user), Some(password)) = (&self.user, &self.password) else {
            return Err(ConfigError::MissingCredentials);
        };

        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity(self.cache_capacity));
        }

        Ok(Credentials {
            user: user.clone(),
            password: password.clone(),
        })
    }
}
