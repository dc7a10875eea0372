use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use crate::path::RemotePath;
use crate::remote::{DirectoryListing, ItemDescriptor};

/// 默认最大缓存条目数
pub const DEFAULT_CAPACITY: usize = 256;

/// 缓存条目：单个实例与目录内容相互独立，可以只有其中之一
#[derive(Debug, Clone, Default)]
pub struct CachedMetadata {
    pub instance: Option<Arc<ItemDescriptor>>,
    pub children: Option<Arc<DirectoryListing>>,
}

impl CachedMetadata {
    pub fn with_instance(item: ItemDescriptor) -> Self {
        Self {
            instance: Some(Arc::new(item)),
            children: None,
        }
    }

    pub fn with_children(listing: DirectoryListing) -> Self {
        Self {
            instance: None,
            children: Some(Arc::new(listing)),
        }
    }
}

#[derive(Debug)]
struct CacheSlot {
    metadata: CachedMetadata,
    /// 插入序号，淘汰时删除序号最小的条目
    inserted: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<RemotePath, CacheSlot>,
    next_seq: u64,
}

/// 远端元数据缓存
///
/// 容量固定，超出时删除最早插入的条目。更新已有条目不会改变它的淘汰顺序。
/// 内部用读写锁保护，但"查缓存-请求远端-写缓存"这一过程不是原子的。
#[derive(Debug)]
pub struct MetadataCache {
    state: RwLock<CacheState>,
    /// 最大缓存条目数
    capacity: usize,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MetadataCache {
    /// 创建新的元数据缓存，容量至少为 1
    pub fn new(capacity: usize) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            capacity: capacity.max(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// 获取缓存条目；`None` 只表示需要重新请求，不表示远端不存在
    pub fn get(&self, key: &RemotePath) -> Option<CachedMetadata> {
        let state = self.read();
        let slot = state.entries.get(key)?;
        debug!("缓存命中: {}", key);
        Some(slot.metadata.clone())
    }

    /// 合并写入：`entry` 中为 `None` 的字段保留原有值
    pub fn set(&self, key: &RemotePath, entry: CachedMetadata) {
        let mut state = self.write();

        if let Some(slot) = state.entries.get_mut(key) {
            if entry.instance.is_some() {
                slot.metadata.instance = entry.instance;
            }
            if entry.children.is_some() {
                slot.metadata.children = entry.children;
            }
            debug!("更新缓存: {}", key);
            return;
        }

        // 如果缓存已满，删除最早插入的条目
        if state.entries.len() >= self.capacity {
            if let Some(oldest_key) = state
                .entries
                .iter()
                .min_by_key(|(_, slot)| slot.inserted)
                .map(|(k, _)| k.clone())
            {
                state.entries.remove(&oldest_key);
                debug!("缓存已满，删除最旧条目: {}", oldest_key);
            }
        }

        let inserted = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(key.clone(), CacheSlot { metadata: entry, inserted });
        debug!("写入缓存: {}", key);
    }

    pub fn set_instance(&self, key: &RemotePath, item: ItemDescriptor) {
        self.set(key, CachedMetadata::with_instance(item));
    }

    pub fn set_children(&self, key: &RemotePath, listing: DirectoryListing) {
        self.set(key, CachedMetadata::with_children(listing));
    }

    /// 删除缓存条目
    pub fn remove(&self, key: &RemotePath) {
        let mut state = self.write();
        if state.entries.remove(key).is_some() {
            debug!("删除缓存: {}", key);
        }
    }

    /// 删除该路径及其下所有路径的缓存条目
    pub fn remove_prefix(&self, key: &RemotePath) {
        let prefix = format!("{}/", key.as_str().trim_end_matches('/'));
        let mut state = self.write();
        let before = state.entries.len();
        state
            .entries
            .retain(|k, _| k != key && !k.as_str().starts_with(&prefix));
        let removed = before - state.entries.len();
        if removed > 0 {
            debug!("删除缓存: {} 及其子路径, 共 {} 个条目", key, removed);
        }
    }

    /// 只丢弃目录内容，保留实例
    pub fn forget_children(&self, key: &RemotePath) {
        let mut state = self.write();
        if let Some(slot) = state.entries.get_mut(key) {
            if slot.metadata.children.take().is_some() {
                debug!("丢弃目录缓存: {}", key);
            }
        }
    }

    /// 清空缓存
    pub fn clear(&self) {
        let mut state = self.write();
        let count = state.entries.len();
        state.entries.clear();
        info!("清空缓存: {} 个条目", count);
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 获取缓存统计信息
    pub fn stats(&self) -> CacheStats {
        let state = self.read();
        let mut instances = 0;
        let mut listings = 0;

        for slot in state.entries.values() {
            if slot.metadata.instance.is_some() {
                instances += 1;
            }
            if slot.metadata.children.is_some() {
                listings += 1;
            }
        }

        CacheStats {
            total: state.entries.len(),
            capacity: self.capacity,
            instances,
            listings,
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub capacity: usize,
    pub instances: usize,
    pub listings: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "缓存统计: 总计={}/{}, 实例={}, 目录={}",
            self.total, self.capacity, self.instances, self.listings
        )
    }
}
