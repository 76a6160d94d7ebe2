use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

pub mod autocomplete;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod phonetic;
pub mod services;
pub mod store;
pub mod tokenizer;

use crate::autocomplete::Autocomplete;
use crate::cache::{Cache, MemoryCache};
use crate::config::Config;
use crate::models::Pagination;
use crate::store::Store;
use crate::tokenizer::LangTable;

pub use crate::error::Error;

/// 全局状态, 在 Handler 中通过 `State<Arc<AppState>>` 获取
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// 语言 -> 分词器, 启动后只读
    pub langs: LangTable,
    pub cache: Option<Arc<dyn Cache>>,
    /// 各语言的自动补全前缀树
    pub autocomplete: Autocomplete,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, langs: LangTable, store: Arc<dyn Store>) -> Self {
        // 按配置启用进程内缓存
        let cache: Option<Arc<dyn Cache>> = if config.cache.enabled {
            Some(Arc::new(MemoryCache::new(config.cache.ttl(), config.cache.max_items)))
        } else {
            None
        };

        Self {
            store,
            langs,
            cache,
            autocomplete: Autocomplete::new(),
            config,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 页码 -> offset/limit, 使用配置中的默认值和上限
    pub fn paginate(&self, page: Option<i64>, per_page: Option<i64>) -> Pagination {
        let s = &self.config.search;
        Pagination::new(page, per_page, s.default_per_page, s.max_per_page)
    }

    /// 读缓存, 任何错误都当作未命中
    pub fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        match cache.get(key) {
            Ok(Some(raw)) => match serde_json::from_slice(&raw) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("--- 缓存数据无法解析 {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("--- 读取缓存失败 {}: {}", key, e);
                None
            }
        }
    }

    /// 写缓存, 失败只记日志
    pub fn cache_put<T: Serialize>(&self, key: &str, val: &T) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let res = serde_json::to_vec(val)
            .map_err(cache::CacheError::from)
            .and_then(|raw| cache.put(key, raw, None));
        if let Err(e) = res {
            tracing::warn!("--- 写入缓存失败 {}: {}", key, e);
        }
    }
}
