//! 匿名查询结果缓存
//!
//! 缓存只是优化: 任何错误都由调用方吞掉并回退到实时查询。

use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::models::Query;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend: {0}")]
    Backend(String),
    #[error("cache codec: {0}")]
    Codec(#[from] serde_json::Error),
}

/// 缓存后端接口, 实现需自行保证并发安全
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    fn put(&self, key: &str, val: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError>;
    fn delete(&self, key: &str) -> Result<(), CacheError>;
    fn purge(&self) -> Result<(), CacheError>;
}

struct Item {
    val: Vec<u8>,
    expires: Option<Instant>,
}

impl Item {
    fn expired(&self, now: Instant) -> bool {
        self.expires.map(|t| t <= now).unwrap_or(false)
    }
}

/// 进程内 LRU 缓存, 满了淘汰最久未用的条目, 过期条目在读取时丢弃
pub struct MemoryCache {
    items: Mutex<LruCache<String, Item>>,
    default_ttl: Option<Duration>,
}

impl MemoryCache {
    pub fn new(default_ttl: Option<Duration>, max_items: usize) -> Self {
        let cap = NonZeroUsize::new(max_items).unwrap_or(NonZeroUsize::MIN);
        Self {
            items: Mutex::new(LruCache::new(cap)),
            default_ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        let mut items = self.items.lock();
        let hit = match items.get(key) {
            None => return Ok(None),
            Some(it) if it.expired(now) => None,
            Some(it) => Some(it.val.clone()),
        };
        if hit.is_none() {
            items.pop(key);
        }
        Ok(hit)
    }

    fn put(&self, key: &str, val: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheError> {
        let expires = ttl.or(self.default_ttl).map(|d| Instant::now() + d);
        self.items.lock().put(key.to_string(), Item { val, expires });
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.items.lock().pop(key);
        Ok(())
    }

    fn purge(&self) -> Result<(), CacheError> {
        self.items.lock().clear();
        Ok(())
    }
}

fn digest(parts: &[&str]) -> String {
    let mut h = Sha256::new();
    for p in parts {
        h.update(p.as_bytes());
        // 分隔符, 避免 ("ab", "c") 与 ("a", "bc") 冲突
        h.update([0x1f]);
    }
    hex::encode(h.finalize())
}

/// 检索缓存键, types/tags 排序后参与哈希
pub fn search_key(q: &Query) -> String {
    let mut types = q.types.clone();
    types.sort();
    let mut tags = q.tags.clone();
    tags.sort();

    let query = q.query.trim().to_lowercase();
    let to_lang = q.to_lang_filter().unwrap_or("");
    let types = types.join(",");
    let tags = tags.join(",");
    let status = q.status().as_str();
    let offset = q.offset.to_string();
    let limit = q.limit.to_string();

    format!(
        "s:{}",
        digest(&[
            &query,
            &q.from_lang,
            to_lang,
            &types,
            &tags,
            status,
            &offset,
            &limit
        ])
    )
}

/// 词汇表缓存键
pub fn glossary_key(lang: &str, initial: &str, offset: i64, limit: i64) -> String {
    format!(
        "g:{}",
        digest(&[lang, initial, &offset.to_string(), &limit.to_string()])
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let c = MemoryCache::new(None, 10);
        c.put("a", b"1".to_vec(), None).unwrap();
        assert_eq!(c.get("a").unwrap(), Some(b"1".to_vec()));
        c.delete("a").unwrap();
        assert_eq!(c.get("a").unwrap(), None);
    }

    #[test]
    fn test_expiry() {
        let c = MemoryCache::new(None, 10);
        c.put("a", b"1".to_vec(), Some(Duration::from_millis(0))).unwrap();
        assert_eq!(c.get("a").unwrap(), None);
        assert!(c.is_empty());
    }

    #[test]
    fn test_bounded() {
        let c = MemoryCache::new(Some(Duration::from_secs(60)), 2);
        c.put("a", b"1".to_vec(), None).unwrap();
        c.put("b", b"2".to_vec(), None).unwrap();
        // 读一次 a, 淘汰的应是最久未用的 b
        assert!(c.get("a").unwrap().is_some());
        c.put("c", b"3".to_vec(), None).unwrap();
        assert_eq!(c.len(), 2);
        assert!(c.get("c").unwrap().is_some());
        assert!(c.get("a").unwrap().is_some());
        assert_eq!(c.get("b").unwrap(), None);

        c.purge().unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn test_search_key_order_independent() {
        let mut a = Query {
            query: "Apple".into(),
            from_lang: "english".into(),
            types: vec!["noun".into(), "verb".into()],
            ..Default::default()
        };
        let mut b = a.clone();
        b.types = vec!["verb".into(), "noun".into()];
        b.query = " apple ".into();
        assert_eq!(search_key(&a), search_key(&b));
        assert!(search_key(&a).starts_with("s:"));

        // `*` 与空目标语言等价
        b.to_lang = "*".into();
        assert_eq!(search_key(&a), search_key(&b));

        a.offset = 10;
        assert_ne!(search_key(&a), search_key(&b));
    }

    #[test]
    fn test_glossary_key() {
        assert_eq!(glossary_key("english", "A", 0, 10), glossary_key("english", "A", 0, 10));
        assert_ne!(glossary_key("english", "A", 0, 10), glossary_key("english", "B", 0, 10));
        assert!(glossary_key("english", "A", 0, 10).starts_with("g:"));
    }
}
