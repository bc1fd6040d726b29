use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("moka", MokaCacheWrapper);

/// 值与其 TTL（秒）一起存放，由 `EntryTtl` 决定过期时间
type Entry = (String, u64);

struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Duration::from_secs(value.1))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Duration::from_secs(value.1))
    }
}

pub struct MokaCacheWrapper {
    inner: Cache<String, Entry>,
    default_ttl: u64,
}

impl MokaCacheWrapper {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::get();
        Ok(Self::with_capacity(
            config.cache.memory.max_capacity,
            config.cache.default_ttl,
        ))
    }

    pub fn with_capacity(max_capacity: u64, default_ttl: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}, default TTL: {}s",
            max_capacity, default_ttl
        );
        Self { inner, default_ttl }
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some((value, _)) => {
                debug!("Cache hit: {}", key);
                CacheResult::Found(value)
            }
            None => {
                debug!("Cache miss: {}", key);
                CacheResult::NotFound
            }
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        let ttl = if ttl == 0 { self.default_ttl } else { ttl };
        self.inner.insert(key, (value, ttl)).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = MokaCacheWrapper::with_capacity(100, 60);
        cache
            .insert_raw("role:1:permissions".into(), "[]".into(), 0)
            .await;
        assert_eq!(
            cache.get_raw("role:1:permissions").await,
            CacheResult::Found("[]".to_string())
        );

        cache.remove("role:1:permissions").await;
        assert_eq!(
            cache.get_raw("role:1:permissions").await,
            CacheResult::NotFound
        );
    }

    #[tokio::test]
    async fn test_json_helpers_round_trip() {
        let cache = MokaCacheWrapper::with_capacity(100, 60);
        crate::cache::insert_json(&cache, "k".into(), &vec![1_i64, 2, 3], 30).await;
        let value: Option<Vec<i64>> = crate::cache::get_json(&cache, "k").await;
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_dropped() {
        let cache = MokaCacheWrapper::with_capacity(100, 60);
        cache.insert_raw("k".into(), "not json".into(), 30).await;
        let value: Option<Vec<i64>> = crate::cache::get_json(&cache, "k").await;
        assert!(value.is_none());
        assert_eq!(cache.get_raw("k").await, CacheResult::NotFound);
    }
}
