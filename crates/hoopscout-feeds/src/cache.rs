// In-memory response cache keyed by request, with a per-call TTL.
//
// The cache is an injected service: feed clients receive an
// `Arc<dyn ResponseCache>` rather than owning global state.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::error::FeedResult;

#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Return the cached body for `key` if it is younger than `ttl`,
    /// otherwise await `fetch` and store its result. Errors are returned
    /// as-is and never stored.
    async fn get_or_fetch(
        &self,
        key: &str,
        ttl: Duration,
        fetch: BoxFuture<'_, FeedResult<Value>>,
    ) -> FeedResult<Value>;

    /// Drop every entry.
    fn clear(&self);
}

// ---------------------------------------------------------------------------
// TtlCache
// ---------------------------------------------------------------------------

struct Entry {
    stored_at: Instant,
    body: Value,
}

/// Process-local TTL cache on the tokio clock.
#[derive(Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fresh(&self, key: &str, ttl: Duration) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|e| e.stored_at.elapsed() < ttl)
            .map(|e| e.body.clone())
    }
}

#[async_trait]
impl ResponseCache for TtlCache {
    async fn get_or_fetch(
        &self,
        key: &str,
        ttl: Duration,
        fetch: BoxFuture<'_, FeedResult<Value>>,
    ) -> FeedResult<Value> {
        if let Some(body) = self.fresh(key, ttl) {
            debug!(key, "cache hit");
            return Ok(body);
        }

        debug!(key, "cache miss");
        let body = fetch.await?;
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).insert(
            key.to_string(),
            Entry {
                stored_at: Instant::now(),
                body: body.clone(),
            },
        );
        Ok(body)
    }

    fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

// ---------------------------------------------------------------------------
// NoCache
// ---------------------------------------------------------------------------

/// Pass-through cache: every call fetches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn get_or_fetch(
        &self,
        _key: &str,
        _ttl: Duration,
        fetch: BoxFuture<'_, FeedResult<Value>>,
    ) -> FeedResult<Value> {
        fetch.await
    }

    fn clear(&self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use futures_util::FutureExt;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    async fn counted(cache: &dyn ResponseCache, key: &str, calls: &AtomicUsize) -> FeedResult<Value> {
        cache
            .get_or_fetch(
                key,
                TTL,
                async {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok(json!({ "fetch": n }))
                }
                .boxed(),
            )
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_within_ttl_is_a_hit() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);

        let first = counted(&cache, "ratings:2026", &calls).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = counted(&cache, "ratings:2026", &calls).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_refetches() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);

        counted(&cache, "scoreboard:20260301", &calls).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        let body = counted(&cache, "scoreboard:20260301", &calls).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(body, json!({ "fetch": 2 }));
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        counted(&cache, "a", &calls).await.unwrap();
        counted(&cache, "b", &calls).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = TtlCache::new();
        let err = cache
            .get_or_fetch("k", TTL, async { Err(FeedError::Auth) }.boxed())
            .await;
        assert!(matches!(err, Err(FeedError::Auth)));
        assert!(cache.is_empty());

        let calls = AtomicUsize::new(0);
        counted(&cache, "k", &calls).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        counted(&cache, "k", &calls).await.unwrap();
        cache.clear();
        assert!(cache.is_empty());
        counted(&cache, "k", &calls).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_cache_always_fetches() {
        let calls = AtomicUsize::new(0);
        counted(&NoCache, "k", &calls).await.unwrap();
        counted(&NoCache, "k", &calls).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
