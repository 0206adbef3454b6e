use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Outcome of recording one request against a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed-window request counter keyed by client identity.
///
/// Implementations must not lose increments under concurrent hits on the same key.
/// A multi-instance deployment plugs a shared counter store in here.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record a request for `key` and decide whether it is within `limit`.
    async fn hit(&self, key: &str, limit: u32) -> RateDecision;

    /// Drop expired windows and return how many went. Stores that expire
    /// entries on their own keep the default.
    async fn sweep_expired(&self) -> usize {
        0
    }
}

/// Periodically sweep `store` so windows of clients that never return do not
/// pile up between capacity-triggered sweeps.
pub fn spawn_sweeper(store: Arc<dyn RateLimitStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            store.sweep_expired().await;
        }
    })
}

#[derive(Debug, Clone)]
struct Window {
    count: u32,
    started_at: Instant,
}

impl Window {
    fn is_expired(&self, now: Instant, length: Duration) -> bool {
        now.duration_since(self.started_at) >= length
    }
}

/// Sharded in-memory store for single-instance deployments.
///
/// Keys are hashed onto independent mutex-guarded maps to keep contention low.
/// Windows expire on read; once a shard grows past `max_buckets` its expired
/// windows are swept before the new key is inserted.
#[derive(Clone)]
pub struct InMemoryRateLimitStore {
    shards: Vec<Arc<Mutex<HashMap<String, Window>>>>,
    window: Duration,
    max_buckets: usize,
}

impl InMemoryRateLimitStore {
    /// Create a store with the given window and the default 16 shards
    pub fn new(window: Duration) -> Self {
        Self::with_shards(window, 16)
    }

    /// Create a store with a custom shard count
    pub fn with_shards(window: Duration, shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            window,
            max_buckets: 10_000,
        }
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, limit: u32) -> RateDecision {
        let now = Instant::now();
        let shard_index = self.shard_index(key);
        let mut windows = self.shards[shard_index].lock().await;

        if windows.len() >= self.max_buckets && !windows.contains_key(key) {
            windows.retain(|_, w| !w.is_expired(now, self.window));
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started_at: now,
        });

        if window.is_expired(now, self.window) {
            window.count = 1;
            window.started_at = now;
        } else {
            window.count = window.count.saturating_add(1);
        }

        if window.count > limit {
            let elapsed = now.duration_since(window.started_at);
            RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            }
        } else {
            RateDecision::Allowed {
                remaining: limit - window.count,
            }
        }
    }

    async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for shard in &self.shards {
            let mut windows = shard.lock().await;
            let before = windows.len();
            windows.retain(|_, w| !w.is_expired(now, self.window));
            removed += before - windows.len();
        }
        if removed > 0 {
            tracing::debug!(windows_removed = removed, "Swept expired rate limit windows");
        }
        removed
    }
}
