//! Optional Redis-backed response cache.
//!
//! [`CacheClient`] is an explicit, injectable client constructed once at
//! process startup and passed to handlers by reference; there is no ambient
//! global connection state. Connection failure is not an error condition:
//! after a small bounded number of attempts with linear backoff the client
//! stays disconnected for the process lifetime and every operation degrades
//! to a no-op. The cache is an accelerator only and is never authoritative
//! for any write path, so no operation here returns an error to callers.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Number of connection attempts before giving up for the process lifetime.
pub const CONNECT_ATTEMPTS: u32 = 3;

/// Linear backoff step between connection attempts, in milliseconds.
const BACKOFF_STEP_MS: u64 = 50;

/// Upper bound on the backoff delay.
const BACKOFF_CAP_MS: u64 = 2000;

/// Delay before the next connection attempt: linear in the attempt number,
/// capped.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis((BACKOFF_STEP_MS * u64::from(attempt)).min(BACKOFF_CAP_MS))
}

/// Best-effort TTL cache over a Redis connection.
///
/// Cloneable is deliberately not derived; share via `Arc`.
pub struct CacheClient {
    conn: Option<MultiplexedConnection>,
    available: AtomicBool,
}

impl CacheClient {
    /// Try to connect, retrying [`CONNECT_ATTEMPTS`] times with linear
    /// backoff. On exhaustion the returned client is permanently
    /// disconnected; a fresh connection requires constructing a new client.
    pub async fn connect(url: &str) -> Self {
        let client = match Client::open(url) {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(error = %err, "Invalid cache URL; running without cache");
                return Self::disconnected();
            }
        };

        for attempt in 1..=CONNECT_ATTEMPTS {
            match client.get_multiplexed_async_connection().await {
                Ok(conn) => {
                    tracing::info!(attempt, "Cache connected");
                    return Self {
                        conn: Some(conn),
                        available: AtomicBool::new(true),
                    };
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "Cache connection attempt failed");
                    if attempt < CONNECT_ATTEMPTS {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                    }
                }
            }
        }

        tracing::warn!(
            attempts = CONNECT_ATTEMPTS,
            "Cache unreachable; running without cache for the process lifetime"
        );
        Self::disconnected()
    }

    /// A client that never caches. Used when no cache URL is configured and
    /// when connection attempts are exhausted.
    pub fn disconnected() -> Self {
        Self {
            conn: None,
            available: AtomicBool::new(false),
        }
    }

    /// Whether the client currently considers the cache reachable.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Flip to unavailable after a runtime error. Operations become no-ops
    /// from here on; the connection is not retried.
    fn mark_unavailable(&self, err: &redis::RedisError) {
        tracing::warn!(error = %err, "Cache operation failed; disabling cache");
        self.available.store(false, Ordering::Relaxed);
    }

    fn live_conn(&self) -> Option<MultiplexedConnection> {
        if !self.is_available() {
            return None;
        }
        self.conn.clone()
    }

    /// Fetch and deserialize a cached value. Any miss, error, or decode
    /// failure yields `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.live_conn()?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!(key, "Cache hit");
                    Some(value)
                }
                Err(err) => {
                    // Stale or corrupt entry; treat as a miss.
                    tracing::warn!(key, error = %err, "Cache entry failed to decode");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(key, "Cache miss");
                None
            }
            Err(err) => {
                self.mark_unavailable(&err);
                None
            }
        }
    }

    /// Serialize and store a value with a TTL. Best-effort.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let Some(mut conn) = self.live_conn() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache value failed to serialize");
                return;
            }
        };
        if let Err(err) = conn.set_ex::<_, _, ()>(key, raw, ttl_secs).await {
            self.mark_unavailable(&err);
        }
    }

    /// Delete all keys matching a glob pattern. Best-effort.
    pub async fn delete_pattern(&self, pattern: &str) {
        let Some(mut conn) = self.live_conn() else {
            return;
        };
        let keys: Vec<String> = match conn.keys(pattern).await {
            Ok(keys) => keys,
            Err(err) => {
                self.mark_unavailable(&err);
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        match conn.del::<_, ()>(&keys).await {
            Ok(()) => tracing::debug!(pattern, count = keys.len(), "Cache entries cleared"),
            Err(err) => self.mark_unavailable(&err),
        }
    }

    /// Explicit cache decorator: serve a hit, otherwise run `compute`,
    /// store its success value under `key`, and return it.
    ///
    /// A disconnected or failing cache degrades to calling `compute`
    /// directly; cache state never turns into a caller-visible error.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl_secs: u64,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get_json::<T>(key).await {
            return Ok(hit);
        }
        let value = compute().await?;
        self.set_json(key, &value, ttl_secs).await;
        Ok(value)
    }
}
