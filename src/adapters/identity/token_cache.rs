//! Bounded, TTL-expiring cache of verified tokens.
//!
//! Replaces an unbounded process-lifetime map: entries expire after a TTL
//! and the cache holds at most `capacity` tokens, evicting the oldest entry
//! when full.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::user::Identity;

struct CacheEntry {
    identity: Identity,
    inserted_at: Instant,
}

/// Thread-safe token -> identity cache.
pub struct TokenCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl TokenCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Look up a token, ignoring expired entries.
    pub async fn get(&self, token: &str) -> Option<Identity> {
        let entries = self.entries.read().await;
        let entry = entries.get(token)?;
        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.identity.clone())
    }

    /// Insert a verified token, evicting expired entries first and then the
    /// oldest live entry if still at capacity.
    pub async fn insert(&self, token: String, identity: Identity) {
        let mut entries = self.entries.write().await;

        entries.retain(|_, entry| entry.inserted_at.elapsed() <= self.ttl);

        if entries.len() >= self.capacity && !entries.contains_key(&token) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(token, _)| token.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            token,
            CacheEntry {
                identity,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently held (including not-yet-evicted expired
    /// ones).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
