use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::types::{CacheKey, ResearchResult};

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: ResearchResult,
    pub created_at: Instant,
}

/// In-memory research results keyed by (wallet, timeframe).
///
/// Freshness is judged by the caller. Entries are only ever replaced; once
/// `max_entries` is reached, inserting a new key evicts the oldest entry.
pub struct ResearchCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    max_entries: usize,
}

impl ResearchCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn put(&self, key: CacheKey, value: ResearchResult) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                tracing::debug!("Research cache full, evicting {}", oldest);
                entries.remove(&oldest);
            }
        }

        entries.insert(key, CacheEntry {
            value,
            created_at: Instant::now(),
        });
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
