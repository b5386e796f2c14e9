//! Read-through chart cache.
//!
//! Keys are the bit patterns of (jd, latitude, longitude), so two lookups
//! share an entry only when all three are bit-identical. Entries never
//! expire; a cache lives for one rectification request unless the caller
//! shares it deliberately across requests for the same place.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use janma_base::jd_from_datetime;
use janma_metrics::ChartSnapshot;
use serde::Serialize;
use tracing::trace;

use crate::error::ChartError;
use crate::provider::{ChartProvider, fetch_snapshot};

/// (jd bits, latitude bits, longitude bits).
pub type ChartKey = (u64, u64, u64);

pub fn chart_key(jd: f64, latitude: f64, longitude: f64) -> ChartKey {
    (jd.to_bits(), latitude.to_bits(), longitude.to_bits())
}

/// Counters from a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Concurrent snapshot store.
#[derive(Debug, Default)]
pub struct ChartCache {
    entries: DashMap<ChartKey, ChartSnapshot>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ChartCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ChartKey) -> Option<ChartSnapshot> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(jd = f64::from_bits(key.0), "chart cache hit");
                Some(entry.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: ChartKey, snapshot: ChartSnapshot) {
        self.entries.insert(key, snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

/// A provider fronted by a cache. Failed computations are not cached.
pub struct CachedCharts<P> {
    provider: P,
    cache: Arc<ChartCache>,
}

impl<P: ChartProvider> CachedCharts<P> {
    pub fn new(provider: P, cache: Arc<ChartCache>) -> Self {
        Self { provider, cache }
    }

    /// Validated snapshot for an instant and place.
    pub fn snapshot(
        &self,
        at: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<ChartSnapshot, ChartError> {
        let key = chart_key(jd_from_datetime(&at), latitude, longitude);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let snapshot = fetch_snapshot(&self.provider, at, latitude, longitude, altitude)?;
        self.cache.insert(key, snapshot.clone());
        Ok(snapshot)
    }

    pub fn cache(&self) -> &Arc<ChartCache> {
        &self.cache
    }
}
