//! Confidence-weighted result cache keyed by coordinate bucket

use chrono::{DateTime, Duration, TimeZone, Utc};
use dashmap::DashMap;
use serde::Serialize;
use shared::{Coordinate, CoordinateBucket, ZoneResult};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::config::CacheConfig;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
            .single()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: ZoneResult,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Concurrent result cache. TTL grows with confidence:
/// `base × (0.5 + confidence)`, never below the configured floor.
/// Degraded results live exactly the floor.
pub struct ResultCache {
    entries: DashMap<CoordinateBucket, CacheEntry>,
    clock: Arc<dyn Clock>,
    base_ttl: Duration,
    min_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            base_ttl: config.base_ttl(),
            min_ttl: config.min_ttl(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl_for(&self, confidence: f64) -> Duration {
        let confidence = shared::clamp_confidence(confidence);
        let millis = self.base_ttl.num_milliseconds() as f64 * (0.5 + confidence);
        Duration::milliseconds(millis.round() as i64).max(self.min_ttl)
    }

    /// TTL for a specific result
    pub fn ttl_for_result(&self, result: &ZoneResult) -> Duration {
        if result.degraded {
            self.min_ttl
        } else {
            self.ttl_for(result.confidence)
        }
    }

    pub fn get(&self, coord: &Coordinate) -> Option<ZoneResult> {
        let bucket = coord.bucket();
        let now = self.clock.now();

        let expired_at = match self.entries.get(&bucket) {
            Some(entry) if now < entry.expires_at => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%bucket, zone = %entry.result.zone, "Cache hit");
                return Some(entry.result.clone());
            }
            Some(entry) => Some(entry.expires_at),
            None => None,
        };

        // The read guard is released before removing; a fresher entry put in
        // the meantime carries a different expiry and is left alone.
        if let Some(expires_at) = expired_at {
            self.entries
                .remove_if(&bucket, |_, entry| entry.expires_at == expires_at);
            debug!(%bucket, "Cache entry expired");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a result; a concurrent put for the same bucket wins or loses
    /// wholesale, either way leaving a valid entry
    pub fn put(&self, coord: &Coordinate, result: ZoneResult) {
        let ttl = self.ttl_for_result(&result);
        let expires_at = self.clock.now() + ttl;
        debug!(
            bucket = %coord.bucket(),
            zone = %result.zone,
            degraded = result.degraded,
            ttl_minutes = ttl.num_minutes(),
            "Caching zone result"
        );
        self.entries
            .insert(coord.bucket(), CacheEntry { result, expires_at });
    }

    /// Drop the entry for `coord`; returns whether one was present
    pub fn invalidate(&self, coord: &Coordinate) -> bool {
        self.entries.remove(&coord.bucket()).is_some()
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
