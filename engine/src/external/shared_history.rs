//! Single-fetch daily history shared by the taxonomy and weather detectors
//!
//! Monthly normals and season inference read the same multi-year series.
//! Concurrent requests for one coordinate and window wait on a single
//! upstream fetch; successful series are kept for a short retention window
//! and failures are never kept, so a retry reaches the provider again.

use async_trait::async_trait;
use dashmap::DashMap;
use shared::{Coordinate, DailyRecord, MonthlyStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;

use super::weather::monthly_normals;
use super::{ClimateStatsProvider, ProviderResult, WeatherHistoryProvider};

/// How long a fetched series stays shared
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60);

/// Full-precision coordinate bits plus the window length in years
type HistoryKey = (u64, u64, u32);

struct Slot {
    created: Instant,
    records: Arc<OnceCell<Arc<Vec<DailyRecord>>>>,
}

/// Weather history provider that fetches each series once
pub struct SharedHistory {
    inner: Arc<dyn WeatherHistoryProvider>,
    normals_years: u32,
    retention: Duration,
    slots: DashMap<HistoryKey, Slot>,
}

impl SharedHistory {
    /// `normals_years` is the window monthly normals are computed over
    pub fn new(inner: Arc<dyn WeatherHistoryProvider>, normals_years: u32) -> Self {
        Self {
            inner,
            normals_years,
            retention: DEFAULT_RETENTION,
            slots: DashMap::new(),
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Series currently held
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, coord: Coordinate, years: u32) -> Arc<OnceCell<Arc<Vec<DailyRecord>>>> {
        let now = Instant::now();
        self.slots
            .retain(|_, slot| now.duration_since(slot.created) < self.retention);

        let key = (coord.latitude().to_bits(), coord.longitude().to_bits(), years);
        let slot = self.slots.entry(key).or_insert_with(|| Slot {
            created: now,
            records: Arc::new(OnceCell::new()),
        });
        Arc::clone(&slot.records)
    }

    /// The series for `coord`, fetched at most once per retention window
    pub async fn history(&self, coord: Coordinate, years: u32) -> ProviderResult<Arc<Vec<DailyRecord>>> {
        let cell = self.slot(coord, years);
        let records = cell
            .get_or_try_init(|| async {
                debug!(%coord, years, "Fetching daily history");
                self.inner.daily_history(coord, years).await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(records))
    }
}

#[async_trait]
impl WeatherHistoryProvider for SharedHistory {
    async fn daily_history(&self, coord: Coordinate, years: u32) -> ProviderResult<Vec<DailyRecord>> {
        let records = self.history(coord, years).await?;
        Ok(records.as_ref().clone())
    }
}

#[async_trait]
impl ClimateStatsProvider for SharedHistory {
    async fn monthly_stats(&self, coord: Coordinate) -> ProviderResult<MonthlyStats> {
        let records = self.history(coord, self.normals_years).await?;
        Ok(monthly_normals(&records))
    }
}
