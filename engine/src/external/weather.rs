//! Weather archive client for fetching historical daily weather
//!
//! Integrates with the Open-Meteo archive API. Monthly normals are derived
//! from the same daily series by [`monthly_normals`].

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{Coordinate, DailyRecord, MonthlyClimate, MonthlyStats};
use std::collections::{BTreeMap, BTreeSet};

use super::{ProviderError, ProviderResult, WeatherHistoryProvider};

/// Weather archive API client
#[derive(Clone)]
pub struct WeatherArchiveClient {
    client: Client,
    base_url: String,
}

/// Open-Meteo archive response
#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: ArchiveDaily,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

impl WeatherArchiveClient {
    /// Create a new WeatherArchiveClient
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch daily max/min temperature (°F) and precipitation (mm)
    pub async fn get_daily_history(
        &self,
        coord: Coordinate,
        years: u32,
    ) -> ProviderResult<Vec<DailyRecord>> {
        let (start, end) = history_window(Utc::now().date_naive(), years)?;
        let url = format!(
            "{}/archive?latitude={}&longitude={}&start_date={}&end_date={}\
             &daily=temperature_2m_max,temperature_2m_min,precipitation_sum\
             &temperature_unit=fahrenheit&precipitation_unit=mm&timezone=auto",
            self.base_url,
            coord.latitude(),
            coord.longitude(),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let data: ArchiveResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let records = convert_archive_response(data)?;
        if records.is_empty() {
            return Err(ProviderError::Unavailable(
                "archive returned no daily records".to_string(),
            ));
        }
        Ok(records)
    }
}

/// Whole calendar years ending with the last complete year before `today`
fn history_window(today: NaiveDate, years: u32) -> ProviderResult<(NaiveDate, NaiveDate)> {
    let last_year = today.year() - 1;
    let first_year = last_year - years.max(1) as i32 + 1;
    let start = NaiveDate::from_ymd_opt(first_year, 1, 1);
    let end = NaiveDate::from_ymd_opt(last_year, 12, 31);
    start
        .zip(end)
        .ok_or_else(|| ProviderError::InvalidPayload(format!("invalid history window of {} years", years)))
}

/// Convert the column-oriented archive payload to records, skipping days
/// with a missing temperature
fn convert_archive_response(data: ArchiveResponse) -> ProviderResult<Vec<DailyRecord>> {
    let daily = data.daily;
    if daily.temperature_2m_max.len() != daily.time.len()
        || daily.temperature_2m_min.len() != daily.time.len()
    {
        return Err(ProviderError::InvalidPayload(
            "daily columns have mismatched lengths".to_string(),
        ));
    }

    let records = daily
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, day)| {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
            let temp_max_f = daily.temperature_2m_max[i]?;
            let temp_min_f = daily.temperature_2m_min[i]?;
            let precip_mm = daily
                .precipitation_sum
                .get(i)
                .copied()
                .flatten()
                .unwrap_or(0.0);
            Some(DailyRecord {
                date,
                temp_max_f,
                temp_min_f,
                precip_mm,
            })
        })
        .filter(DailyRecord::is_valid)
        .collect();

    Ok(records)
}

/// Aggregate a daily series into monthly normals.
///
/// Temperature is the mean of daily means; precipitation is the month's
/// total averaged over the years in which that month was observed. Months
/// with no records are absent from the result.
pub fn monthly_normals(records: &[DailyRecord]) -> MonthlyStats {
    #[derive(Default)]
    struct Accumulator {
        temp_sum: f64,
        days: u32,
        precip_sum: f64,
        years: BTreeSet<i32>,
    }

    let mut by_month: BTreeMap<u8, Accumulator> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_valid()) {
        let acc = by_month.entry(record.date.month() as u8).or_default();
        acc.temp_sum += record.mean_temp_f();
        acc.days += 1;
        acc.precip_sum += record.precip_mm.max(0.0);
        acc.years.insert(record.date.year());
    }

    MonthlyStats::from_months(by_month.into_iter().map(|(month, acc)| MonthlyClimate {
        month,
        mean_temp_f: acc.temp_sum / acc.days as f64,
        precip_mm: acc.precip_sum / acc.years.len().max(1) as f64,
    }))
}

#[async_trait]
impl WeatherHistoryProvider for WeatherArchiveClient {
    async fn daily_history(&self, coord: Coordinate, years: u32) -> ProviderResult<Vec<DailyRecord>> {
        self.get_daily_history(coord, years).await
    }
}
