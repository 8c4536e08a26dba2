//! Elevation service client (USGS Elevation Point Query Service)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use shared::{Coordinate, Elevation};

use super::{ElevationProvider, ProviderError, ProviderResult};

/// EPQS returns this when the point has no elevation data
const NO_DATA_SENTINEL: f64 = -1_000_000.0;

/// Elevation API client
#[derive(Clone)]
pub struct ElevationClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EpqsResponse {
    value: Value,
}

impl ElevationClient {
    /// Create a new ElevationClient
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch ground elevation in feet
    pub async fn get_elevation(&self, coord: Coordinate) -> ProviderResult<Elevation> {
        let url = format!(
            "{}/json?x={}&y={}&units=Feet&wkid=4326&includeDate=false",
            self.base_url,
            coord.longitude(),
            coord.latitude()
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let data: EpqsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parse_elevation(&data.value).map(Elevation::new)
    }
}

/// EPQS reports the value as either a JSON number or a numeric string
fn parse_elevation(value: &Value) -> ProviderResult<f64> {
    let feet = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ProviderError::Parse(format!("unexpected elevation value: {}", value)))?;

    if feet <= NO_DATA_SENTINEL || !feet.is_finite() {
        return Err(ProviderError::Unavailable(
            "no elevation data at this point".to_string(),
        ));
    }
    Ok(feet)
}

#[async_trait]
impl ElevationProvider for ElevationClient {
    async fn elevation(&self, coord: Coordinate) -> ProviderResult<Elevation> {
        self.get_elevation(coord).await
    }
}
