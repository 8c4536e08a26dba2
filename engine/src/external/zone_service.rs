//! Authoritative hardiness-zone service client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{validate_confidence, Coordinate, ZoneCode};

use super::{AuthoritativeZoneService, ProviderError, ProviderResult, ZoneLookup};

/// Hardiness zone API client
#[derive(Clone)]
pub struct HardinessZoneClient {
    client: Client,
    base_url: String,
}

/// Zone service response
#[derive(Debug, Deserialize)]
struct ZoneServiceResponse {
    zone: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl HardinessZoneClient {
    /// Create a new HardinessZoneClient
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the official zone for GPS coordinates
    pub async fn get_zone(&self, coord: Coordinate) -> ProviderResult<ZoneLookup> {
        let url = format!(
            "{}/zone?lat={}&lon={}",
            self.base_url,
            coord.latitude(),
            coord.longitude()
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let data: ZoneServiceResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        convert_zone_response(data)
    }
}

fn convert_zone_response(data: ZoneServiceResponse) -> ProviderResult<ZoneLookup> {
    let zone: ZoneCode = data
        .zone
        .parse()
        .map_err(|e| ProviderError::InvalidPayload(format!("{}", e)))?;

    Ok(ZoneLookup {
        zone,
        confidence_hint: data.confidence.filter(|c| validate_confidence(*c).is_ok()),
    })
}

#[async_trait]
impl AuthoritativeZoneService for HardinessZoneClient {
    async fn lookup(&self, coord: Coordinate) -> ProviderResult<ZoneLookup> {
        self.get_zone(coord).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_valid_response() {
        let data: ZoneServiceResponse =
            serde_json::from_str(r#"{"zone": "5b", "confidence": 0.97}"#).unwrap();
        let lookup = convert_zone_response(data).unwrap();
        assert_eq!(lookup.zone.to_string(), "5b");
        assert_eq!(lookup.confidence_hint, Some(0.97));
    }

    #[test]
    fn test_convert_drops_out_of_range_hint() {
        let data: ZoneServiceResponse =
            serde_json::from_str(r#"{"zone": "7A", "confidence": 97}"#).unwrap();
        let lookup = convert_zone_response(data).unwrap();
        assert_eq!(lookup.zone.to_string(), "7a");
        assert_eq!(lookup.confidence_hint, None);
    }

    #[test]
    fn test_convert_rejects_unknown_zone() {
        let data: ZoneServiceResponse = serde_json::from_str(r#"{"zone": "15c"}"#).unwrap();
        assert!(matches!(
            convert_zone_response(data),
            Err(ProviderError::InvalidPayload(_))
        ));
    }
}
