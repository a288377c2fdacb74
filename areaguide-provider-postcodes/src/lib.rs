//! Geocoding provider backed by the postcodes.io lookup API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use areaguide_core::{
    model::{AdminMetadata, Coordinates, ResolvedLocation},
    ports::{GeocodePort, PortError},
};

const BASE_URL: &str = "https://api.postcodes.io";

/// Response wrapper from /postcodes/{postcode}
#[derive(Debug, Deserialize)]
struct LookupResponse {
    result: Option<PostcodeResult>,
}

/// Resolved postcode entry; many more fields exist, we ignore them.
#[derive(Debug, Deserialize)]
struct PostcodeResult {
    latitude: f64,
    longitude: f64,

    #[serde(default)]
    admin_district: Option<String>,
    #[serde(default)]
    admin_ward: Option<String>,
    #[serde(default)]
    region: Option<String>,

    #[serde(default)]
    codes: Option<AreaCodes>,
}

/// Nested code block carrying the area-unit identifier.
#[derive(Debug, Deserialize)]
struct AreaCodes {
    #[serde(default)]
    lsoa: Option<String>,
}

/// Geocoder bound to the postcodes.io lookup endpoint.
pub struct PostcodesClient {
    client: Client,
    base_url: String,
}

impl PostcodesClient {
    /// Create a new geocoder bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    /// Create a geocoder against a custom base URL (used by tests).
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GeocodePort for PostcodesClient {
    async fn resolve(&self, postcode: &str) -> Result<ResolvedLocation, PortError> {
        let trimmed = postcode.trim();
        if trimmed.is_empty() {
            return Err(PortError::PostcodeNotFound);
        }

        let resp = self
            .client
            .get(format!("{}/postcodes/{trimmed}", self.base_url))
            .send()
            .await
            .map_err(PortError::from)?;

        // The source answers 404 for postcodes it does not know.
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(PortError::PostcodeNotFound);
        }
        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::UpstreamStatus(status.as_u16()));
        }

        let body: LookupResponse = resp.json().await.map_err(PortError::from)?;
        let result = body.result.ok_or(PortError::PostcodeNotFound)?;

        let coordinates = Coordinates::new(result.latitude, result.longitude)
            .ok_or_else(|| PortError::Internal("coordinates out of range".to_owned()))?;

        Ok(ResolvedLocation {
            coordinates,
            admin: AdminMetadata {
                district: result.admin_district,
                ward: result.admin_ward,
                region: result.region,
                lsoa_code: result.codes.and_then(|codes| codes.lsoa),
            },
        })
    }
}
