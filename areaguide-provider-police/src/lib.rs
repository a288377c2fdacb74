//! Crime feed provider backed by the data.police.uk street-level API.
//!
//! The feed answers 503 while monthly data is being reloaded; callers can
//! recognize that through [`PortError::is_busy`] and degrade instead of
//! failing the whole request.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use areaguide_core::{
    model::{Coordinates, CrimeRecord},
    ports::{CrimePort, PortError},
};

const BASE_URL: &str = "https://data.police.uk/api";

#[derive(Debug, Deserialize)]
struct CrimeReport {
    category: String,
    #[serde(default)]
    month: Option<String>,
}

/// Crime feed provider querying street-level reports around a point.
pub struct PoliceClient {
    client: Client,
    base_url: String,
}

impl PoliceClient {
    /// Create a new crime feed provider bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    /// Create a provider against a custom base URL (used by tests).
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CrimePort for PoliceClient {
    async fn street_level(
        &self,
        center: Coordinates,
        date: Option<NaiveDate>,
    ) -> Result<Vec<CrimeRecord>, PortError> {
        let lat = center.latitude.to_string();
        let lng = center.longitude.to_string();

        let mut query = vec![("lat", lat), ("lng", lng)];
        if let Some(date) = date {
            query.push(("date", date.format("%Y-%m").to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/crimes-street/all-crime", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(PortError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::UpstreamStatus(status.as_u16()));
        }

        let reports: Vec<CrimeReport> = resp.json().await.map_err(PortError::from)?;

        Ok(reports
            .into_iter()
            .map(|report| CrimeRecord {
                category: report.category,
                month: report.month,
            })
            .collect())
    }
}
