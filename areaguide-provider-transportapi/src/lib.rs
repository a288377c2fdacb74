//! Transit provider backed by the TransportAPI places endpoint.
//!
//! Credentialed: without an application id and key the provider fails with
//! [`PortError::MissingCredentials`]; the orchestrator degrades that to empty
//! transit sections.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use areaguide_core::{
    model::{Coordinates, NearbyTransit, TransitKind, TransitStop, sort_stops_by_distance},
    ports::{PortError, TransitPort},
};

const BASE_URL: &str = "https://transportapi.com/v3";

/// Upstream result cap; ten is plenty for a neighbourhood guide.
const RESULT_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    member: Vec<Member>,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    distance: f64,
}

/// Transit provider querying TransportAPI for train stations and bus stops
/// in one request.
pub struct TransportApiClient {
    client: Client,
    base_url: String,
    app_id: Option<String>,
    app_key: Option<String>,
}

impl TransportApiClient {
    /// Create a new transit provider; credentials may be absent.
    #[must_use]
    pub fn new(client: Client, app_id: Option<String>, app_key: Option<String>) -> Self {
        Self::with_base_url(client, BASE_URL, app_id, app_key)
    }

    /// Create a provider against a custom base URL (used by tests).
    #[must_use]
    pub fn with_base_url(
        client: Client,
        base_url: impl Into<String>,
        app_id: Option<String>,
        app_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            app_id,
            app_key,
        }
    }

    fn credentials(&self) -> Result<(&str, &str), PortError> {
        match (self.app_id.as_deref(), self.app_key.as_deref()) {
            (Some(id), Some(key)) => Ok((id, key)),
            _ => Err(PortError::MissingCredentials(
                "TRANSPORTAPI_APP_ID / TRANSPORTAPI_APP_KEY",
            )),
        }
    }
}

#[async_trait]
impl TransitPort for TransportApiClient {
    async fn nearby(&self, center: Coordinates) -> Result<NearbyTransit, PortError> {
        let (app_id, app_key) = self.credentials()?;

        let lat = center.latitude.to_string();
        let lon = center.longitude.to_string();
        let limit = RESULT_LIMIT.to_string();

        let resp = self
            .client
            .get(format!("{}/uk/places.json", self.base_url))
            .query(&[
                ("app_id", app_id),
                ("app_key", app_key),
                ("lat", &lat),
                ("lon", &lon),
                ("type", "bus_stop,train_station"),
                ("limit", &limit),
            ])
            .send()
            .await
            .map_err(PortError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::UpstreamStatus(status.as_u16()));
        }

        let body: PlacesResponse = resp.json().await.map_err(PortError::from)?;

        let mut transit = NearbyTransit::default();
        for member in body.member {
            let Some(name) = member.name else { continue };

            let kind = match member.kind.as_str() {
                "train_station" => TransitKind::Train,
                "bus_stop" => TransitKind::Bus,
                _ => continue,
            };

            let stop = TransitStop {
                name,
                distance_meters: member.distance,
                kind,
                description: member.description,
                lines: Vec::new(),
            };

            match kind {
                TransitKind::Train => transit.train_stations.push(stop),
                TransitKind::Bus => transit.bus_stops.push(stop),
                TransitKind::Metro => {}
            }
        }

        sort_stops_by_distance(&mut transit.train_stations);
        sort_stops_by_distance(&mut transit.bus_stops);
        Ok(transit)
    }
}
