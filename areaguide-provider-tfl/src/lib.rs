//! Metro station provider backed by the TfL StopPoint API.
//!
//! Keyless: the StopPoint radius search works without credentials, so this
//! provider takes none.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use areaguide_core::{
    model::{Coordinates, TransitKind, TransitStop, sort_stops_by_distance},
    ports::{MetroPort, PortError},
};

const BASE_URL: &str = "https://api.tfl.gov.uk";

const STOP_TYPE: &str = "NaptanMetroStation";

#[derive(Debug, Deserialize)]
struct StopPointsResponse {
    #[serde(rename = "stopPoints", default)]
    stop_points: Vec<StopPoint>,
}

#[derive(Debug, Deserialize)]
struct StopPoint {
    #[serde(rename = "commonName")]
    common_name: String,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    lines: Vec<Line>,
}

#[derive(Debug, Deserialize)]
struct Line {
    name: String,
}

/// Metro provider querying TfL stop points around a location.
pub struct TflClient {
    client: Client,
    base_url: String,
}

impl TflClient {
    /// Create a new metro provider bound to the given HTTP client.
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
impl MetroPort for TflClient {
    async fn nearby_stations(
        &self,
        center: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<TransitStop>, PortError> {
        let lat = center.latitude.to_string();
        let lon = center.longitude.to_string();
        let radius = radius_meters.to_string();

        let resp = self
            .client
            .get(format!("{}/StopPoint", self.base_url))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("radius", radius.as_str()),
                ("stopTypes", STOP_TYPE),
            ])
            .send()
            .await
            .map_err(PortError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::UpstreamStatus(status.as_u16()));
        }

        let body: StopPointsResponse = resp.json().await.map_err(PortError::from)?;

        let mut stations: Vec<TransitStop> = body
            .stop_points
            .into_iter()
            .map(|stop| TransitStop {
                name: stop.common_name,
                distance_meters: stop.distance.round(),
                kind: TransitKind::Metro,
                description: None,
                lines: stop.lines.into_iter().map(|line| line.name).collect(),
            })
            .collect();

        sort_stops_by_distance(&mut stations);
        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    const HERE: Coordinates = Coordinates {
        latitude: 51.501,
        longitude: -0.1416,
    };

    #[tokio::test]
    async fn stations_carry_lines_and_sort_by_rounded_distance() {
        let server = MockServer::start();
        let stop_point = server.mock(|when, then| {
            when.method(GET)
                .path("/StopPoint")
                .query_param("stopTypes", "NaptanMetroStation")
                .query_param("radius", "1000");
            then.status(200).json_body(serde_json::json!({
                "stopPoints": [
                    {
                        "commonName": "Green Park Underground Station",
                        "distance": 612.4,
                        "lines": [
                            { "name": "Jubilee" },
                            { "name": "Piccadilly" },
                            { "name": "Victoria" }
                        ]
                    },
                    {
                        "commonName": "St. James's Park Underground Station",
                        "distance": 389.7,
                        "lines": [
                            { "name": "Circle" },
                            { "name": "District" }
                        ]
                    }
                ]
            }));
        });

        let metro = TflClient::with_base_url(Client::new(), server.url(""));
        let stations = metro
            .nearby_stations(HERE, 1000)
            .await
            .expect("query succeeds");

        stop_point.assert();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name, "St. James's Park Underground Station");
        assert!((stations[0].distance_meters - 390.0).abs() < f64::EPSILON);
        assert_eq!(stations[0].kind, TransitKind::Metro);
        assert_eq!(stations[1].lines, ["Jubilee", "Piccadilly", "Victoria"]);
    }

    #[tokio::test]
    async fn empty_result_is_an_empty_list() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/StopPoint");
            then.status(200).json_body(serde_json::json!({ "stopPoints": [] }));
        });

        let metro = TflClient::with_base_url(Client::new(), server.url(""));
        let stations = metro
            .nearby_stations(HERE, 1000)
            .await
            .expect("query succeeds");

        assert!(stations.is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_reported_with_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/StopPoint");
            then.status(500);
        });

        let metro = TflClient::with_base_url(Client::new(), server.url(""));
        let err = metro
            .nearby_stations(HERE, 1000)
            .await
            .expect_err("server error");

        assert!(matches!(err, PortError::UpstreamStatus(500)));
    }
}
