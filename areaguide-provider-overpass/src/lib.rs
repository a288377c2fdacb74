//! Point-of-interest provider backed by the Overpass API.
//!
//! One request covers the whole category vocabulary: the query unions a
//! node/way/relation triple per category matcher, all bounded by the same
//! `around` radius.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use areaguide_core::{
    categories::CATEGORY_TABLE,
    model::{Coordinates, PlaceKind, PlaceRecord},
    ports::{PlacesPort, PortError},
};

const BASE_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server-side evaluation budget, also used as the request timeout.
const QUERY_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    id: i64,
    /// Own coordinates; present for nodes.
    lat: Option<f64>,
    lon: Option<f64>,
    /// Computed center; present for ways and relations queried with `out center`.
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

/// Places provider issuing a single batched Overpass QL query.
pub struct OverpassClient {
    client: Client,
    base_url: String,
}

impl OverpassClient {
    /// Create a new places provider bound to the given HTTP client.
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

/// Build the Overpass QL query covering every category matcher.
#[must_use]
fn build_query(coordinates: Coordinates, radius_meters: u32) -> String {
    let Coordinates {
        latitude,
        longitude,
    } = coordinates;

    let mut query = format!("[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n(\n");
    for rule in CATEGORY_TABLE {
        for matcher in rule.matchers {
            for element in ["node", "way", "relation"] {
                let _ = writeln!(
                    query,
                    "  {element}(around:{radius_meters},{latitude},{longitude})[\"{}\"=\"{}\"];",
                    matcher.key, matcher.value
                );
            }
        }
    }
    query.push_str(");\nout center;\n");
    query
}

/// Convert raw elements into place records.
///
/// Elements without tags or without usable coordinates are skipped. The
/// result is sorted by name, with unnamed records first.
fn parse_elements(elements: Vec<Element>) -> Vec<PlaceRecord> {
    let mut records: Vec<PlaceRecord> = elements
        .into_iter()
        .filter_map(|element| {
            if element.tags.is_empty() {
                return None;
            }

            let (kind, latitude, longitude) = match (element.lat, element.lon, element.center) {
                (Some(lat), Some(lon), _) => (PlaceKind::Point, lat, lon),
                (_, _, Some(center)) => (PlaceKind::AreaCenter, center.lat, center.lon),
                _ => return None,
            };

            let coordinates = Coordinates::new(latitude, longitude)?;

            Some(PlaceRecord {
                id: element.id,
                kind,
                coordinates,
                tags: element.tags,
            })
        })
        .collect();

    records.sort_by(|left, right| left.name().unwrap_or("").cmp(right.name().unwrap_or("")));
    records
}

#[async_trait]
impl PlacesPort for OverpassClient {
    async fn search(
        &self,
        coordinates: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<PlaceRecord>, PortError> {
        let query = build_query(coordinates, radius_meters);

        let resp = self
            .client
            .post(&self.base_url)
            .header("content-type", "text/plain")
            .body(query)
            .timeout(Duration::from_secs(QUERY_TIMEOUT_SECS))
            .send()
            .await
            .map_err(PortError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::UpstreamStatus(status.as_u16()));
        }

        let body: OverpassResponse = resp.json().await.map_err(PortError::from)?;
        Ok(parse_elements(body.elements))
    }
}
