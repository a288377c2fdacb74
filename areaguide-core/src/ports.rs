//! Traits describing provider capabilities and the shared provider error type.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Error as ReqwestError;

use crate::model::{
    Coordinates, CrimeRecord, Demographics, NearbyTransit, PlaceRecord, ResolvedLocation,
    TransitStop,
};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to provider backends.
pub enum PortError {
    /// Network layer failed (connect, timeout, or body decode).
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Upstream answered with a non-success HTTP status.
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),
    /// The geocoding source reported no match for the postcode.
    #[error("Postcode not found")]
    PostcodeNotFound,
    /// A credentialed provider was constructed without its credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortError {
    /// Whether this is the transient "service busy" status some feeds
    /// return when overloaded or between data releases.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::UpstreamStatus(503))
    }
}

#[derive(Debug, Clone)]
/// Input for narrative generation.
pub struct NarrativeRequest {
    /// Postcode as supplied by the caller.
    pub postcode: String,
    /// Resolved centroid of the postcode.
    pub coordinates: Coordinates,
    /// Name of the person the guide is addressed to.
    pub recipient_name: Option<String>,
    /// Interests to weave into the narrative.
    pub interests: Vec<String>,
}

#[async_trait]
/// Resolves a postcode to coordinates and administrative metadata.
pub trait GeocodePort: Send + Sync {
    /// Resolve a postcode string.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::PostcodeNotFound`] when the source reports no
    /// match, or another [`PortError`] when the request fails.
    async fn resolve(&self, postcode: &str) -> Result<ResolvedLocation, PortError>;
}

#[async_trait]
/// Searches points of interest around a location.
pub trait PlacesPort: Send + Sync {
    /// Fetch all points of interest within `radius_meters` of `center`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn search(
        &self,
        center: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<PlaceRecord>, PortError>;
}

#[async_trait]
/// Finds nearby train stations and bus stops.
pub trait TransitPort: Send + Sync {
    /// Fetch nearby train stations and bus stops, each list sorted
    /// ascending by distance.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when credentials are missing or the provider
    /// request fails.
    async fn nearby(&self, center: Coordinates) -> Result<NearbyTransit, PortError>;
}

#[async_trait]
/// Finds nearby metro/underground stations. Region-specific; gated by
/// [`crate::region::should_fetch_metro`].
pub trait MetroPort: Send + Sync {
    /// Fetch nearby metro stations sorted ascending by distance.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn nearby_stations(
        &self,
        center: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<TransitStop>, PortError>;
}

#[async_trait]
/// Fetches street-level crime reports around a location.
pub trait CrimePort: Send + Sync {
    /// Fetch crime reports, optionally restricted to the month of `date`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails; a busy feed
    /// surfaces as [`PortError::UpstreamStatus`] with status 503.
    async fn street_level(
        &self,
        center: Coordinates,
        date: Option<NaiveDate>,
    ) -> Result<Vec<CrimeRecord>, PortError>;
}

#[async_trait]
/// Looks up census demographics for an area unit.
pub trait DemographicsPort: Send + Sync {
    /// Fetch demographics for the given area-unit code; `Ok(None)` when the
    /// source has no data for it.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn for_area(&self, area_code: &str) -> Result<Option<Demographics>, PortError>;
}

#[async_trait]
/// Generates the narrative summary of the area.
pub trait NarrativePort: Send + Sync {
    /// Generate a short narrative describing the area around the request
    /// coordinates, personalized when a recipient and interests are given.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when credentials are missing, the request
    /// fails, or the model returns no usable text.
    async fn summarize(&self, request: &NarrativeRequest) -> Result<String, PortError>;
}
