//! Explicit runtime configuration handed to provider constructors.
//!
//! Providers never read the process environment themselves; everything they
//! need arrives through this struct, which keeps them deterministic in tests.

use std::env;

/// Default search radius around the resolved coordinates.
pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 1000;

#[derive(Debug, Clone)]
/// Runtime configuration for the aggregation pipeline and its providers.
pub struct GuideConfig {
    /// Radius in meters used for all nearby searches.
    pub search_radius_meters: u32,
    /// TransportAPI application id; the transit provider degrades to empty
    /// results without it.
    pub transportapi_app_id: Option<String>,
    /// TransportAPI application key.
    pub transportapi_app_key: Option<String>,
    /// Google Generative Language API key; narrative generation is fatal
    /// without it.
    pub google_api_key: Option<String>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            transportapi_app_id: None,
            transportapi_app_key: None,
            google_api_key: None,
        }
    }
}

impl GuideConfig {
    /// Read configuration from the process environment. Blank variables
    /// count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            transportapi_app_id: non_empty_var("TRANSPORTAPI_APP_ID"),
            transportapi_app_key: non_empty_var("TRANSPORTAPI_APP_KEY"),
            google_api_key: non_empty_var("GOOGLE_API_KEY"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
