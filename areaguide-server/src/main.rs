//! HTTP server exposing the neighbourhood guide pipeline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use areaguide_core::{
    config::GuideConfig,
    service::{GuideError, GuideRequest, GuideService, ProviderSet},
};
use areaguide_provider_gemini::GeminiClient;
use areaguide_provider_ons::OnsClient;
use areaguide_provider_overpass::OverpassClient;
use areaguide_provider_police::PoliceClient;
use areaguide_provider_postcodes::PostcodesClient;
use areaguide_provider_tfl::TflClient;
use areaguide_provider_transportapi::TransportApiClient;

const DEFAULT_PORT: u16 = 3001;

#[derive(Clone)]
struct AppState {
    service: Arc<GuideService>,
}

#[derive(Debug, Deserialize)]
struct GuideParams {
    name: Option<String>,
    interests: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

fn build_service(config: &GuideConfig) -> anyhow::Result<GuideService> {
    let client = Client::builder()
        .user_agent("areaguide/0.1")
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let providers = ProviderSet {
        geocode: Arc::new(PostcodesClient::new(client.clone())),
        places: Arc::new(OverpassClient::new(client.clone())),
        transit: Arc::new(TransportApiClient::new(
            client.clone(),
            config.transportapi_app_id.clone(),
            config.transportapi_app_key.clone(),
        )),
        metro: Arc::new(TflClient::new(client.clone())),
        crime: Arc::new(PoliceClient::new(client.clone())),
        demographics: Arc::new(OnsClient::new()),
        narrative: Arc::new(GeminiClient::new(client, config.google_api_key.clone())),
    };

    Ok(GuideService::new(providers, config.search_radius_meters))
}

/// Split a comma-separated interests parameter into trimmed entries.
fn split_interests(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

async fn index() -> &'static str {
    "Neighbourhood Guide Backend"
}

async fn guide(
    State(state): State<AppState>,
    Path(postcode): Path<String>,
    Query(params): Query<GuideParams>,
) -> Response {
    let request = GuideRequest {
        postcode,
        recipient_name: params
            .name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty()),
        interests: split_interests(params.interests.as_deref()),
    };

    match state.service.build_guide(&request).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            if matches!(err, GuideError::Upstream(_)) {
                error!(postcode = %request.postcode, error = %err, "guide generation failed");
            }
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = GuideConfig::from_env();
    let service = Arc::new(build_service(&config)?);

    let app = Router::new()
        .route("/", get(index))
        .route("/api/guide/:postcode", get(guide))
        .with_state(AppState { service });

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    info!(port, "server listening");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interests_split_on_commas_and_trim() {
        assert_eq!(
            split_interests(Some("parks, coffee ,,  live music")),
            ["parks", "coffee", "live music"]
        );
        assert!(split_interests(Some("  ")).is_empty());
        assert!(split_interests(None).is_empty());
    }
}
