//! Narrative provider backed by the Google Generative Language API.
//!
//! Credentialed and fatal: a guide without its narrative is not worth
//! serving, so a missing key or a failed generation propagates as an error
//! instead of degrading.

use std::fmt::Write as _;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use areaguide_core::ports::{NarrativePort, NarrativeRequest, PortError};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Narrative provider generating the area summary with a hosted model.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a new narrative provider; the key may be absent, in which case
    /// every generation fails with [`PortError::MissingCredentials`].
    #[must_use]
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self::with_base_url(client, BASE_URL, api_key)
    }

    /// Create a provider against a custom base URL (used by tests).
    #[must_use]
    pub fn with_base_url(
        client: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }
}

/// Compose the generation prompt from the request.
#[must_use]
fn build_prompt(request: &NarrativeRequest) -> String {
    let mut prompt = format!(
        "Write a warm, welcoming two-paragraph summary of the neighbourhood \
         around the UK postcode {} (latitude {}, longitude {}). \
         Mention the general character of the area and what day-to-day life \
         there feels like. Do not invent specific business names.",
        request.postcode, request.coordinates.latitude, request.coordinates.longitude
    );

    if let Some(name) = request
        .recipient_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        let _ = write!(prompt, " Address the summary to {name} by name.");
    }

    if !request.interests.is_empty() {
        let _ = write!(
            prompt,
            " The reader is particularly interested in: {}. Weave these in \
             where the area plausibly caters to them.",
            request.interests.join(", ")
        );
    }

    prompt
}

#[async_trait]
impl NarrativePort for GeminiClient {
    async fn summarize(&self, request: &NarrativeRequest) -> Result<String, PortError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PortError::MissingCredentials("GOOGLE_API_KEY"))?;

        let payload = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(request),
                }],
            }],
        };

        let resp = self
            .client
            .post(format!(
                "{}/models/{MODEL}:generateContent",
                self.base_url
            ))
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(PortError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::UpstreamStatus(status.as_u16()));
        }

        let body: GenerateContentResponse = resp.json().await.map_err(PortError::from)?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| PortError::Internal("empty narrative response".to_owned()))?;

        Ok(text)
    }
}
