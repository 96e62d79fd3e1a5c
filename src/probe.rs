//! Key/model diagnostics
//!
//! Sends a trivial prompt to each model once and reports what came back,
//! so a user can tell which models their API key can actually reach.
//! Unlike the pipeline adapter, every model is tried regardless of the
//! previous outcome.

use crate::ai::gemini::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::gemini::GeminiHttpClient;
use crate::prompts;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_PROBE_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
    "gemini-1.0-pro",
];

const SNIPPET_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Working(String),
    NoContent,
    NotFound,
    Forbidden,
    BadRequest(String),
    Other(u16, String),
    Network(String),
}

impl ProbeStatus {
    pub fn is_working(&self) -> bool {
        matches!(self, ProbeStatus::Working(_))
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Working(text) => write!(f, "working: {}", text),
            ProbeStatus::NoContent => f.write_str("no content in response"),
            ProbeStatus::NotFound => f.write_str("model not found (404)"),
            ProbeStatus::Forbidden => {
                f.write_str("access forbidden (403) - check API key permissions")
            }
            ProbeStatus::BadRequest(body) => write!(f, "bad request (400): {}", body),
            ProbeStatus::Other(status, body) => write!(f, "status {}: {}", status, body),
            ProbeStatus::Network(e) => write!(f, "network error: {}", e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelProbe {
    pub model: String,
    pub status: ProbeStatus,
}

fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn classify(status: StatusCode, body: &str) -> ProbeStatus {
    match status {
        StatusCode::OK => match serde_json::from_str::<GenerateContentResponse>(body) {
            Ok(response) => match response.first_text() {
                Some(text) => ProbeStatus::Working(snippet(text, 50)),
                None => ProbeStatus::NoContent,
            },
            Err(_) => ProbeStatus::NoContent,
        },
        StatusCode::NOT_FOUND => ProbeStatus::NotFound,
        StatusCode::FORBIDDEN => ProbeStatus::Forbidden,
        StatusCode::BAD_REQUEST => ProbeStatus::BadRequest(snippet(body, SNIPPET_CHARS)),
        other => ProbeStatus::Other(other.as_u16(), snippet(body, SNIPPET_CHARS)),
    }
}

/// Probe each model in order.
pub async fn probe_models(
    http: &GeminiHttpClient,
    models: &[String],
    timeout: Duration,
) -> Vec<ModelProbe> {
    let request = GenerateContentRequest::prompt_only(prompts::build_probe_prompt());
    let mut results = Vec::with_capacity(models.len());

    for model in models {
        tracing::info!("Probing model {}", model);
        let status = match http.generate_content(model, &request, timeout).await {
            Ok(reply) => classify(reply.status, &reply.body),
            Err(e) => ProbeStatus::Network(e.to_string()),
        };
        tracing::debug!("Probe result for {}: {}", model, status);

        results.push(ModelProbe {
            model: model.clone(),
            status,
        });
    }

    results
}
