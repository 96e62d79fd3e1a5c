use super::types::GenerateContentRequest;
use crate::models::DEFAULT_BASE_URL;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Status and body of one `generateContent` round trip.
#[derive(Debug)]
pub struct RawReply {
    pub status: StatusCode,
    pub body: String,
}

/// Lightweight Gemini REST client: one POST per call, no interpretation.
#[derive(Clone)]
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiHttpClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// POST to `{base}/v1beta/models/{model}:generateContent?key=...`.
    ///
    /// Non-2xx statuses are returned as replies, not errors; only transport
    /// failures and timeouts come back as `Err`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> std::result::Result<RawReply, reqwest::Error> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            bare_model_id(model)
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.without_url())?;

        Ok(RawReply { status, body })
    }
}

/// Strip an optional `models/` prefix from a model identifier.
pub fn bare_model_id(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}
