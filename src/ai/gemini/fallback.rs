use super::client::{bare_model_id, GeminiHttpClient, RawReply};
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::GenerationService;
use crate::models::{Generation, GenerationRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

/// Why a candidate was passed over in favour of the next one.
#[derive(Debug, PartialEq)]
enum SkipReason {
    NotFound,
    NoContent,
    Malformed(String),
    Status(StatusCode),
    Network(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => f.write_str("model not found"),
            SkipReason::NoContent => f.write_str("response had no candidate content"),
            SkipReason::Malformed(e) => write!(f, "unparseable response: {}", e),
            SkipReason::Status(status) => write!(f, "unexpected status {}", status),
            SkipReason::Network(e) => write!(f, "network error: {}", e),
        }
    }
}

#[derive(Debug)]
enum Attempt {
    Answered(String),
    Skip(SkipReason),
    Abort(Error),
}

fn classify(model: &str, reply: RawReply) -> Attempt {
    match reply.status {
        StatusCode::OK => match serde_json::from_str::<GenerateContentResponse>(&reply.body) {
            Ok(response) => match response.first_text() {
                Some(text) => Attempt::Answered(text.to_string()),
                None => Attempt::Skip(SkipReason::NoContent),
            },
            Err(e) => Attempt::Skip(SkipReason::Malformed(e.to_string())),
        },
        StatusCode::NOT_FOUND => Attempt::Skip(SkipReason::NotFound),
        StatusCode::FORBIDDEN => Attempt::Abort(Error::PermissionDenied {
            model: model.to_string(),
        }),
        StatusCode::SERVICE_UNAVAILABLE => Attempt::Abort(Error::ServiceUnavailable {
            model: model.to_string(),
        }),
        StatusCode::TOO_MANY_REQUESTS => Attempt::Abort(Error::RateLimited {
            model: model.to_string(),
        }),
        other => Attempt::Skip(SkipReason::Status(other)),
    }
}

/// Gemini adapter that walks an ordered candidate list until one model answers.
///
/// Permission, quota and outage failures are account-wide and end the walk
/// immediately; everything else (404, empty or malformed 200, other
/// statuses, transport errors, timeouts) moves on to the next candidate.
pub struct GeminiClient {
    http: GeminiHttpClient,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn http(&self) -> &GeminiHttpClient {
        &self.http
    }

    pub async fn call(
        &self,
        request: &GenerationRequest,
        candidates: &[String],
        timeout: Duration,
    ) -> Result<Generation> {
        let body = GenerateContentRequest::from(request);

        for model in candidates {
            let model_id = bare_model_id(model);
            tracing::debug!("Requesting generateContent from {}", model_id);

            let attempt = match self.http.generate_content(model_id, &body, timeout).await {
                Ok(reply) => classify(model_id, reply),
                Err(e) => Attempt::Skip(SkipReason::Network(e.to_string())),
            };

            match attempt {
                Attempt::Answered(text) => {
                    tracing::info!("Gemini model {} answered ({} chars)", model_id, text.len());
                    return Ok(Generation {
                        text,
                        model: model_id.to_string(),
                    });
                }
                Attempt::Skip(reason) => {
                    tracing::warn!("Skipping Gemini model {}: {}", model_id, reason);
                }
                Attempt::Abort(err) => {
                    tracing::error!("Gemini model {} failed: {:?}", model_id, err.kind());
                    return Err(err);
                }
            }
        }

        Err(Error::AllModelsExhausted {
            attempted: candidates
                .iter()
                .map(|m| bare_model_id(m).to_string())
                .collect(),
        })
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
        candidates: &[String],
        timeout: Duration,
    ) -> Result<Generation> {
        self.call(request, candidates, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::error::ErrorKind;
    use std::time::Instant;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn make_client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key".to_string()).with_base_url(server.uri())
    }

    fn models(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|m| m.to_string()).collect()
    }

    fn reply(status: u16, body: &str) -> RawReply {
        RawReply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_classify_success() {
        let attempt = classify(
            "m",
            reply(
                200,
                r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#,
            ),
        );
        assert!(matches!(attempt, Attempt::Answered(text) if text == "hello"));
    }

    #[test]
    fn test_classify_soft_failures() {
        for body in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
        ] {
            assert!(matches!(
                classify("m", reply(200, body)),
                Attempt::Skip(SkipReason::NoContent)
            ));
        }
        assert!(matches!(
            classify("m", reply(200, "<html>")),
            Attempt::Skip(SkipReason::Malformed(_))
        ));
        assert!(matches!(
            classify("m", reply(404, "")),
            Attempt::Skip(SkipReason::NotFound)
        ));
        assert!(matches!(
            classify("m", reply(400, "")),
            Attempt::Skip(SkipReason::Status(StatusCode::BAD_REQUEST))
        ));
        assert!(matches!(
            classify("m", reply(500, "")),
            Attempt::Skip(SkipReason::Status(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }

    #[test]
    fn test_classify_short_circuits() {
        let kind = |status| match classify("m", reply(status, "")) {
            Attempt::Abort(err) => err.kind(),
            other => panic!("expected abort, got {:?}", other),
        };
        assert_eq!(kind(403), ErrorKind::PermissionDenied);
        assert_eq!(kind(503), ErrorKind::ServiceUnavailable);
        assert_eq!(kind(429), ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn test_first_success_stops_iteration() {
        let server = MockServer::start().await;
        test_support::mount_text(&server, "first", "from first", 1).await;
        test_support::mount_status(&server, "second", 200, 0).await;

        let result = make_client(&server)
            .call(
                &GenerationRequest::text("hi".to_string()),
                &models(&["first", "second"]),
                TIMEOUT,
            )
            .await
            .unwrap();

        assert_eq!(result.text, "from first");
        assert_eq!(result.model, "first");
    }

    #[tokio::test]
    async fn test_not_found_falls_through_to_next_model() {
        let server = MockServer::start().await;
        test_support::mount_status(&server, "gone", 404, 1).await;
        test_support::mount_text(&server, "alive", "described", 1).await;

        let result = make_client(&server)
            .call(
                &GenerationRequest::text("hi".to_string()),
                &models(&["gone", "alive"]),
                TIMEOUT,
            )
            .await
            .unwrap();

        assert_eq!(result.model, "alive");
    }

    #[tokio::test]
    async fn test_empty_candidates_fall_through() {
        let server = MockServer::start().await;
        test_support::mount_json(
            &server,
            "empty",
            serde_json::json!({ "candidates": [] }),
            1,
        )
        .await;
        test_support::mount_status(&server, "broken", 500, 1).await;
        test_support::mount_text(&server, "good", "ok", 1).await;

        let result = make_client(&server)
            .call(
                &GenerationRequest::text("hi".to_string()),
                &models(&["empty", "broken", "good"]),
                TIMEOUT,
            )
            .await
            .unwrap();

        assert_eq!(result.text, "ok");
    }

    #[tokio::test]
    async fn test_forbidden_short_circuits() {
        let server = MockServer::start().await;
        test_support::mount_status(&server, "a", 404, 1).await;
        test_support::mount_status(&server, "b", 403, 1).await;
        test_support::mount_text(&server, "c", "never", 0).await;

        let err = make_client(&server)
            .call(
                &GenerationRequest::text("hi".to_string()),
                &models(&["a", "b", "c"]),
                TIMEOUT,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PermissionDenied { ref model } if model == "b"));
    }

    #[tokio::test]
    async fn test_service_unavailable_and_rate_limit_short_circuit() {
        for (status, expected) in [
            (503, ErrorKind::ServiceUnavailable),
            (429, ErrorKind::RateLimited),
        ] {
            let server = MockServer::start().await;
            test_support::mount_status(&server, "a", status, 1).await;
            test_support::mount_text(&server, "b", "never", 0).await;

            let err = make_client(&server)
                .call(
                    &GenerationRequest::text("hi".to_string()),
                    &models(&["a", "b"]),
                    TIMEOUT,
                )
                .await
                .unwrap_err();

            assert_eq!(err.kind(), expected);
        }
    }

    #[tokio::test]
    async fn test_all_not_found_exhausts_in_order() {
        let server = MockServer::start().await;
        for id in ["x", "y", "z"] {
            test_support::mount_status(&server, id, 404, 1).await;
        }

        let err = make_client(&server)
            .call(
                &GenerationRequest::text("hi".to_string()),
                &models(&["x", "models/y", "z"]),
                TIMEOUT,
            )
            .await
            .unwrap_err();

        match err {
            Error::AllModelsExhausted { attempted } => {
                assert_eq!(attempted, vec!["x", "y", "z"]);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_candidate_list_makes_no_requests() {
        let server = MockServer::start().await;

        let err = make_client(&server)
            .call(&GenerationRequest::text("hi".to_string()), &[], TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AllModelsExhausted { ref attempted } if attempted.is_empty()));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timeouts_continue_until_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(600)))
            .mount(&server)
            .await;

        let per_call = Duration::from_millis(150);
        let started = Instant::now();
        let err = make_client(&server)
            .call(
                &GenerationRequest::text("hi".to_string()),
                &models(&["slow-a", "slow-b", "slow-c"]),
                per_call,
            )
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, Error::AllModelsExhausted { ref attempted } if attempted.len() == 3));
        assert!(elapsed >= per_call * 3, "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1800), "elapsed {:?}", elapsed);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_host_continues() {
        let client = GeminiClient::new("k".to_string()).with_base_url("http://127.0.0.1:1".to_string());

        let err = client
            .call(
                &GenerationRequest::text("hi".to_string()),
                &models(&["a", "b"]),
                Duration::from_secs(2),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AllModelsExhausted { ref attempted } if attempted.len() == 2));
    }

    #[tokio::test]
    async fn test_request_carries_generation_config_and_safety() {
        let server = MockServer::start().await;
        test_support::post_model("m")
            .and(body_string_contains("\"maxOutputTokens\":2048"))
            .and(body_string_contains("BLOCK_MEDIUM_AND_ABOVE"))
            .respond_with(test_support::text_response("ok"))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .call(
                &GenerationRequest::text("hi".to_string()),
                &models(&["m"]),
                TIMEOUT,
            )
            .await
            .unwrap();
    }
}
