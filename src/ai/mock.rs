use super::GenerationService;
use crate::error::ErrorKind;
use crate::models::{Generation, GenerationRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome for one [`MockGenerationClient`] call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    Fail(ErrorKind),
}

/// What the mock was asked to do on one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub had_image: bool,
    pub candidates: Vec<String>,
}

#[derive(Clone)]
pub struct MockGenerationClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text_response(self, text: String) -> Self {
        self.responses.lock().unwrap().push(MockResponse::Text(text));
        self
    }

    pub fn with_failure(self, kind: ErrorKind) -> Self {
        self.responses.lock().unwrap().push(MockResponse::Fail(kind));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn error_for(kind: ErrorKind, candidates: &[String]) -> Error {
        let model = candidates.first().cloned().unwrap_or_default();
        match kind {
            ErrorKind::PermissionDenied => Error::PermissionDenied { model },
            ErrorKind::ServiceUnavailable => Error::ServiceUnavailable { model },
            ErrorKind::RateLimited => Error::RateLimited { model },
            ErrorKind::AllModelsExhausted => Error::AllModelsExhausted {
                attempted: candidates.to_vec(),
            },
            ErrorKind::InvalidUpload => Error::InvalidUpload("mock failure".to_string()),
            ErrorKind::Decode => Error::Decode(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )),
            ErrorKind::Network | ErrorKind::Unexpected => {
                Error::Unexpected("Mock failure".to_string())
            }
        }
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
        candidates: &[String],
        _timeout: Duration,
    ) -> Result<Generation> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                prompt: request.prompt.clone(),
                had_image: request.image.is_some(),
                candidates: candidates.to_vec(),
            });
            calls.len()
        };

        let model = candidates
            .first()
            .cloned()
            .unwrap_or_else(|| "mock-model".to_string());

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            return Ok(Generation {
                text: format!("Mock generation for: {}", request.prompt),
                model,
            });
        }

        let index = (count - 1) % responses.len();
        match &responses[index] {
            MockResponse::Text(text) => Ok(Generation {
                text: text.clone(),
                model,
            }),
            MockResponse::Fail(kind) => Err(Self::error_for(*kind, candidates)),
        }
    }
}
