//! Remote generative-language integration
//!
//! [`GenerationService`] is the seam between the pipeline and the remote
//! API: it takes one request and an ordered list of candidate models and
//! returns the first usable answer.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::{MockGenerationClient, MockResponse};

use crate::models::{Generation, GenerationRequest};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Try `candidates` in order, each bounded by `timeout`.
    async fn generate(
        &self,
        request: &GenerationRequest,
        candidates: &[String],
        timeout: Duration,
    ) -> Result<Generation>;
}
