//! Orchestration of the two sequential calls: describe the image, then write
//! the content package from that description.

use crate::ai::{GeminiClient, GenerationService};
use crate::image::normalize_blocking;
use crate::models::{Config, ContentPackage, Generation, GenerationRequest, UploadedImage};
use crate::{prompts, Result};
use std::time::Duration;
use tracing::info;

/// Candidate lists and timeout shared by every pipeline call.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub vision_models: Vec<String>,
    pub content_models: Vec<String>,
    pub timeout: Duration,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            vision_models: config.vision_models.clone(),
            content_models: config.content_models.clone(),
            timeout: config.request_timeout,
        }
    }
}

pub struct SparkPipeline {
    service: Box<dyn GenerationService>,
    settings: PipelineSettings,
}

impl SparkPipeline {
    /// Build a pipeline backed by the real Gemini API.
    pub fn new(config: &Config) -> Self {
        let client =
            GeminiClient::new(config.api_key.clone()).with_base_url(config.base_url.clone());
        Self::with_service(Box::new(client), PipelineSettings::from(config))
    }

    /// Build a pipeline around any [`GenerationService`], e.g. a mock.
    pub fn with_service(service: Box<dyn GenerationService>, settings: PipelineSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn describe_image(&self, upload: UploadedImage) -> Result<Generation> {
        let payload = normalize_blocking(upload).await?;
        info!("Requesting image description ({})", payload.mime_type);

        let request = GenerationRequest::vision(prompts::build_vision_prompt(), payload);
        self.service
            .generate(&request, &self.settings.vision_models, self.settings.timeout)
            .await
    }

    pub async fn generate_content(&self, description: &str) -> Result<Generation> {
        info!("Requesting content package");

        let request = GenerationRequest::text(prompts::build_content_prompt(description));
        self.service
            .generate(&request, &self.settings.content_models, self.settings.timeout)
            .await
    }

    /// Description first; the content call is only made once it succeeds.
    pub async fn run(&self, upload: UploadedImage) -> Result<ContentPackage> {
        let description = self.describe_image(upload).await?;
        let content = self.generate_content(&description.text).await?;

        Ok(ContentPackage {
            description,
            content,
        })
    }
}
