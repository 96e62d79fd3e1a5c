//! Data models and structures
//!
//! Request-scoped values that flow between the upload boundary, the image
//! normalizer and the Gemini adapter, plus the process configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Raw bytes received from the user, before normalization.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Accept an upload, rejecting file names outside jpg/jpeg/png.
    pub fn new(file_name: Option<String>, bytes: Vec<u8>) -> Result<Self> {
        if let Some(name) = &file_name {
            let accepted = Path::new(name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if !accepted {
                return Err(Error::UnsupportedUpload(name.clone()));
            }
        }

        if bytes.is_empty() {
            return Err(Error::InvalidUpload("the uploaded file is empty".to_string()));
        }

        Ok(Self { file_name, bytes })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Self::new(file_name, bytes)
    }
}

/// The only inline formats the Gemini API accepts from us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Re-encoded image ready to be sent as inline data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPayload {
    pub mime_type: MimeType,
    /// Standard base64 of the re-encoded bytes.
    pub data: String,
}

impl NormalizedPayload {
    pub fn decode_data(&self) -> Result<Vec<u8>> {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| Error::Unexpected(format!("Invalid base64 payload: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: BlockThreshold::BlockMediumAndAbove,
    })
    .collect()
}

/// Provider-neutral description of one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<NormalizedPayload>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerationRequest {
    /// Describe-an-image request: prompt followed by the inline image.
    pub fn vision(prompt: String, image: NormalizedPayload) -> Self {
        Self {
            prompt,
            image: Some(image),
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 1024,
            },
            safety_settings: default_safety_settings(),
        }
    }

    pub fn text(prompt: String) -> Self {
        Self {
            prompt,
            image: None,
            generation_config: GenerationConfig {
                temperature: 0.8,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 2048,
            },
            safety_settings: default_safety_settings(),
        }
    }
}

/// Successful generation and the candidate model that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub text: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentPackage {
    pub description: Generation,
    pub content: Generation,
}

// Configuration
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_VISION_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro",
    "gemini-pro-vision",
];
pub const DEFAULT_CONTENT_MODELS: &[&str] =
    &["gemini-2.0-flash", "gemini-2.5-flash", "gemini-2.5-pro"];
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
const DEFAULT_MAX_UPLOAD_MB: usize = 200;

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub vision_models: Vec<String>,
    pub content_models: Vec<String>,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("vision_models", &self.vision_models)
            .field("content_models", &self.content_models)
            .field("request_timeout", &self.request_timeout)
            .field("bind_addr", &self.bind_addr)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY is not set".to_string()))?;

        let base_url = lookup("GEMINI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let vision_models = lookup("VISION_MODELS")
            .map(|list| parse_model_list(&list))
            .unwrap_or_else(|| to_owned_list(DEFAULT_VISION_MODELS));
        let content_models = lookup("CONTENT_MODELS")
            .map(|list| parse_model_list(&list))
            .unwrap_or_else(|| to_owned_list(DEFAULT_CONTENT_MODELS));

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("REQUEST_TIMEOUT_SECS must be a number, got '{}'", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("BIND_ADDR is not a socket address: {}", e)))?;

        let max_upload_mb = match lookup("MAX_UPLOAD_MB") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::Config(format!("MAX_UPLOAD_MB must be a number, got '{}'", raw))
            })?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        Ok(Self {
            api_key,
            base_url,
            vision_models,
            content_models,
            request_timeout: Duration::from_secs(timeout_secs),
            bind_addr,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_owned_list(models: &[&str]) -> Vec<String> {
    models.iter().map(|m| m.to_string()).collect()
}
