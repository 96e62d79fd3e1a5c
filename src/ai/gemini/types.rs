//! Gemini `generateContent` wire types.

use crate::models::{GenerationConfig, GenerationRequest, SafetySetting};
use serde::{Deserialize, Serialize};

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Untagged union of text and inline media content parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Other(serde_json::Value),
}

/// Base64 inline payload used for image/vision requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    /// Bare single-prompt request with no config or safety overrides.
    pub fn prompt_only(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part::Text { text: prompt }],
            }],
            generation_config: None,
            safety_settings: Vec::new(),
        }
    }
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];
        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.as_str().to_string(),
                    data: image.data.clone(),
                },
            });
        }

        Self {
            contents: vec![Content { role: None, parts }],
            generation_config: Some(request.generation_config),
            safety_settings: request.safety_settings.clone(),
        }
    }
}

/// Top-level `generateContent` response envelope.
///
/// Every field is optional: a 200 without candidates is a soft failure,
/// not a parse error.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate completion item returned by Gemini.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, if it has content with a text part.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| {
                content.parts.iter().find_map(|p| match p {
                    Part::Text { text } => Some(text.as_str()),
                    _ => None,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MimeType, NormalizedPayload};

    #[test]
    fn test_vision_request_wire_format() {
        let request = GenerationRequest::vision(
            "describe".to_string(),
            NormalizedPayload {
                mime_type: MimeType::Jpeg,
                data: "QUJD".to_string(),
            },
        );
        let json = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "QUJD");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
        assert!(json["contents"][0].get("role").is_none());
    }

    #[test]
    fn test_prompt_only_request_omits_optional_sections() {
        let json =
            serde_json::to_value(GenerateContentRequest::prompt_only("hi".to_string())).unwrap();
        assert!(json.get("generationConfig").is_none());
        assert!(json.get("safetySettings").is_none());
    }

    #[test]
    fn test_first_text_skips_non_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "AA==" } },
                        { "text": "hello" }
                    ]
                }
            }]
        }))
        .unwrap();
        assert_eq!(response.first_text(), Some("hello"));
    }

    #[test]
    fn test_missing_candidates_and_content_parse() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "promptFeedback": {} })).unwrap();
        assert!(response.first_text().is_none());

        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert!(response.first_text().is_none());
    }

    #[test]
    fn test_unknown_part_shapes_are_tolerated() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "thought": true }, { "text": "ok" }] }
            }]
        }))
        .unwrap();
        assert_eq!(response.first_text(), Some("ok"));
    }
}
