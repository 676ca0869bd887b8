//! Veo (Google) backend over the Gemini Developer API.

use crate::error::{parse_retry_after, sanitize_error_message, Result, StoryReelError};
use crate::remote::backend::VideoBackend;
use crate::remote::types::{GenerationOptions, GenerationPayload, OperationSnapshot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Veo model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VeoModel {
    /// Veo 3.0 Preview.
    #[default]
    Veo30Preview,
}

impl VeoModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo30Preview => "veo-3.0-generate-preview",
        }
    }
}

impl std::str::FromStr for VeoModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "veo-3.0-generate-preview" => Ok(Self::Veo30Preview),
            other => Err(format!("unknown Veo model: {other}")),
        }
    }
}

/// Builder for [`VeoClient`].
#[derive(Debug, Clone, Default)]
pub struct VeoClientBuilder {
    api_key: Option<String>,
    model: VeoModel,
}

impl VeoClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to the `GEMINI_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Veo model variant.
    pub fn model(mut self, model: VeoModel) -> Self {
        self.model = model;
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<VeoClient> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GEMINI_KEY").ok())
            .ok_or_else(|| {
                StoryReelError::Auth("GEMINI_KEY not set and no API key provided".into())
            })?;

        Ok(VeoClient {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
        })
    }
}

/// Veo video generation client.
///
/// Submits prompts to the `predictLongRunning` endpoint and normalizes
/// operation responses into [`OperationSnapshot`]s.
pub struct VeoClient {
    client: reqwest::Client,
    api_key: String,
    model: VeoModel,
}

impl VeoClient {
    /// Creates a new [`VeoClientBuilder`].
    pub fn builder() -> VeoClientBuilder {
        VeoClientBuilder::new()
    }

    fn parse_error(&self, status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> StoryReelError {
        let text = sanitize_error_message(text);
        if status == 429 {
            let retry_after = parse_retry_after(headers).map(Duration::from_secs);
            return StoryReelError::RateLimited { retry_after };
        }
        if status == 401 || status == 403 {
            return StoryReelError::Auth(text);
        }
        StoryReelError::Api {
            status,
            message: text,
        }
    }
}

#[async_trait]
impl VideoBackend for VeoClient {
    async fn start(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            BASE_URL,
            self.model.as_str(),
        );
        let body = VeoRequest::new(prompt, options);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let operation: VeoOperationResponse = response.json().await?;
        match operation.name {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(StoryReelError::Submission(
                "submission response carried no operation name".into(),
            )),
        }
    }

    async fn poll(&self, handle: &str) -> Result<OperationSnapshot> {
        let url = format!("{}/{}", BASE_URL, handle);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let operation: VeoOperationResponse = response.json().await?;
        operation.into_snapshot()
    }
}

// ── Request wire format ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoRequest {
    instances: Vec<VeoInstance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<VeoParameters>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
}

impl VeoRequest {
    fn new(prompt: &str, options: &GenerationOptions) -> Self {
        let parameters = options
            .negative_prompt
            .as_ref()
            .map(|negative_prompt| VeoParameters {
                negative_prompt: Some(negative_prompt.clone()),
            });

        Self {
            instances: vec![VeoInstance {
                prompt: prompt.to_string(),
            }],
            parameters,
        }
    }
}

// ── Response wire format ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct VeoOperationResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    response: Option<VeoVideoResponse>,
    #[serde(default)]
    error: Option<VeoError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoVideoResponse {
    #[serde(default)]
    generate_video_response: Option<VeoGenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoGenerateVideoResponse {
    /// Newer responses use `generatedSamples`, older ones `generatedVideos`.
    #[serde(default, alias = "generatedVideos")]
    generated_samples: Option<Vec<VeoGeneratedSample>>,
}

#[derive(Debug, Deserialize)]
struct VeoGeneratedSample {
    #[serde(default)]
    video: Option<VeoVideo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoVideo {
    #[serde(default)]
    uri: Option<String>,
    /// Inline base64-encoded video data.
    #[serde(default, alias = "bytesBase64Encoded")]
    video_bytes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VeoError {
    #[serde(default)]
    message: Option<String>,
}

impl VeoOperationResponse {
    /// Collapse the provider operation shape into a normalized snapshot.
    fn into_snapshot(self) -> Result<OperationSnapshot> {
        let done = self.done.unwrap_or(false);

        if let Some(err) = self.error {
            return Ok(OperationSnapshot {
                done,
                result: None,
                error: Some(err.message.unwrap_or_else(|| "unknown remote error".into())),
            });
        }

        let video = self
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples)
            .and_then(|samples| samples.into_iter().next())
            .and_then(|sample| sample.video);

        let result = match video {
            Some(video) => {
                let inline_bytes = match video.video_bytes {
                    Some(b64) => {
                        use base64::Engine;
                        let bytes = base64::engine::general_purpose::STANDARD
                            .decode(&b64)
                            .map_err(|e| {
                                StoryReelError::Decode(format!("inline video data: {e}"))
                            })?;
                        Some(bytes)
                    }
                    None => None,
                };
                Some(GenerationPayload {
                    inline_bytes,
                    reference_uri: video.uri,
                })
            }
            None => None,
        };

        Ok(OperationSnapshot {
            done,
            result,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_as_str() {
        assert_eq!(VeoModel::Veo30Preview.as_str(), "veo-3.0-generate-preview");
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!(
            "veo-3.0-generate-preview".parse::<VeoModel>().unwrap(),
            VeoModel::Veo30Preview
        );
        assert!("veo-99".parse::<VeoModel>().is_err());
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let client = VeoClientBuilder::new().api_key("test-key").build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_builder_requires_api_key() {
        if std::env::var("GEMINI_KEY").is_err() {
            let result = VeoClientBuilder::new().build();
            assert!(matches!(result, Err(StoryReelError::Auth(_))));
        }
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let options = GenerationOptions::new().with_negative_prompt("barking, woofing");
        let body = VeoRequest::new("A dragon over mountains", &options);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["instances"][0]["prompt"], "A dragon over mountains");
        assert_eq!(json["parameters"]["negativePrompt"], "barking, woofing");
    }

    #[test]
    fn test_request_omits_parameters_without_options() {
        let body = VeoRequest::new("A dragon", &GenerationOptions::new());
        let json = serde_json::to_value(&body).unwrap();

        assert!(json.get("parameters").is_none() || json["parameters"].is_null());
    }

    #[test]
    fn test_snapshot_pending() {
        let json = r#"{"name": "operations/abc123", "done": false}"#;
        let resp: VeoOperationResponse = serde_json::from_str(json).unwrap();
        let snapshot = resp.into_snapshot().unwrap();

        assert!(!snapshot.done);
        assert!(snapshot.result.is_none());
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_snapshot_done_with_uri() {
        let json = r#"{
            "name": "operations/abc123",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{
                        "video": {"uri": "https://example.com/video.mp4"}
                    }]
                }
            }
        }"#;
        let resp: VeoOperationResponse = serde_json::from_str(json).unwrap();
        let snapshot = resp.into_snapshot().unwrap();

        assert!(snapshot.done);
        let payload = snapshot.result.unwrap();
        assert!(payload.inline_bytes.is_none());
        assert_eq!(
            payload.reference_uri.as_deref(),
            Some("https://example.com/video.mp4")
        );
    }

    #[test]
    fn test_snapshot_done_with_inline_bytes() {
        let json = r#"{
            "name": "operations/abc123",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{
                        "video": {"videoBytes": "AQID"}
                    }]
                }
            }
        }"#;
        let resp: VeoOperationResponse = serde_json::from_str(json).unwrap();
        let snapshot = resp.into_snapshot().unwrap();

        assert!(snapshot.done);
        let payload = snapshot.result.unwrap();
        assert_eq!(payload.inline_bytes, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_snapshot_accepts_generated_videos_alias() {
        let json = r#"{
            "name": "operations/abc123",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedVideos": [{
                        "video": {"uri": "https://example.com/video.mp4"}
                    }]
                }
            }
        }"#;
        let resp: VeoOperationResponse = serde_json::from_str(json).unwrap();
        let snapshot = resp.into_snapshot().unwrap();

        assert!(snapshot.result.is_some());
    }

    #[test]
    fn test_snapshot_with_remote_error() {
        let json = r#"{
            "name": "operations/abc123",
            "done": true,
            "error": {"message": "Quota exceeded"}
        }"#;
        let resp: VeoOperationResponse = serde_json::from_str(json).unwrap();
        let snapshot = resp.into_snapshot().unwrap();

        assert!(snapshot.done);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.error.as_deref(), Some("Quota exceeded"));
    }

    #[test]
    fn test_snapshot_bad_base64_is_decode_error() {
        let json = r#"{
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{
                        "video": {"videoBytes": "!!not-base64!!"}
                    }]
                }
            }
        }"#;
        let resp: VeoOperationResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            resp.into_snapshot(),
            Err(StoryReelError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_error_maps_status_codes() {
        let client = VeoClientBuilder::new().api_key("test-key").build().unwrap();
        let headers = reqwest::header::HeaderMap::new();

        assert!(matches!(
            client.parse_error(401, "bad key", &headers),
            StoryReelError::Auth(_)
        ));
        assert!(matches!(
            client.parse_error(429, "slow down", &headers),
            StoryReelError::RateLimited { .. }
        ));
        assert!(matches!(
            client.parse_error(500, "boom", &headers),
            StoryReelError::Api { status: 500, .. }
        ));
    }
}
