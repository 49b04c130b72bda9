use crate::{
    config::GeminiConfig,
    error::{MemeError, Result},
    models::{Candidate, ContentRequest, ContentResponse, Modality, Part, UploadedImage},
    traits::ImageGenerator,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    inline_data: Option<WireInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    response_modalities: Vec<Modality>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    #[serde(default)]
    prompt_feedback: Option<WirePromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorEnvelope {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn to_wire(request: &ContentRequest) -> GenerateContentRequest {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => WirePart {
                text: Some(text.clone()),
                inline_data: None,
            },
            Part::Image(image) => WirePart {
                text: None,
                inline_data: Some(WireInlineData {
                    mime_type: image.mime_type().to_string(),
                    data: image.to_base64(),
                }),
            },
        })
        .collect();

    GenerateContentRequest {
        contents: vec![WireContent {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: WireGenerationConfig {
            response_modalities: request.response_modalities.clone(),
        },
    }
}

fn from_wire(response: GenerateContentResponse) -> ContentResponse {
    let mut candidates = Vec::with_capacity(response.candidates.len());

    for candidate in response.candidates {
        if let Some(reason) = &candidate.finish_reason {
            log::debug!("Candidate finish reason: {}", reason);
        }

        let mut parts = Vec::new();
        for part in candidate.content.unwrap_or_default().parts {
            if let Some(inline) = part.inline_data {
                if inline.data.is_empty() || inline.mime_type.is_empty() {
                    continue;
                }
                match UploadedImage::from_base64(&inline.data, inline.mime_type) {
                    Ok(image) => parts.push(Part::Image(image)),
                    Err(e) => log::warn!("⚠️  Skipping undecodable inline image: {}", e),
                }
            } else if let Some(text) = part.text {
                parts.push(Part::Text(text));
            }
        }
        candidates.push(Candidate { parts });
    }

    ContentResponse {
        candidates,
        block_reason: response.prompt_feedback.and_then(|f| f.block_reason),
    }
}

fn describe_http_failure(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<WireErrorEnvelope>(body) {
        Ok(envelope) => format!(
            "{} - {} {}",
            status,
            envelope.error.status.unwrap_or_default(),
            envelope.error.message
        )
        .trim_end()
        .to_string(),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{} - {}", status, body.trim()),
    }
}

#[derive(Clone)]
pub struct GeminiImageClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiImageClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| MemeError::ConfigError("Gemini API key is required".into()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MemeError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    async fn generate_content(&self, request: ContentRequest) -> Result<ContentResponse> {
        let payload = to_wire(&request);

        log::info!("Invoking model: {}", self.model);
        log::debug!(
            "generateContent request: {} part(s), {} image(s)",
            request.parts.len(),
            request.images().count()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini transport error: {:?}", e);
                MemeError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::error!("Gemini returned HTTP {}", status);
            return Err(MemeError::ApiError(describe_http_failure(status, &body)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| MemeError::ResponseError(format!("unexpected response body: {}", e)))?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            log::warn!("Prompt was blocked by Gemini: {}", reason);
        }

        Ok(from_wire(parsed))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = ContentRequest::new("make it funny")
            .with_image(UploadedImage::new(b"abc".to_vec(), "image/jpeg"));
        let value = serde_json::to_value(to_wire(&request)).unwrap();

        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "make it funny" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "YWJj" } }
                    ]
                }],
                "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] }
            })
        );
    }

    #[test]
    fn test_parses_image_and_text_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Here is your meme" },
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw==" } }
                    ]
                },
                "finishReason": "STOP"
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let response = from_wire(parsed);

        let image = response.first_image().unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.data(), &[0x89, b'P', b'N', b'G']);
        assert_eq!(response.text().as_deref(), Some("Here is your meme"));
    }

    #[test]
    fn test_parses_blocked_prompt() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let parsed: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let response = from_wire(parsed);
        assert!(response.first_image().is_none());
        assert_eq!(response.block_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_skips_corrupt_image_part() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "not base64!!" } },
                { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/" } }
            ]}}]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let response = from_wire(parsed);

        let image = response.first_image().unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.data(), &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_only_corrupt_parts_yield_no_image() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "not base64!!" } }
            ]}}]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert!(from_wire(parsed).first_image().is_none());
    }

    #[test]
    fn test_describe_http_failure() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let message = describe_http_failure(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(message.contains("400"));
        assert!(message.contains("API key not valid."));

        let plain = describe_http_failure(reqwest::StatusCode::BAD_GATEWAY, "");
        assert!(plain.contains("502"));
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(GeminiImageClient::new(&GeminiConfig::new()).is_err());

        let client = GeminiImageClient::new(
            &GeminiConfig::new()
                .with_api_key("test-key")
                .with_base_url("http://localhost:9999/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash-image-preview:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-2.5-flash-image-preview");
    }
}
