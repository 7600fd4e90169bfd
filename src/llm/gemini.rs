use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{GenerateRequest, GenerateResponse, ModelDescriptor, Provider};
use crate::secrets::Secret;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const GENERATE_CONTENT_METHOD: &str = "generateContent";

pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn headers(api_key: &Secret) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key.expose())
                .map_err(|e| anyhow::anyhow!("invalid API key header: {e}"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Turns a non-success response into an error whose text carries the HTTP
/// status code, so callers can classify rate limiting by the "429" marker.
async fn error_from_response(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let error_body = response.text().await.unwrap_or_default();
    if let Ok(err) = serde_json::from_str::<GeminiError>(&error_body) {
        return anyhow::anyhow!("Gemini API error ({}): {}", status, err.error.message);
    }
    anyhow::anyhow!("Gemini API error ({}): {}", status, error_body)
}

#[async_trait::async_trait]
impl Provider for GeminiProvider {
    async fn list_models(&self, api_key: &Secret) -> anyhow::Result<Vec<ModelDescriptor>> {
        let mut descriptors = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/v1beta/models", self.base_url))
                .headers(Self::headers(api_key)?)
                .query(&[("pageSize", "1000")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }

            let page: ListModelsResponse = response.json().await?;
            descriptors.extend(page.models.into_iter().map(|m| ModelDescriptor {
                capable: m
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == GENERATE_CONTENT_METHOD),
                id: m.name,
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(descriptors)
    }

    async fn generate(
        &self,
        api_key: &Secret,
        req: &GenerateRequest,
    ) -> anyhow::Result<GenerateResponse> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: req.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: req.temperature,
                max_output_tokens: req.max_output_tokens,
            },
        };

        // Model ids from the listing already carry the "models/" prefix.
        let response = self
            .client
            .post(format!(
                "{}/v1beta/{}:generateContent",
                self.base_url, req.model
            ))
            .headers(Self::headers(api_key)?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let resp: GeminiResponse = response.json().await?;

        let first = resp.candidates.into_iter().next();
        let content = first
            .as_ref()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let (input_tokens, output_tokens) = match &resp.usage_metadata {
            Some(usage) => (usage.prompt_token_count, usage.candidates_token_count),
            None => (0, 0),
        };

        Ok(GenerateResponse {
            content,
            model: resp.model_version.unwrap_or_else(|| req.model.clone()),
            input_tokens,
            output_tokens,
            finish_reason: first.and_then(|c| c.finish_reason).unwrap_or_default(),
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_models_response_deserialize() {
        let json = r#"{
            "models": [
                {
                    "name": "models/gemini-1.5-flash",
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                },
                {
                    "name": "models/embedding-001",
                    "supportedGenerationMethods": ["embedContent"]
                }
            ],
            "nextPageToken": "tok-2"
        }"#;
        let resp: ListModelsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.models.len(), 2);
        assert_eq!(resp.models[0].name, "models/gemini-1.5-flash");
        assert!(
            resp.models[0]
                .supported_generation_methods
                .iter()
                .any(|m| m == GENERATE_CONTENT_METHOD)
        );
        assert_eq!(resp.next_page_token.as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_list_models_response_missing_methods() {
        let json = r#"{"models": [{"name": "models/aqa"}]}"#;
        let resp: ListModelsResponse = serde_json::from_str(json).unwrap();
        assert!(resp.models[0].supported_generation_methods.is_empty());
        assert!(resp.next_page_token.is_none());
    }

    #[test]
    fn test_generate_response_deserialize() {
        let json = r####"{
            "candidates": [
                {
                    "content": {"parts": [{"text": "### 1. 기업 개요"}, {"text": "\n* 내용"}]},
                    "finishReason": "STOP"
                }
            ],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 840},
            "modelVersion": "gemini-1.5-flash-002"
        }"####;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let candidate = &resp.candidates[0];
        let text: String = candidate
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "### 1. 기업 개요\n* 내용");
        assert_eq!(candidate.finish_reason.as_deref(), Some("STOP"));
        let usage = resp.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 120);
        assert_eq!(usage.candidates_token_count, 840);
    }

    #[test]
    fn test_error_body_deserialize() {
        let json = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err: GeminiError = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.message, "Resource has been exhausted");
    }

    #[test]
    fn test_request_body_serializes_camel_case() {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: "prompt".to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.5,
                max_output_tokens: 8192,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = GeminiProvider::new("http://localhost:9090/");
        assert_eq!(provider.base_url, "http://localhost:9090");
    }
}
