// Google Gemini adapter (Generative Language API, v1beta)
// Blocking calls use `:generateContent`, incremental calls use
// `:streamGenerateContent?alt=sse`.

use std::time::Duration;

use async_trait::async_trait;
use futures::{future, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::provider::{http_client, FragmentStream, LLMAdapter};
use crate::llm::sse;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleAdapter {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: GoogleError,
}

#[derive(Deserialize)]
struct GoogleError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GoogleAdapter {
    pub fn new(api_key: &str, api_base: Option<&str>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.to_string(),
            api_base: api_base
                .unwrap_or(GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Assistant turns are called `model` on the Gemini side.
    fn body(request: &LLMRequest) -> GenerateRequest {
        let contents = request
            .messages
            .iter()
            .map(|message| Content {
                role: Some(if message.role == "assistant" { "model" } else { "user" }.to_string()),
                parts: vec![Part {
                    text: Some(message.content.clone()),
                }],
            })
            .collect();

        GenerateRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    async fn post(&self, url: &str, body: &GenerateRequest) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(AppError::LLMApi(format!(
                    "Gemini API error ({}): {} (status: {:?})",
                    status, error_response.error.message, error_response.error.status
                )));
            }
            return Err(AppError::LLMApi(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl LLMAdapter for GoogleAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let url = format!("{}/models/{}:generateContent", self.api_base, request.model);
        let response = self.post(&url, &Self::body(request)).await?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to parse Gemini response: {}", e)))?;

        if parsed.candidates.is_empty() {
            return Err(AppError::LLMApi("Gemini returned no candidates".to_string()));
        }

        let usage = parsed
            .usage_metadata
            .as_ref()
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content: parsed.text(),
            finish_reason: parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "STOP".to_string()),
            usage,
        })
    }

    async fn create_chat_completion_stream(&self, request: &LLMRequest) -> AppResult<FragmentStream> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.api_base, request.model
        );
        let response = self.post(&url, &Self::body(request)).await?;

        let fragments = sse::data_payloads(response)
            .and_then(|payload| {
                future::ready(
                    serde_json::from_str::<GenerateResponse>(&payload)
                        .map(|chunk| chunk.text())
                        .map_err(|e| AppError::LLMApi(format!("Failed to parse Gemini chunk: {}", e))),
                )
            })
            .try_filter(|text| future::ready(!text.is_empty()))
            .boxed();

        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LLMMessage;
    use mockito::Matcher;

    fn request() -> LLMRequest {
        LLMRequest {
            model: "gemini-test".to_string(),
            messages: vec![LLMMessage::user("hi")],
            max_tokens: Some(256),
            temperature: Some(0.0),
        }
    }

    #[test]
    fn test_body_maps_roles_and_config() {
        let body = GoogleAdapter::body(&request());
        assert_eq!(body.contents.len(), 1);
        assert_eq!(body.contents[0].role.as_deref(), Some("user"));
        assert_eq!(body.contents[0].parts[0].text.as_deref(), Some("hi"));

        let json = serde_json::to_value(GoogleAdapter::body(&request())).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);
    }

    #[tokio::test]
    async fn test_generate_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "g-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"gen"},{"text":"eric"}]},"finishReason":"STOP"}],
                    "usageMetadata":{"promptTokenCount":5,"candidatesTokenCount":2,"totalTokenCount":7}}"#,
            )
            .create_async()
            .await;

        let adapter = GoogleAdapter::new("g-key", Some(&server.url()), Duration::from_secs(5)).unwrap();
        let response = adapter.create_chat_completion(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "generic");
        assert_eq!(response.usage.total_tokens, 7);
    }

    #[tokio::test]
    async fn test_stream_generate_content() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hello\"}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\", world\"}]},\"finishReason\":\"STOP\"}]}\r\n\r\n",
        );
        server
            .mock("POST", "/models/gemini-test:streamGenerateContent")
            .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let adapter = GoogleAdapter::new("g-key", Some(&server.url()), Duration::from_secs(5)).unwrap();
        let fragments: Vec<String> = adapter
            .create_chat_completion_stream(&request())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(fragments.concat(), "Hello, world");
        assert_eq!(fragments.len(), 2);
    }
}
