use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::debug;

use crate::config::LLMConfig;
use crate::types::{AppError, AppResult, LLMMessage, LLMProvider, LLMRequest, LLMResponse};

/// Incremental model output: a finite, non-restartable sequence of text
/// fragments that concatenate to the final text in delivery order.
pub type FragmentStream = BoxStream<'static, AppResult<String>>;

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;

    async fn create_chat_completion_stream(&self, request: &LLMRequest) -> AppResult<FragmentStream>;
}

/// Everything needed to build a provider adapter.
pub struct LLMProviderConfig {
    pub provider: LLMProvider,
    pub api_key: String,
    pub api_base: Option<String>,
    pub timeout: Duration,
}

/// Model client handle shared by every stage chain.
///
/// Cloning is cheap; the adapter (and its HTTP connection pool) is shared.
#[derive(Clone)]
pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    provider_name: String,
    model: String,
    temperature: Option<f32>,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig, model: impl Into<String>) -> AppResult<Self> {
        if provider.api_key.is_empty() {
            return Err(AppError::InvalidRequest(format!(
                "No API key configured for LLM provider {}",
                provider.provider
            )));
        }

        let adapter: Arc<dyn LLMAdapter> = match provider.provider {
            LLMProvider::Google => Arc::new(crate::llm::google::GoogleAdapter::new(
                &provider.api_key,
                provider.api_base.as_deref(),
                provider.timeout,
            )?),
            LLMProvider::OpenAI | LLMProvider::Groq | LLMProvider::OpenRouter => {
                let base = provider
                    .api_base
                    .as_deref()
                    .unwrap_or_else(|| crate::llm::openai::default_api_base(&provider.provider));
                Arc::new(crate::llm::openai::OpenAIAdapter::new_with_api_base(
                    &provider.api_key,
                    base,
                    provider.timeout,
                )?)
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.provider.to_string(),
            model: model.into(),
            temperature: None,
        })
    }

    pub fn from_config(config: &LLMConfig) -> AppResult<Self> {
        let provider = LLMProvider::parse(&config.provider).ok_or_else(|| {
            AppError::InvalidRequest(format!("Unsupported LLM provider: {}", config.provider))
        })?;

        let llm = Self::new(
            LLMProviderConfig {
                provider,
                api_key: config.api_key.clone(),
                api_base: config.api_base.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
            },
            config.model.clone(),
        )?;
        Ok(llm.with_temperature(config.temperature))
    }

    /// Wrap an already-built adapter, e.g. a scripted one in tests.
    pub fn from_adapter(adapter: Arc<dyn LLMAdapter>, model: impl Into<String>) -> Self {
        Self {
            adapter,
            provider_name: "custom".to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, prompt: &str) -> LLMRequest {
        LLMRequest {
            model: self.model.clone(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: None,
            temperature: self.temperature,
        }
    }

    /// One-shot call: the whole completion text.
    pub async fn complete(&self, prompt: &str) -> AppResult<String> {
        let response = self.adapter.create_chat_completion(&self.request(prompt)).await?;
        debug!(
            provider = %self.provider_name,
            model = %self.model,
            total_tokens = response.usage.total_tokens,
            finish_reason = %response.finish_reason,
            "Completion received"
        );
        Ok(response.content)
    }

    /// Incremental call: fragments as the provider produces them.
    pub async fn stream(&self, prompt: &str) -> AppResult<FragmentStream> {
        self.adapter.create_chat_completion_stream(&self.request(prompt)).await
    }
}

pub(crate) fn http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}
