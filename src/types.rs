// Type definitions shared across the service

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum LLMProvider {
    Google,
    OpenAI,
    Groq,
    OpenRouter,
}

impl LLMProvider {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" | "gemini" => Some(LLMProvider::Google),
            "openai" => Some(LLMProvider::OpenAI),
            "groq" => Some(LLMProvider::Groq),
            "openrouter" => Some(LLMProvider::OpenRouter),
            _ => None,
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Google => write!(f, "google"),
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Groq => write!(f, "groq"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user" or "assistant"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transport or protocol failure talking to a model provider.
    #[error("LLM API error: {0}")]
    LLMApi(String),

    /// A named stage could not get usable output from the model.
    #[error("{stage} stage failed: {message}")]
    ModelInvocation { stage: &'static str, message: String },

    /// The query executor rejected or failed to run the generated SQL.
    #[error("Query execution failed on datasource '{datasource}': {message}\nSQL: {sql}")]
    Execution {
        sql: String,
        datasource: String,
        message: String,
    },

    #[error("Executor error: {0}")]
    Executor(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", e))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert!(matches!(LLMProvider::parse("Gemini"), Some(LLMProvider::Google)));
        assert!(matches!(LLMProvider::parse(" openai "), Some(LLMProvider::OpenAI)));
        assert!(LLMProvider::parse("anthropic").is_none());
        assert_eq!(LLMProvider::OpenRouter.to_string(), "openrouter");
    }

    #[test]
    fn test_execution_error_embeds_sql() {
        let err = AppError::Execution {
            sql: "SELECT * FROM missing".to_string(),
            datasource: "shop".to_string(),
            message: "table not found".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("SELECT * FROM missing"));
        assert!(text.contains("shop"));
        assert!(text.contains("table not found"));
    }
}
