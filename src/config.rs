use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub app_name: String,
    pub app_version: String,
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub api_base: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    pub mindsdb_url: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let provider = env::var("LLM_PROVIDER").unwrap_or_else(|_| "google".to_string());
        let api_key = env::var("LLM_API_KEY")
            .or_else(|_| match provider.as_str() {
                "google" | "gemini" => env::var("GEMINI_API_KEY"),
                _ => env::var("OPENAI_API_KEY"),
            })
            .unwrap_or_default();

        Ok(Self {
            server: ServerConfig {
                app_name: env::var("APP_NAME").unwrap_or_else(|_| "Analytics AI".to_string()),
                app_version: env::var("APP_VERSION")
                    .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: parse_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            },
            llm: LLMConfig {
                provider,
                api_key,
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
                temperature: env::var("LLM_TEMPERATURE")
                    .unwrap_or_else(|_| "0.5".to_string())
                    .parse()
                    .context("LLM_TEMPERATURE must be a number")?,
                api_base: env::var("LLM_API_BASE").ok().filter(|s| !s.is_empty()),
                timeout_secs: env::var("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()
                    .context("LLM_TIMEOUT_SECS must be an integer")?,
            },
            executor: ExecutorConfig {
                mindsdb_url: env::var("MINDSDB_URL").context("MINDSDB_URL must be set")?,
                timeout_secs: env::var("EXECUTOR_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("EXECUTOR_TIMEOUT_SECS must be an integer")?,
            },
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
