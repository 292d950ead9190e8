use serde_json::Value;
use tracing::info;

use crate::analyzers::parse_lenient;
use crate::chains::{prompts, Chain, PromptTemplate, PromptVars};
use crate::llm::LLM;
use crate::models::DatabaseInfo;
use crate::types::AppResult;

const STAGE: &str = "analytics";

/// Plans dashboard panels for a database. One model call, no retry.
pub struct AnalyticsGenerator {
    chain: Chain,
}

impl AnalyticsGenerator {
    pub fn new(llm: &LLM) -> AppResult<Self> {
        let template = PromptTemplate::new(STAGE, prompts::ANALYTICS)?;
        Ok(Self {
            chain: Chain::new(STAGE, template, llm.clone()),
        })
    }

    /// The parsed configuration, as generated. Callers decide whether its
    /// shape is acceptable.
    pub async fn generate(&self, db_info: &DatabaseInfo) -> AppResult<Value> {
        let vars = PromptVars::new()
            .json("schemas", &db_info.schemas)?
            .json("relationships", &db_info.relationships)?
            .json("semantics", &db_info.semantics)?
            .text("db_type", db_info.db_type.as_str());

        let raw = self.chain.invoke(&vars).await?;
        let config: Value = parse_lenient(STAGE, &raw, |v| v)?;
        info!(
            panels = config.as_array().map(Vec::len).unwrap_or(0),
            "Dashboard configuration generated"
        );
        Ok(config)
    }
}
