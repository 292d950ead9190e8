use serde_json::Value;
use tracing::info;

use crate::analyzers::invoke_structured;
use crate::chains::{prompts, Chain, PromptTemplate, PromptVars};
use crate::llm::LLM;
use crate::models::SchemaRelationships;
use crate::types::AppResult;

const STAGE: &str = "relationships";

/// Infers table relationships from a schema.
pub struct RelationshipsAnalyzer {
    chain: Chain,
}

impl RelationshipsAnalyzer {
    pub fn new(llm: &LLM) -> AppResult<Self> {
        let template = PromptTemplate::new(STAGE, prompts::RELATIONSHIPS)?;
        Ok(Self {
            chain: Chain::new(STAGE, template, llm.clone().with_temperature(0.0)),
        })
    }

    pub async fn analyze(&self, schema: &Value) -> AppResult<SchemaRelationships> {
        let vars = PromptVars::new()
            .json("schema", schema)?
            .text("format_instructions", prompts::RELATIONSHIPS_FORMAT);

        let result: SchemaRelationships = invoke_structured(&self.chain, &vars, |v| v).await?;
        info!(count = result.relationships.len(), "Relationships generated");
        Ok(result)
    }
}
