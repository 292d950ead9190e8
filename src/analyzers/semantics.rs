use serde_json::{json, Value};
use tracing::info;

use crate::analyzers::invoke_structured;
use crate::chains::{prompts, Chain, PromptTemplate, PromptVars};
use crate::llm::LLM;
use crate::models::SchemaSemantics;
use crate::types::AppResult;

const STAGE: &str = "semantics";

/// Writes business descriptions for every table and column of a schema.
pub struct SemanticsAnalyzer {
    chain: Chain,
}

impl SemanticsAnalyzer {
    pub fn new(llm: &LLM) -> AppResult<Self> {
        let template = PromptTemplate::new(STAGE, prompts::SEMANTICS)?;
        Ok(Self {
            chain: Chain::new(STAGE, template, llm.clone().with_temperature(0.0)),
        })
    }

    pub async fn analyze(&self, schema: &Value) -> AppResult<SchemaSemantics> {
        let vars = PromptVars::new().json("schema", schema)?;
        let result: SchemaSemantics = invoke_structured(&self.chain, &vars, wrap_tables).await?;
        info!(tables = result.tables.len(), "Semantics generated");
        Ok(result)
    }
}

// Models sometimes answer with the bare table array.
fn wrap_tables(value: Value) -> Value {
    match value {
        Value::Array(tables) => json!({ "tables": tables }),
        other => other,
    }
}
