//! The four conversational stages and the variables each one expects.

use crate::chains::chain::{Chain, OutputParser};
use crate::chains::prompts;
use crate::chains::template::{PromptTemplate, PromptVars};
use crate::llm::LLM;
use crate::models::{ChatInput, Rows};
use crate::types::AppResult;

pub const CLASSIFIER: &str = "classifier";
pub const GENERIC_REPLY: &str = "generic_reply";
pub const SQL_GENERATOR: &str = "sql_generator";
pub const SUMMARY: &str = "summary";

/// Built once per engine and reused for every request.
pub struct StageChains {
    pub classifier: Chain,
    pub generic_reply: Chain,
    pub sql_generator: Chain,
    pub summarizer: Chain,
}

impl StageChains {
    /// All four stages on one shared model handle.
    pub fn new(llm: &LLM) -> AppResult<Self> {
        Self::with_models(llm.clone(), llm.clone(), llm.clone(), llm.clone())
    }

    pub fn with_models(classifier: LLM, generic_reply: LLM, sql_generator: LLM, summarizer: LLM) -> AppResult<Self> {
        Ok(Self {
            classifier: Chain::new(
                CLASSIFIER,
                PromptTemplate::new(CLASSIFIER, prompts::MESSAGE_CLASSIFIER)?,
                classifier,
            ),
            generic_reply: Chain::new(
                GENERIC_REPLY,
                PromptTemplate::new(GENERIC_REPLY, prompts::GENERIC_REPLY)?,
                generic_reply,
            ),
            sql_generator: Chain::new(
                SQL_GENERATOR,
                PromptTemplate::new(SQL_GENERATOR, prompts::SQL_GENERATOR)?,
                sql_generator,
            )
            .with_parser(OutputParser::Sql),
            summarizer: Chain::new(
                SUMMARY,
                PromptTemplate::new(SUMMARY, prompts::SUMMARY)?,
                summarizer,
            ),
        })
    }
}

/// Variables for the classifier and generic-reply stages.
pub fn message_vars(user_message: &str) -> PromptVars {
    PromptVars::new().text("user_message", user_message)
}

pub fn sql_vars(input: &ChatInput) -> AppResult<PromptVars> {
    PromptVars::new()
        .text("user_message", input.user_message.as_str())
        .text("db_type", input.db_type.as_str())
        .text("db_name", input.db_name.as_str())
        .json("tables", &input.tables)?
        .json("relationships", &input.relationships)?
        .json("semantics", &input.semantics)
}

pub fn summary_vars(user_message: &str, sql_query: &str, data: &Rows) -> AppResult<PromptVars> {
    PromptVars::new()
        .text("user_message", user_message)
        .text("sql_query", sql_query)
        .json("data", data)
}
