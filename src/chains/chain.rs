use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use crate::chains::sql::clean_sql;
use crate::chains::template::{PromptTemplate, PromptVars};
use crate::llm::{FragmentStream, LLM};
use crate::types::{AppError, AppResult};

/// Post-processing applied to the model's full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputParser {
    /// Text as the model produced it.
    Text,
    /// Fence- and backtick-stripped SQL.
    Sql,
}

impl OutputParser {
    pub fn parse(&self, raw: String) -> String {
        match self {
            OutputParser::Text => raw,
            OutputParser::Sql => clean_sql(&raw),
        }
    }
}

/// `render(template, vars) → call(model) → parse(output)` for one stage.
pub struct Chain {
    stage: &'static str,
    template: PromptTemplate,
    llm: LLM,
    parser: OutputParser,
}

impl Chain {
    pub fn new(stage: &'static str, template: PromptTemplate, llm: LLM) -> Self {
        Self {
            stage,
            template,
            llm,
            parser: OutputParser::Text,
        }
    }

    pub fn with_parser(mut self, parser: OutputParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn render(&self, vars: &PromptVars) -> AppResult<String> {
        self.template.render(vars)
    }

    /// One-shot call with the parser applied.
    pub async fn invoke(&self, vars: &PromptVars) -> AppResult<String> {
        let raw = self.invoke_raw(vars).await?;
        Ok(self.parser.parse(raw))
    }

    /// One-shot call, skipping the parser.
    pub async fn invoke_raw(&self, vars: &PromptVars) -> AppResult<String> {
        let prompt = self.render(vars)?;
        debug!(stage = self.stage, prompt_len = prompt.len(), "Invoking stage");
        self.llm
            .complete(&prompt)
            .await
            .map_err(|e| stage_error(self.stage, e))
    }

    /// Incremental call. Fragments are raw model output; run the assembled
    /// text through [`Chain::finish`] to get the parsed result.
    pub async fn stream(&self, vars: &PromptVars) -> AppResult<FragmentStream> {
        let prompt = self.render(vars)?;
        debug!(stage = self.stage, prompt_len = prompt.len(), "Streaming stage");
        let stage = self.stage;
        let fragments = self
            .llm
            .stream(&prompt)
            .await
            .map_err(|e| stage_error(stage, e))?;
        Ok(fragments.map_err(move |e| stage_error(stage, e)).boxed())
    }

    pub fn finish(&self, assembled: String) -> String {
        self.parser.parse(assembled)
    }
}

fn stage_error(stage: &'static str, error: AppError) -> AppError {
    match error {
        AppError::LLMApi(message) => AppError::ModelInvocation { stage, message },
        other => other,
    }
}
