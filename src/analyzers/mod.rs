//! Schema Analyzers
//!
//! Single-shot model calls that turn a table schema into structured context
//! for the chat pipeline:
//!
//! - **Relationships**: foreign-key style links between tables
//! - **Semantics**: business descriptions of tables and columns
//! - **Analytics**: dashboard panel configurations

pub mod analytics;
pub mod relationships;
pub mod semantics;

pub use analytics::AnalyticsGenerator;
pub use relationships::RelationshipsAnalyzer;
pub use semantics::SemanticsAnalyzer;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::chains::{Chain, PromptVars};
use crate::types::{AppError, AppResult};
use crate::utils::json::extract_json_block;

/// Invoke `chain` and parse its answer as `T`.
///
/// Each answer is unwrapped from any code fence, parsed, and handed to
/// `reshape` before the final conversion. Only an answer that still does not
/// parse makes the stage ask once more.
pub(crate) async fn invoke_structured<T, F>(chain: &Chain, vars: &PromptVars, reshape: F) -> AppResult<T>
where
    T: DeserializeOwned,
    F: Fn(Value) -> Value,
{
    let first = chain.invoke(vars).await?;
    match parse_lenient::<T, _>(chain.stage(), &first, &reshape) {
        Ok(parsed) => return Ok(parsed),
        Err(e) => warn!(
            stage = chain.stage(),
            error = %e,
            "Structured output did not parse, retrying without parser"
        ),
    }

    let raw = chain.invoke_raw(vars).await?;
    parse_lenient(chain.stage(), &raw, reshape)
}

/// Best-effort parse: strip code fences, parse JSON, reshape, convert.
pub(crate) fn parse_lenient<T, F>(stage: &str, raw: &str, reshape: F) -> AppResult<T>
where
    T: DeserializeOwned,
    F: Fn(Value) -> Value,
{
    let value: Value = serde_json::from_str(extract_json_block(raw))
        .map_err(|e| AppError::MalformedOutput(format!("{} output is not JSON: {}", stage, e)))?;

    serde_json::from_value(reshape(value))
        .map_err(|e| AppError::MalformedOutput(format!("{} output has the wrong shape: {}", stage, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::PromptTemplate;
    use crate::llm::testing::ScriptedAdapter;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        n: u32,
    }

    fn chain(adapter: &std::sync::Arc<ScriptedAdapter>) -> Chain {
        Chain::new("answer", PromptTemplate::new("answer", "answer").unwrap(), adapter.llm())
    }

    #[tokio::test]
    async fn test_bare_json_parses_first_time() {
        let adapter = ScriptedAdapter::replying("{\"n\": 3}");
        let answer: Answer = invoke_structured(&chain(&adapter), &PromptVars::new(), |v| v)
            .await
            .unwrap();

        assert_eq!(answer, Answer { n: 3 });
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn test_fenced_json_parses_first_time() {
        let adapter = ScriptedAdapter::new(vec![
            Ok(vec!["```json\n{\"n\": 1}\n```".to_string()]),
            Ok(vec!["Sorry, here is a description instead.".to_string()]),
        ]);
        let answer: Answer = invoke_structured(&chain(&adapter), &PromptVars::new(), |v| v)
            .await
            .unwrap();

        assert_eq!(answer, Answer { n: 1 });
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn test_prose_falls_back_to_second_call() {
        let adapter = ScriptedAdapter::new(vec![
            Ok(vec!["Here are the results you asked for.".to_string()]),
            Ok(vec!["```json\n{\"n\": 2}\n```".to_string()]),
        ]);
        let answer: Answer = invoke_structured(&chain(&adapter), &PromptVars::new(), |v| v)
            .await
            .unwrap();

        assert_eq!(answer, Answer { n: 2 });
        assert_eq!(adapter.calls(), 2);
    }

    #[tokio::test]
    async fn test_first_answer_is_reshaped() {
        let adapter = ScriptedAdapter::replying("[3]");
        let answer: Answer = invoke_structured(&chain(&adapter), &PromptVars::new(), |v| match v {
            Value::Array(items) => serde_json::json!({ "n": items[0] }),
            other => other,
        })
        .await
        .unwrap();

        assert_eq!(answer, Answer { n: 3 });
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_fallback_is_malformed_output() {
        let adapter = ScriptedAdapter::replying("I cannot help with that.");
        let result: AppResult<Answer> =
            invoke_structured(&chain(&adapter), &PromptVars::new(), |v| v).await;

        assert!(matches!(result, Err(AppError::MalformedOutput(_))));
        assert_eq!(adapter.calls(), 2);
    }

    #[tokio::test]
    async fn test_model_failure_is_not_retried() {
        let adapter = ScriptedAdapter::failing("unavailable");
        let result: AppResult<Answer> =
            invoke_structured(&chain(&adapter), &PromptVars::new(), |v| v).await;

        assert!(matches!(result, Err(AppError::ModelInvocation { .. })));
        assert_eq!(adapter.calls(), 1);
    }
}
