//! Stage chains
//!
//! Each stage is a small pipeline object: a prompt template rendered with
//! named variables, a model call (one-shot or incremental), and an output
//! parser. The pipeline engine composes four of them.

pub mod chain;
pub mod prompts;
pub mod sql;
pub mod stages;
pub mod template;

pub use chain::{Chain, OutputParser};
pub use sql::clean_sql;
pub use stages::StageChains;
pub use template::{PromptTemplate, PromptVars};
