//! Chat Pipeline
//!
//! Routes a user message by intent and, for data questions, turns it into
//! SQL, runs it, and summarizes the rows.
//!
//! ```text
//! User Message + database context
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Classifier  │  → intent label
//! └─────────────┘
//!      │
//!      ├── "generic" ──────────────┐
//!      ▼                           ▼
//! ┌─────────────┐           ┌─────────────┐
//! │     SQL     │           │   Generic   │  → GenericReply
//! │  Generator  │           │    Reply    │
//! └─────────────┘           └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Executor   │  → rows from the named datasource
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Summarizer │  → DataResponse
//! └─────────────┘
//! ```
//!
//! The streaming variant emits a [`ProgressEvent`] at every transition and
//! forwards model output fragment by fragment.

pub mod engine;
pub mod events;

pub use engine::{Branch, ChatPipeline, ExecutionResult, PipelineResult, GENERIC_INTENT};
pub use events::{encode, EventKind, ProgressEvent};
