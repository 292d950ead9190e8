use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use crate::chains::stages::{self, StageChains};
use crate::chains::{Chain, PromptVars};
use crate::executor::QueryExecutor;
use crate::llm::LLM;
use crate::models::{ChatInput, Rows};
use crate::pipeline::events::{self, EventKind, ProgressEvent};
use crate::types::{AppError, AppResult};

/// The only classifier label that takes the generic branch. Matched exactly.
pub const GENERIC_INTENT: &str = "generic";

/// Capacity of the per-request event channel.
const EVENT_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Generic,
    Analytical,
}

impl Branch {
    pub fn for_intent(label: &str) -> Self {
        if label == GENERIC_INTENT {
            Branch::Generic
        } else {
            Branch::Analytical
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub sql: String,
    pub data: Rows,
    pub user_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineResult {
    GenericReply {
        message: String,
    },
    DataResponse {
        summary: String,
        data: Rows,
        sql: String,
    },
}

/// Why a stream stopped before its last event.
enum Halt {
    /// The consumer went away.
    Cancelled,
    Failed(AppError),
}

impl From<AppError> for Halt {
    fn from(e: AppError) -> Self {
        Halt::Failed(e)
    }
}

struct EventSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl EventSink {
    async fn emit(&self, event: ProgressEvent) -> Result<(), Halt> {
        self.tx.send(event).await.map_err(|_| Halt::Cancelled)
    }

    fn ensure_open(&self) -> Result<(), Halt> {
        if self.tx.is_closed() {
            Err(Halt::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Intent-routing chat pipeline. Immutable after construction; share it
/// behind an `Arc`.
pub struct ChatPipeline {
    stages: StageChains,
    executor: Arc<dyn QueryExecutor>,
}

impl ChatPipeline {
    pub fn new(llm: &LLM, executor: Arc<dyn QueryExecutor>) -> AppResult<Self> {
        Ok(Self::from_stages(StageChains::new(llm)?, executor))
    }

    pub fn from_stages(stages: StageChains, executor: Arc<dyn QueryExecutor>) -> Self {
        Self { stages, executor }
    }

    /// Run the whole graph and return the aggregate result.
    pub async fn invoke(&self, input: &ChatInput) -> AppResult<PipelineResult> {
        let intent = self
            .stages
            .classifier
            .invoke(&stages::message_vars(&input.user_message))
            .await?;
        let branch = Branch::for_intent(&intent);
        info!(intent = %intent, branch = ?branch, "Classified user message");

        match branch {
            Branch::Generic => {
                let message = self.classify(&input.user_message).await?;
                Ok(PipelineResult::GenericReply { message })
            }
            Branch::Analytical => {
                let sql = self.generate_sql(input).await?;
                let execution = self.execute(input, sql).await?;
                let summary = self
                    .stages
                    .summarizer
                    .invoke(&stages::summary_vars(
                        &execution.user_message,
                        &execution.sql,
                        &execution.data,
                    )?)
                    .await?;
                info!(summary_len = summary.len(), "Data response ready");

                Ok(PipelineResult::DataResponse {
                    summary,
                    data: execution.data,
                    sql: execution.sql,
                })
            }
        }
    }

    /// Stand-alone classify entry point. Answers with the generic-reply
    /// stage's text rather than the intent label.
    pub async fn classify(&self, user_message: &str) -> AppResult<String> {
        self.stages
            .generic_reply
            .invoke(&stages::message_vars(user_message))
            .await
    }

    /// Cleaned SQL for the request, without running it.
    pub async fn generate_sql(&self, input: &ChatInput) -> AppResult<String> {
        let sql = self
            .stages
            .sql_generator
            .invoke(&stages::sql_vars(input)?)
            .await?;
        info!(sql_len = sql.len(), db = %input.db_name, "SQL generated");
        Ok(sql)
    }

    pub async fn execute(&self, input: &ChatInput, sql: String) -> AppResult<ExecutionResult> {
        let data = match self.executor.execute_query(&sql, &input.db_name).await {
            Ok(rows) => rows,
            Err(e) => {
                let message = match e {
                    AppError::Executor(message) => message,
                    other => other.to_string(),
                };
                return Err(AppError::Execution {
                    sql,
                    datasource: input.db_name.clone(),
                    message,
                });
            }
        };
        info!(row_count = data.len(), db = %input.db_name, "Query executed");

        Ok(ExecutionResult {
            sql,
            data,
            user_message: input.user_message.clone(),
        })
    }

    /// Run the graph on a background task and hand back its events.
    /// Dropping the returned stream cancels the run.
    pub fn stream(self: &Arc<Self>, input: ChatInput) -> ReceiverStream<ProgressEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.stream_into(&input, tx).await;
        });
        ReceiverStream::new(rx)
    }

    /// Push the event sequence for one request into `tx`. Returns once the
    /// sequence is complete, has failed, or the receiver is gone.
    pub async fn stream_into(&self, input: &ChatInput, tx: mpsc::Sender<ProgressEvent>) {
        let sink = EventSink { tx };
        match self.run_stream(input, &sink).await {
            Ok(()) => debug!("Stream complete"),
            Err(Halt::Cancelled) => warn!("Consumer disconnected, stopping pipeline"),
            Err(Halt::Failed(e)) => {
                error!(error = %e, "Pipeline stream failed");
                // Nothing left to do if the consumer is gone as well.
                let _ = sink.emit(ProgressEvent::error(e.to_string())).await;
            }
        }
    }

    async fn run_stream(&self, input: &ChatInput, sink: &EventSink) -> Result<(), Halt> {
        sink.emit(ProgressEvent::status(events::STATUS_CLASSIFYING)).await?;
        let message_vars = stages::message_vars(&input.user_message);
        let intent = relay(&self.stages.classifier, &message_vars, sink, None).await?;
        let branch = Branch::for_intent(&intent);
        info!(intent = %intent, branch = ?branch, "Classified user message");
        sink.emit(ProgressEvent::intent(intent)).await?;

        match branch {
            Branch::Generic => {
                sink.emit(ProgressEvent::status(events::STATUS_RESPONDING)).await?;
                let reply = relay(
                    &self.stages.generic_reply,
                    &message_vars,
                    sink,
                    Some(EventKind::GenericChunk),
                )
                .await?;
                sink.emit(ProgressEvent::complete(EventKind::GenericComplete, reply))
                    .await?;
            }
            Branch::Analytical => {
                sink.emit(ProgressEvent::status(events::STATUS_GENERATING_SQL)).await?;
                let raw = relay(
                    &self.stages.sql_generator,
                    &stages::sql_vars(input)?,
                    sink,
                    Some(EventKind::SqlChunk),
                )
                .await?;
                let sql = self.stages.sql_generator.finish(raw);
                info!(sql_len = sql.len(), db = %input.db_name, "SQL generated");
                sink.emit(ProgressEvent::complete(EventKind::SqlComplete, sql.clone()))
                    .await?;

                sink.emit(ProgressEvent::status(events::STATUS_EXECUTING)).await?;
                sink.ensure_open()?;
                let execution = self.execute(input, sql).await?;
                sink.emit(ProgressEvent::data(&execution.data)?).await?;

                sink.emit(ProgressEvent::status(events::STATUS_SUMMARIZING)).await?;
                let summary = relay(
                    &self.stages.summarizer,
                    &stages::summary_vars(&execution.user_message, &execution.sql, &execution.data)?,
                    sink,
                    Some(EventKind::SummaryChunk),
                )
                .await?;
                sink.emit(ProgressEvent::complete(EventKind::SummaryComplete, summary))
                    .await?;
            }
        }

        Ok(())
    }
}

/// Drive one stage incrementally and return the assembled raw text.
/// With `forward` set, every non-empty fragment goes out as its own event.
async fn relay(
    chain: &Chain,
    vars: &PromptVars,
    sink: &EventSink,
    forward: Option<EventKind>,
) -> Result<String, Halt> {
    sink.ensure_open()?;
    let mut fragments = chain.stream(vars).await?;
    let mut assembled = String::new();

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        if fragment.is_empty() {
            continue;
        }
        assembled.push_str(&fragment);
        match forward {
            Some(kind) => sink.emit(ProgressEvent::chunk(kind, fragment)).await?,
            None => sink.ensure_open()?,
        }
    }

    debug!(stage = chain.stage(), len = assembled.len(), "Stage stream finished");
    Ok(assembled)
}
