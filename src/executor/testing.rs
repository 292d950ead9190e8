// Recording executor stub for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::executor::QueryExecutor;
use crate::models::Rows;
use crate::types::{AppError, AppResult};

type Outcome = Result<Rows, String>;

/// Replays outcomes in order (the last one repeats) and records every call.
pub struct RecordingExecutor {
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<(String, String)>>,
}

impl RecordingExecutor {
    pub fn new(outcomes: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn returning(rows: Rows) -> Arc<Self> {
        Self::new(vec![Ok(rows)])
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(vec![Err(message.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(sql, datasource)` pairs in call order.
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute_query(&self, sql: &str, datasource: &str) -> AppResult<Rows> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap()
            .push((sql.to_string(), datasource.to_string()));

        let mut outcomes = self.outcomes.lock().unwrap();
        let outcome = if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            outcomes.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
        };
        outcome.map_err(AppError::Executor)
    }
}

/// Build rows from JSON object literals.
pub fn rows(values: &[serde_json::Value]) -> Rows {
    values
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
}
