// Scripted model adapter for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::llm::provider::{FragmentStream, LLMAdapter, LLM};
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

type Script = Result<Vec<String>, String>;

/// A canned answer whose fragments may fail after the stream has opened.
pub type Reply = Result<Vec<Result<String, String>>, String>;

/// Replays canned answers in order; the last script repeats once the queue
/// is down to one entry.
pub struct ScriptedAdapter {
    scripts: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Self::with_replies(
            scripts
                .into_iter()
                .map(|script| script.map(|fragments| fragments.into_iter().map(Ok).collect()))
                .collect(),
        )
    }

    pub fn with_replies(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn fragments(fragments: &[&str]) -> Arc<Self> {
        Self::new(vec![Ok(fragments.iter().map(|s| s.to_string()).collect())])
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::fragments(&[text])
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(vec![Err(message.to_string())])
    }

    pub fn llm(self: &Arc<Self>) -> LLM {
        LLM::from_adapter(self.clone(), "scripted")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next(&self, request: &LLMRequest) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .extend(request.messages.iter().map(|m| m.content.clone()));

        let mut scripts = self.scripts.lock().unwrap();
        if scripts.len() > 1 {
            scripts.pop_front().unwrap()
        } else {
            scripts.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}

#[async_trait]
impl LLMAdapter for ScriptedAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let fragments = self
            .next(request)
            .and_then(|fragments| fragments.into_iter().collect::<Result<Vec<_>, _>>())
            .map_err(AppError::LLMApi)?;
        Ok(LLMResponse {
            content: fragments.concat(),
            finish_reason: "stop".to_string(),
            usage: TokenUsage::default(),
        })
    }

    async fn create_chat_completion_stream(&self, request: &LLMRequest) -> AppResult<FragmentStream> {
        let fragments = self.next(request).map_err(AppError::LLMApi)?;
        Ok(stream::iter(fragments.into_iter().map(|f| f.map_err(AppError::LLMApi))).boxed())
    }
}
