//! Deterministic in-process gateway for controller tests
//!
//! [`FakeGateway`] implements [`ModelGateway`] from a script instead of the
//! network. Tests configure replies with the `with_*` builders, hold a
//! request open with a [`Notify`] gate, and drive a streamed reply fragment
//! by fragment through [`FakeGateway::script_stream`].
//!
//! # Example
//!
//! ```
//! use smartstudy::providers::{FakeGateway, ModelGateway};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let gateway = FakeGateway::new().with_text("- point one");
//! let text = gateway.complete_text("notes", "persona").await.unwrap();
//! assert_eq!(text, "- point one");
//! assert_eq!(gateway.calls().len(), 1);
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::error::{Result, SmartStudyError};
use crate::providers::{ChatSession, FragmentStream, ModelGateway};
use crate::schema::SchemaDescriptor;

/// Failure a scripted reply produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    Network,
    Provider,
    SchemaViolation,
    EmptyResponse,
}

impl FakeFailure {
    fn into_error(self) -> anyhow::Error {
        match self {
            FakeFailure::Network => SmartStudyError::Network("scripted network failure".into()),
            FakeFailure::Provider => SmartStudyError::Provider("scripted provider failure".into()),
            FakeFailure::SchemaViolation => {
                SmartStudyError::SchemaViolation("scripted schema violation".into())
            }
            FakeFailure::EmptyResponse => SmartStudyError::EmptyResponse,
        }
        .into()
    }
}

/// Which gateway operation a recorded call went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCallKind {
    Text,
    Structured,
    Streaming,
}

/// One recorded gateway call
#[derive(Debug, Clone)]
pub struct FakeCall {
    pub kind: FakeCallKind,
    /// Prompt or chat message
    pub prompt: String,
    /// System instruction for text completions
    pub system_instruction: Option<String>,
    /// Field names of the schema for structured completions
    pub schema_fields: Vec<String>,
    /// Session the message was sent in
    pub session_id: Option<Uuid>,
}

type Scripted = std::result::Result<String, FakeFailure>;

#[derive(Debug)]
struct StreamScript {
    fragments: Vec<String>,
    fail_after: Option<FakeFailure>,
    fail_on_send: Option<FakeFailure>,
}

/// Scripted [`ModelGateway`] double
#[derive(Debug)]
pub struct FakeGateway {
    text: Mutex<Scripted>,
    structured: Mutex<Scripted>,
    stream: Mutex<StreamScript>,
    pending_streams: Mutex<VecDeque<mpsc::UnboundedReceiver<Result<String>>>>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<FakeCall>>,
    sessions_created: AtomicUsize,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeGateway {
    /// Gateway that answers every completion with an empty JSON list or
    /// `EmptyResponse` and streams nothing
    pub fn new() -> Self {
        Self {
            text: Mutex::new(Err(FakeFailure::EmptyResponse)),
            structured: Mutex::new(Ok("[]".to_string())),
            stream: Mutex::new(StreamScript {
                fragments: Vec::new(),
                fail_after: None,
                fail_on_send: None,
            }),
            pending_streams: Mutex::new(VecDeque::new()),
            gate: None,
            calls: Mutex::new(Vec::new()),
            sessions_created: AtomicUsize::new(0),
        }
    }

    /// Answer text completions with `text`
    pub fn with_text(self, text: impl Into<String>) -> Self {
        *lock(&self.text) = Ok(text.into());
        self
    }

    /// Fail text completions
    pub fn with_text_failure(self, failure: FakeFailure) -> Self {
        *lock(&self.text) = Err(failure);
        self
    }

    /// Answer structured completions with the raw `payload`
    pub fn with_structured(self, payload: impl Into<String>) -> Self {
        *lock(&self.structured) = Ok(payload.into());
        self
    }

    /// Fail structured completions
    pub fn with_structured_failure(self, failure: FakeFailure) -> Self {
        *lock(&self.structured) = Err(failure);
        self
    }

    /// Stream these fragments on every send
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.stream).fragments = fragments.into_iter().map(Into::into).collect();
        self
    }

    /// End every stream with `failure` after the scripted fragments
    pub fn with_stream_failure(self, failure: FakeFailure) -> Self {
        lock(&self.stream).fail_after = Some(failure);
        self
    }

    /// Fail sends before any stream is produced
    pub fn with_send_failure(self, failure: FakeFailure) -> Self {
        lock(&self.stream).fail_on_send = Some(failure);
        self
    }

    /// Hold every call until `gate` is notified
    ///
    /// Completions wait before answering; streaming sends wait before
    /// returning the stream.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Queue a hand-driven stream for the next streaming send
    ///
    /// Fragments pushed into the returned sender reach the consumer as they
    /// are sent; dropping the sender ends the stream.
    pub fn script_stream(&self) -> mpsc::UnboundedSender<Result<String>> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.pending_streams).push_back(rx);
        tx
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<FakeCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls of one kind
    pub fn call_count(&self, kind: FakeCallKind) -> usize {
        lock(&self.calls).iter().filter(|c| c.kind == kind).count()
    }

    /// Number of chat sessions created
    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }

    fn record(&self, call: FakeCall) {
        lock(&self.calls).push(call);
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl ModelGateway for FakeGateway {
    async fn complete_text(&self, prompt: &str, system_instruction: &str) -> Result<String> {
        self.record(FakeCall {
            kind: FakeCallKind::Text,
            prompt: prompt.to_string(),
            system_instruction: Some(system_instruction.to_string()),
            schema_fields: Vec::new(),
            session_id: None,
        });
        self.wait_for_gate().await;

        let scripted = lock(&self.text).clone();
        scripted.map_err(FakeFailure::into_error)
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        schema: &SchemaDescriptor,
    ) -> Result<String> {
        self.record(FakeCall {
            kind: FakeCallKind::Structured,
            prompt: prompt.to_string(),
            system_instruction: None,
            schema_fields: schema.field_names().iter().map(|s| s.to_string()).collect(),
            session_id: None,
        });
        self.wait_for_gate().await;

        let scripted = lock(&self.structured).clone();
        scripted.map_err(FakeFailure::into_error)
    }

    fn create_chat_session(&self, system_instruction: &str) -> ChatSession {
        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        ChatSession::new(system_instruction)
    }

    async fn send_streaming(&self, session: &ChatSession, message: &str) -> Result<FragmentStream> {
        self.record(FakeCall {
            kind: FakeCallKind::Streaming,
            prompt: message.to_string(),
            system_instruction: None,
            schema_fields: Vec::new(),
            session_id: Some(session.id()),
        });
        self.wait_for_gate().await;

        if let Some(rx) = lock(&self.pending_streams).pop_front() {
            return Ok(Box::pin(UnboundedReceiverStream::new(rx)));
        }

        let items: Vec<Result<String>> = {
            let script = lock(&self.stream);
            if let Some(failure) = script.fail_on_send {
                return Err(failure.into_error());
            }
            script
                .fragments
                .iter()
                .cloned()
                .map(Ok)
                .chain(script.fail_after.map(|f| Err(f.into_error())))
                .collect()
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }
}
