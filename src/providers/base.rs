//! Model gateway trait and the opaque chat-session handle
//!
//! This module defines the [`ModelGateway`] trait that every generation
//! provider implements, together with the [`ChatSession`] handle and the
//! fragment stream returned by streaming sends.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;
use crate::schema::SchemaDescriptor;

/// Lazy, ordered, finite sequence of streamed text fragments
///
/// The stream ends after the last fragment; an `Err` item ends it early.
/// It cannot be restarted.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Speaker of a recorded conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnRole {
    /// Message sent by the student
    User,
    /// Reply produced by the model
    Model,
}

/// One completed exchange half, as replayed to the provider on the next send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Speaker
    pub role: TurnRole,
    /// Full text
    pub text: String,
}

/// Opaque handle to a multi-turn conversation
///
/// Controllers hold one handle per chat view and replace it to reset
/// context. Only gateways look inside: they read the system instruction and
/// the recorded history, and append to the history once an exchange has
/// completed. Cloning the handle shares the same conversation.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    system_instruction: Arc<str>,
    history: Arc<Mutex<Vec<Turn>>>,
}

impl ChatSession {
    /// Start a new, empty conversation
    ///
    /// # Examples
    ///
    /// ```
    /// use smartstudy::providers::ChatSession;
    ///
    /// let a = ChatSession::new("persona");
    /// let b = ChatSession::new("persona");
    /// assert_ne!(a.id(), b.id());
    /// ```
    pub fn new(system_instruction: impl Into<String>) -> Self {
        let instruction: String = system_instruction.into();
        Self {
            id: Uuid::new_v4(),
            system_instruction: Arc::from(instruction),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Unique identifier of this conversation
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub(crate) async fn history(&self) -> Vec<Turn> {
        self.history.lock().await.clone()
    }

    /// Append a completed exchange; partial exchanges are never recorded
    pub(crate) async fn record_exchange(&self, user_text: &str, model_text: &str) {
        let mut history = self.history.lock().await;
        history.push(Turn {
            role: TurnRole::User,
            text: user_text.to_string(),
        });
        history.push(Turn {
            role: TurnRole::Model,
            text: model_text.to_string(),
        });
    }
}

/// Gateway trait for generation providers
///
/// This is the only seam through which the application talks to a model.
/// Controllers receive an `Arc<dyn ModelGateway>`, so tests substitute a
/// deterministic double.
///
/// # Examples
///
/// ```
/// use smartstudy::providers::{ChatSession, FragmentStream, ModelGateway};
/// use smartstudy::schema::SchemaDescriptor;
/// use smartstudy::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoGateway;
///
/// #[async_trait]
/// impl ModelGateway for EchoGateway {
///     async fn complete_text(&self, prompt: &str, _system: &str) -> Result<String> {
///         Ok(prompt.to_string())
///     }
///
///     async fn complete_structured(&self, _prompt: &str, _schema: &SchemaDescriptor) -> Result<String> {
///         Ok("[]".to_string())
///     }
///
///     async fn send_streaming(&self, _session: &ChatSession, message: &str) -> Result<FragmentStream> {
///         let fragments: Vec<Result<String>> = vec![Ok(message.to_string())];
///         Ok(Box::pin(futures::stream::iter(fragments)))
///     }
/// }
/// ```
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// One-shot text completion
    ///
    /// # Errors
    ///
    /// `Network` on transport failure, `Provider` when the service rejects
    /// the request or answers with an unreadable body, `EmptyResponse` when
    /// it answers without text.
    async fn complete_text(&self, prompt: &str, system_instruction: &str) -> Result<String>;

    /// One-shot structured completion constrained by `schema`
    ///
    /// Returns the raw payload. Callers validate it with
    /// [`SchemaDescriptor::parse_records`] (or use [`complete_records`]).
    async fn complete_structured(&self, prompt: &str, schema: &SchemaDescriptor)
        -> Result<String>;

    /// Start a new conversation
    ///
    /// Never fails; problems surface on the first send.
    fn create_chat_session(&self, system_instruction: &str) -> ChatSession {
        ChatSession::new(system_instruction)
    }

    /// Send a message within `session` and stream the reply
    ///
    /// Once the stream has been fully consumed without error, the exchange
    /// is recorded in the session so the next send carries it as context.
    async fn send_streaming(&self, session: &ChatSession, message: &str)
        -> Result<FragmentStream>;
}

/// Structured completion followed by schema validation
///
/// # Errors
///
/// Gateway errors pass through; an unparsable payload yields
/// `SchemaViolation` and a blank one yields `EmptyResponse`.
pub async fn complete_records<T: DeserializeOwned>(
    gateway: &dyn ModelGateway,
    prompt: &str,
    schema: &SchemaDescriptor,
) -> Result<Vec<T>> {
    let payload = gateway.complete_structured(prompt, schema).await?;
    schema.parse_records(&payload)
}
