//! Chatbot view controller
//!
//! A send appends the student's message and an empty assistant placeholder,
//! then fills the placeholder fragment by fragment as the reply streams in.
//! Every fragment is applied only if the (session id, message id) pair it
//! was started for is still the active one; a reset supersedes the pair, so
//! fragments of an abandoned reply never reach the new conversation.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::controllers::{chat_failed, EventBus, SubmitOutcome, ViewState};
use crate::error::{ErrorKind, SmartStudyError};
use crate::prompts::{chat_greeting, chat_persona};
use crate::providers::{ChatSession, ModelGateway};
use crate::types::{ChatMessage, Locale};

/// Render state of the chat view
#[derive(Debug, Clone, PartialEq)]
pub struct ChatView {
    /// Draft typed by the student
    pub input: String,
    /// Transcript, oldest first
    pub messages: Vec<ChatMessage>,
    /// Lifecycle of the current send
    pub state: ViewState,
    /// Identifier of the current conversation
    pub session_id: Uuid,
}

/// Render events published by [`ChatController`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    StateChanged(ViewState),
    InputChanged(String),
    MessageAppended(ChatMessage),
    /// Full text of a streaming message after a fragment was applied
    MessageUpdated { id: String, text: String },
    /// All messages were discarded and a new conversation started
    Reset { session_id: Uuid },
}

/// Reply currently being streamed
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveReply {
    session_id: Uuid,
    message_id: String,
}

struct ChatInner {
    view: ChatView,
    session: ChatSession,
    active: Option<ActiveReply>,
}

impl ChatInner {
    fn owns(&self, reply: &ActiveReply) -> bool {
        self.active.as_ref() == Some(reply)
    }

    fn message_mut(&mut self, id: &str) -> Option<&mut ChatMessage> {
        self.view.messages.iter_mut().find(|m| m.id == id)
    }
}

/// Drives one chat view
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use smartstudy::controllers::{ChatController, SubmitOutcome};
/// use smartstudy::providers::FakeGateway;
/// use smartstudy::types::Locale;
///
/// # #[tokio::main]
/// # async fn main() {
/// let gateway = Arc::new(FakeGateway::new().with_fragments(["Hel", "lo"]));
/// let chat = ChatController::new(gateway, Locale::En, false);
/// chat.set_input("Hi").await;
/// assert_eq!(chat.send().await, SubmitOutcome::Completed);
/// assert_eq!(chat.snapshot().await.messages[1].text, "Hello");
/// # }
/// ```
pub struct ChatController {
    gateway: Arc<dyn ModelGateway>,
    locale: Locale,
    inner: Mutex<ChatInner>,
    events: EventBus<ChatEvent>,
}

impl ChatController {
    /// Open a chat view with a fresh conversation
    ///
    /// When `show_greeting` is set the view starts with the assistant
    /// greeting.
    pub fn new(gateway: Arc<dyn ModelGateway>, locale: Locale, show_greeting: bool) -> Self {
        let session = gateway.create_chat_session(chat_persona(locale));
        let mut messages = Vec::new();
        if show_greeting {
            messages.push(ChatMessage::assistant(chat_greeting(locale)));
        }

        tracing::debug!("Opened chat view with session {}", session.id());

        Self {
            gateway,
            locale,
            inner: Mutex::new(ChatInner {
                view: ChatView {
                    input: String::new(),
                    messages,
                    state: ViewState::Idle,
                    session_id: session.id(),
                },
                session,
                active: None,
            }),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ChatEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ChatView {
        self.inner.lock().await.view.clone()
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.view.input = text.into();
        self.events
            .publish(ChatEvent::InputChanged(inner.view.input.clone()));
    }

    /// Discard every message and start a new conversation
    ///
    /// Works in any state. A reply still streaming for the old conversation
    /// is abandoned and its remaining fragments are dropped.
    pub async fn reset(&self) {
        let session = self.gateway.create_chat_session(chat_persona(self.locale));
        let mut inner = self.inner.lock().await;

        tracing::info!(
            "Resetting chat: session {} -> {}",
            inner.view.session_id,
            session.id()
        );

        inner.view.messages.clear();
        inner.view.session_id = session.id();
        inner.session = session;
        inner.active = None;
        self.events.publish(ChatEvent::Reset {
            session_id: inner.view.session_id,
        });
        self.set_state(&mut inner, ViewState::Idle);
    }

    /// Send the current input and stream the reply into the view
    ///
    /// Ignored when the input is blank or a reply is still in flight.
    pub async fn send(&self) -> SubmitOutcome {
        let (session, reply, text) = {
            let mut inner = self.inner.lock().await;
            let text = inner.view.input.trim().to_string();
            if text.is_empty() || inner.view.state.is_busy() {
                return SubmitOutcome::Ignored;
            }

            inner.view.input.clear();
            self.events.publish(ChatEvent::InputChanged(String::new()));

            self.append(&mut inner, ChatMessage::user(text.clone()));
            let placeholder = ChatMessage::placeholder();
            let reply = ActiveReply {
                session_id: inner.view.session_id,
                message_id: placeholder.id.clone(),
            };
            self.append(&mut inner, placeholder);

            inner.active = Some(reply.clone());
            self.set_state(&mut inner, ViewState::AwaitingResponse);
            (inner.session.clone(), reply, text)
        };

        let mut stream = match self.gateway.send_streaming(&session, &text).await {
            Ok(stream) => stream,
            Err(e) => return self.fail(&reply, e).await,
        };

        while let Some(item) = stream.next().await {
            let fragment = match item {
                Ok(fragment) => fragment,
                Err(e) => return self.fail(&reply, e).await,
            };

            let mut inner = self.inner.lock().await;
            if !inner.owns(&reply) {
                tracing::debug!(
                    "Dropping fragment for superseded message {}",
                    reply.message_id
                );
                return SubmitOutcome::Superseded;
            }

            if inner.view.state == ViewState::AwaitingResponse {
                self.set_state(&mut inner, ViewState::Streaming);
            }
            if let Some(message) = inner.message_mut(&reply.message_id) {
                message.text.push_str(&fragment);
                let event = ChatEvent::MessageUpdated {
                    id: message.id.clone(),
                    text: message.text.clone(),
                };
                self.events.publish(event);
            }
        }

        self.finish(&reply).await
    }

    async fn finish(&self, reply: &ActiveReply) -> SubmitOutcome {
        let received_text = {
            let mut inner = self.inner.lock().await;
            if !inner.owns(reply) {
                return SubmitOutcome::Superseded;
            }
            inner
                .message_mut(&reply.message_id)
                .map(|m| !m.text.trim().is_empty())
                .unwrap_or(false)
        };

        if !received_text {
            return self
                .fail(reply, SmartStudyError::EmptyResponse.into())
                .await;
        }

        let mut inner = self.inner.lock().await;
        if !inner.owns(reply) {
            return SubmitOutcome::Superseded;
        }
        inner.active = None;
        self.set_state(&mut inner, ViewState::Idle);
        SubmitOutcome::Completed
    }

    /// Render the apology for a failed reply
    ///
    /// A placeholder with no visible text becomes the apology; partial text
    /// that already streamed in is kept and the apology follows it as a new
    /// message.
    async fn fail(&self, reply: &ActiveReply, error: anyhow::Error) -> SubmitOutcome {
        let mut inner = self.inner.lock().await;
        if !inner.owns(reply) {
            tracing::debug!("Ignoring failure of superseded reply: {:#}", error);
            return SubmitOutcome::Superseded;
        }

        match ErrorKind::of(&error) {
            ErrorKind::EmptyResponse => tracing::warn!("Chat reply was empty"),
            _ => tracing::error!("Chat error: {:#}", error),
        }

        let apology = chat_failed(self.locale).to_string();
        match inner
            .message_mut(&reply.message_id)
            .filter(|m| m.text.trim().is_empty())
        {
            Some(placeholder) => {
                placeholder.text = apology.clone();
                let event = ChatEvent::MessageUpdated {
                    id: placeholder.id.clone(),
                    text: apology.clone(),
                };
                self.events.publish(event);
            }
            None => self.append(&mut inner, ChatMessage::assistant(apology.clone())),
        }
        inner.active = None;
        self.set_state(&mut inner, ViewState::Error(apology));
        self.set_state(&mut inner, ViewState::Idle);
        SubmitOutcome::Failed
    }

    fn append(&self, inner: &mut ChatInner, message: ChatMessage) {
        inner.view.messages.push(message.clone());
        self.events.publish(ChatEvent::MessageAppended(message));
    }

    fn set_state(&self, inner: &mut ChatInner, state: ViewState) {
        inner.view.state = state;
        self.events
            .publish(ChatEvent::StateChanged(inner.view.state.clone()));
    }
}
