//! View controllers for the summarizer, scheduler and chatbot
//!
//! Each controller owns the local state of one view, drives the injected
//! [`ModelGateway`](crate::providers::ModelGateway) and publishes a render
//! event after every mutation. Controllers never return gateway errors:
//! failures are turned into localized fallback text and the controller goes
//! back to [`ViewState::Idle`].
//!
//! State lives behind a `tokio::sync::Mutex` that is released before every
//! gateway call, so a controller can be shared through `Arc` by a rendering
//! task and an input task at the same time.

pub mod chatbot;
pub mod scheduler;
pub mod summarizer;

pub use chatbot::{ChatController, ChatEvent, ChatView};
pub use scheduler::{SchedulerController, SchedulerEvent, SchedulerView};
pub use summarizer::{SummarizerController, SummarizerEvent, SummarizerView};

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::types::Locale;

/// Lifecycle of a view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Ready for a new submission
    #[default]
    Idle,
    /// Request sent, nothing received yet
    AwaitingResponse,
    /// Chat only: fragments are arriving
    Streaming,
    /// The last request failed; carries the rendered fallback text
    Error(String),
}

impl ViewState {
    /// Whether a request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, ViewState::AwaitingResponse | ViewState::Streaming)
    }
}

/// Result of a submit or send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent: empty input or a request already in flight
    Ignored,
    /// The request finished and its result is rendered
    Completed,
    /// The request failed and a fallback message is rendered
    Failed,
    /// The view was reset while the request was in flight; its result was
    /// discarded
    Superseded,
}

/// Summarizer fallback when the model returns no text
pub fn summary_unavailable(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Không thể tạo tóm tắt.",
        Locale::En => "Could not create a summary.",
    }
}

/// Summarizer fallback for every other failure
pub fn summary_failed(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Đã có lỗi xảy ra. Vui lòng thử lại.",
        Locale::En => "An error occurred. Please try again.",
    }
}

/// Scheduler banner for network and provider failures
pub fn schedule_failed(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Không thể tạo lịch trình. Vui lòng thử lại.",
        Locale::En => "Could not build a schedule. Please try again.",
    }
}

/// Assistant apology appended when a chat reply fails
pub fn chat_failed(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Xin lỗi, tôi đang gặp sự cố kết nối. Vui lòng thử lại sau.",
        Locale::En => "Sorry, I'm having trouble connecting. Please try again later.",
    }
}

/// Fan-out of render events to every live subscriber
#[derive(Debug)]
pub(crate) struct EventBus<E> {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<E>>>,
}

impl<E: Clone> EventBus<E> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    /// Deliver `event`; subscribers whose receiver is gone are dropped
    pub(crate) fn publish(&self, event: E) {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_states() {
        assert!(!ViewState::Idle.is_busy());
        assert!(ViewState::AwaitingResponse.is_busy());
        assert!(ViewState::Streaming.is_busy());
        assert!(!ViewState::Error("x".into()).is_busy());
    }

    #[test]
    fn test_fallbacks_are_localized() {
        assert_eq!(summary_unavailable(Locale::Vi), "Không thể tạo tóm tắt.");
        assert_eq!(
            chat_failed(Locale::Vi),
            "Xin lỗi, tôi đang gặp sự cố kết nối. Vui lòng thử lại sau."
        );
        assert_ne!(summary_failed(Locale::Vi), summary_failed(Locale::En));
        assert_ne!(schedule_failed(Locale::Vi), schedule_failed(Locale::En));
    }

    #[test]
    fn test_event_bus_fans_out_and_prunes() {
        let bus = EventBus::<u32>::new();
        let mut a = bus.subscribe();
        let b = bus.subscribe();
        drop(b);

        bus.publish(1);
        bus.publish(2);

        assert_eq!(a.try_recv().unwrap(), 1);
        assert_eq!(a.try_recv().unwrap(), 2);
        assert_eq!(bus.subscribers.lock().unwrap().len(), 1);
    }
}
