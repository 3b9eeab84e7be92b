//! Summarizer view controller

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::controllers::{summary_failed, summary_unavailable, EventBus, SubmitOutcome, ViewState};
use crate::error::{ErrorKind, SmartStudyError};
use crate::prompts::{summarizer_persona, summary_prompt};
use crate::providers::ModelGateway;
use crate::types::Locale;

/// Render state of the summarizer view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummarizerView {
    /// Lecture content typed or loaded by the student
    pub input: String,
    /// Rendered summary, or a fallback message
    pub summary: String,
    pub state: ViewState,
}

/// Render events published by [`SummarizerController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizerEvent {
    StateChanged(ViewState),
    InputChanged(String),
    SummaryChanged(String),
}

/// Drives one summarizer view
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use smartstudy::controllers::{SubmitOutcome, SummarizerController};
/// use smartstudy::providers::FakeGateway;
/// use smartstudy::types::Locale;
///
/// # #[tokio::main]
/// # async fn main() {
/// let gateway = Arc::new(FakeGateway::new().with_text("- key idea"));
/// let controller = SummarizerController::new(gateway, Locale::En);
/// controller.set_input("Newton's laws").await;
/// assert_eq!(controller.submit().await, SubmitOutcome::Completed);
/// assert_eq!(controller.snapshot().await.summary, "- key idea");
/// # }
/// ```
pub struct SummarizerController {
    gateway: Arc<dyn ModelGateway>,
    locale: Locale,
    view: Mutex<SummarizerView>,
    events: EventBus<SummarizerEvent>,
}

impl SummarizerController {
    pub fn new(gateway: Arc<dyn ModelGateway>, locale: Locale) -> Self {
        Self {
            gateway,
            locale,
            view: Mutex::new(SummarizerView::default()),
            events: EventBus::new(),
        }
    }

    /// Receive a render event after every state mutation
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SummarizerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SummarizerView {
        self.view.lock().await.clone()
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        let mut view = self.view.lock().await;
        view.input = text.into();
        self.events
            .publish(SummarizerEvent::InputChanged(view.input.clone()));
    }

    /// Summarize the current input
    ///
    /// A blank input, or a request already in flight, is ignored.
    pub async fn submit(&self) -> SubmitOutcome {
        let text = {
            let mut view = self.view.lock().await;
            if view.input.trim().is_empty() || view.state.is_busy() {
                return SubmitOutcome::Ignored;
            }
            view.summary.clear();
            self.events.publish(SummarizerEvent::SummaryChanged(String::new()));
            self.set_state(&mut view, ViewState::AwaitingResponse);
            view.input.clone()
        };

        tracing::debug!("Summarizing {} characters", text.chars().count());
        let prompt = summary_prompt(&text, self.locale);
        let result = self
            .gateway
            .complete_text(&prompt, summarizer_persona(self.locale))
            .await
            .and_then(|summary| {
                if summary.trim().is_empty() {
                    Err(SmartStudyError::EmptyResponse.into())
                } else {
                    Ok(summary)
                }
            });

        let mut view = self.view.lock().await;
        match result {
            Ok(summary) => {
                self.set_summary(&mut view, summary);
                self.set_state(&mut view, ViewState::Idle);
                SubmitOutcome::Completed
            }
            Err(e) if ErrorKind::of(&e) == ErrorKind::EmptyResponse => {
                tracing::warn!("Summarizer received an empty response");
                self.set_summary(&mut view, summary_unavailable(self.locale).to_string());
                self.set_state(&mut view, ViewState::Idle);
                SubmitOutcome::Completed
            }
            Err(e) => {
                tracing::error!("Error summarizing content: {:#}", e);
                let fallback = summary_failed(self.locale).to_string();
                self.set_summary(&mut view, fallback.clone());
                self.set_state(&mut view, ViewState::Error(fallback));
                self.set_state(&mut view, ViewState::Idle);
                SubmitOutcome::Failed
            }
        }
    }

    fn set_summary(&self, view: &mut SummarizerView, summary: String) {
        view.summary = summary;
        self.events
            .publish(SummarizerEvent::SummaryChanged(view.summary.clone()));
    }

    fn set_state(&self, view: &mut SummarizerView, state: ViewState) {
        view.state = state;
        self.events
            .publish(SummarizerEvent::StateChanged(view.state.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FakeCallKind, FakeFailure, FakeGateway};
    use tokio::sync::Notify;

    fn drain(rx: &mut mpsc::UnboundedReceiver<SummarizerEvent>) -> Vec<SummarizerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_submit_renders_summary() {
        let gateway = Arc::new(FakeGateway::new().with_text("## Ý chính"));
        let controller = SummarizerController::new(gateway.clone(), Locale::Vi);
        controller.set_input("Bài giảng về OOP").await;

        assert_eq!(controller.submit().await, SubmitOutcome::Completed);

        let view = controller.snapshot().await;
        assert_eq!(view.summary, "## Ý chính");
        assert_eq!(view.state, ViewState::Idle);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("Bài giảng về OOP"));
        assert_eq!(
            calls[0].system_instruction.as_deref(),
            Some(summarizer_persona(Locale::Vi))
        );
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let gateway = Arc::new(FakeGateway::new().with_text("x"));
        let controller = SummarizerController::new(gateway.clone(), Locale::Vi);
        controller.set_input("   \n").await;

        assert_eq!(controller.submit().await, SubmitOutcome::Ignored);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_response_shows_unavailable_message() {
        let gateway = Arc::new(FakeGateway::new().with_text_failure(FakeFailure::EmptyResponse));
        let controller = SummarizerController::new(gateway, Locale::Vi);
        controller.set_input("notes").await;

        assert_eq!(controller.submit().await, SubmitOutcome::Completed);
        assert_eq!(controller.snapshot().await.summary, "Không thể tạo tóm tắt.");
    }

    #[tokio::test]
    async fn test_whitespace_summary_shows_unavailable_message() {
        let gateway = Arc::new(FakeGateway::new().with_text(" \n\t "));
        let controller = SummarizerController::new(gateway, Locale::En);
        controller.set_input("notes").await;

        assert_eq!(controller.submit().await, SubmitOutcome::Completed);

        let view = controller.snapshot().await;
        assert_eq!(view.summary, summary_unavailable(Locale::En));
        assert_eq!(view.state, ViewState::Idle);
    }

    #[tokio::test]
    async fn test_failures_render_exactly_one_fallback() {
        for failure in [FakeFailure::Network, FakeFailure::Provider] {
            let gateway = Arc::new(FakeGateway::new().with_text_failure(failure));
            let controller = SummarizerController::new(gateway, Locale::En);
            let mut rx = controller.subscribe();
            controller.set_input("notes").await;

            assert_eq!(controller.submit().await, SubmitOutcome::Failed);

            let view = controller.snapshot().await;
            assert_eq!(view.summary, summary_failed(Locale::En));
            assert_eq!(view.state, ViewState::Idle);

            let events = drain(&mut rx);
            let error_states = events
                .iter()
                .filter(|e| matches!(e, SummarizerEvent::StateChanged(ViewState::Error(_))))
                .count();
            assert_eq!(error_states, 1);
            assert_eq!(
                events.last(),
                Some(&SummarizerEvent::StateChanged(ViewState::Idle))
            );
        }
    }

    #[tokio::test]
    async fn test_duplicate_submit_sends_one_request() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(
            FakeGateway::new()
                .with_text("summary")
                .with_gate(gate.clone()),
        );
        let controller = Arc::new(SummarizerController::new(gateway.clone(), Locale::En));
        controller.set_input("notes").await;

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit().await })
        };
        while gateway.call_count(FakeCallKind::Text) == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            controller.snapshot().await.state,
            ViewState::AwaitingResponse
        );
        assert_eq!(controller.submit().await, SubmitOutcome::Ignored);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Completed);
        assert_eq!(gateway.call_count(FakeCallKind::Text), 1);
    }

    #[tokio::test]
    async fn test_resubmit_clears_previous_summary_first() {
        let gateway = Arc::new(FakeGateway::new().with_text("second"));
        let controller = SummarizerController::new(gateway, Locale::En);
        let mut rx = controller.subscribe();
        controller.set_input("notes").await;
        controller.submit().await;

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                SummarizerEvent::InputChanged("notes".into()),
                SummarizerEvent::SummaryChanged(String::new()),
                SummarizerEvent::StateChanged(ViewState::AwaitingResponse),
                SummarizerEvent::SummaryChanged("second".into()),
                SummarizerEvent::StateChanged(ViewState::Idle),
            ]
        );
    }
}
