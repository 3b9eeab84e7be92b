//! Scheduler view controller
//!
//! The schedule is replaced wholesale on every completed request. Malformed
//! or empty structured output degrades to an empty schedule without an error
//! banner; network and provider failures clear the schedule and show one.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::controllers::{schedule_failed, EventBus, SubmitOutcome, ViewState};
use crate::error::ErrorKind;
use crate::prompts::schedule_prompt;
use crate::providers::{complete_records, ModelGateway};
use crate::schema::{schedule_schema, SchemaDescriptor};
use crate::types::{Locale, ScheduleItem, SchedulePreferences};

/// Render state of the scheduler view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerView {
    pub preferences: SchedulePreferences,
    /// Timeline in the order the model produced it
    pub items: Vec<ScheduleItem>,
    /// Error banner of the last request, if it failed
    pub error: Option<String>,
    pub state: ViewState,
}

/// Render events published by [`SchedulerController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    StateChanged(ViewState),
    PreferencesChanged(SchedulePreferences),
    ScheduleReplaced(Vec<ScheduleItem>),
}

/// Drives one scheduler view
pub struct SchedulerController {
    gateway: Arc<dyn ModelGateway>,
    locale: Locale,
    schema: SchemaDescriptor,
    view: Mutex<SchedulerView>,
    events: EventBus<SchedulerEvent>,
}

impl SchedulerController {
    /// Create a controller with the default form values
    pub fn new(gateway: Arc<dyn ModelGateway>, locale: Locale) -> Self {
        Self {
            gateway,
            locale,
            schema: schedule_schema(locale),
            view: Mutex::new(SchedulerView::default()),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SchedulerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SchedulerView {
        self.view.lock().await.clone()
    }

    pub async fn preferences(&self) -> SchedulePreferences {
        self.view.lock().await.preferences.clone()
    }

    pub async fn set_preferences(&self, preferences: SchedulePreferences) {
        let mut view = self.view.lock().await;
        view.preferences = preferences;
        self.events
            .publish(SchedulerEvent::PreferencesChanged(view.preferences.clone()));
    }

    /// Request a schedule for the current preferences
    ///
    /// Ignored while a request is in flight, when no subjects are given, or
    /// when either time is not `HH:MM`.
    pub async fn submit(&self) -> SubmitOutcome {
        let preferences = {
            let mut view = self.view.lock().await;
            if view.state.is_busy() || !view.preferences.is_complete() {
                return SubmitOutcome::Ignored;
            }
            view.error = None;
            self.set_state(&mut view, ViewState::AwaitingResponse);
            view.preferences.clone()
        };

        let prompt = schedule_prompt(&preferences, self.locale);
        tracing::debug!(
            "Requesting schedule: wake={}, sleep={}, intensity={}",
            preferences.wake_time,
            preferences.sleep_time,
            preferences.intensity
        );
        let result =
            complete_records::<ScheduleItem>(self.gateway.as_ref(), &prompt, &self.schema).await;

        let mut view = self.view.lock().await;
        match result {
            Ok(items) => {
                tracing::info!("Generated schedule with {} entries", items.len());
                self.replace_items(&mut view, items);
                self.set_state(&mut view, ViewState::Idle);
                SubmitOutcome::Completed
            }
            Err(e) if ErrorKind::of(&e).degrades_to_empty() => {
                tracing::warn!("Discarding unusable schedule payload: {:#}", e);
                self.replace_items(&mut view, Vec::new());
                self.set_state(&mut view, ViewState::Idle);
                SubmitOutcome::Completed
            }
            Err(e) => {
                tracing::error!("Error generating schedule: {:#}", e);
                let banner = schedule_failed(self.locale).to_string();
                view.error = Some(banner.clone());
                self.replace_items(&mut view, Vec::new());
                self.set_state(&mut view, ViewState::Error(banner));
                self.set_state(&mut view, ViewState::Idle);
                SubmitOutcome::Failed
            }
        }
    }

    fn replace_items(&self, view: &mut SchedulerView, items: Vec<ScheduleItem>) {
        view.items = items;
        self.events
            .publish(SchedulerEvent::ScheduleReplaced(view.items.clone()));
    }

    fn set_state(&self, view: &mut SchedulerView, state: ViewState) {
        view.state = state;
        self.events
            .publish(SchedulerEvent::StateChanged(view.state.clone()));
    }
}
