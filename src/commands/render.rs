//! Terminal rendering of controller events
//!
//! Renderers turn render events and snapshots into text. They do no I/O so
//! the output can be asserted in tests; the command handlers print it.

use std::collections::HashMap;

use colored::Colorize;

use crate::controllers::{ChatEvent, ViewState};
use crate::types::{ChatMessage, Locale, Role, ScheduleItem};

const BOT_NAME: &str = "SmartStudy";

/// Progress line shown while a request is in flight
pub fn waiting_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Đang xử lý...",
        Locale::En => "Working on it...",
    }
}

fn new_conversation_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Đã bắt đầu cuộc trò chuyện mới.",
        Locale::En => "Started a new conversation.",
    }
}

fn schedule_heading(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Lịch trình của bạn",
        Locale::En => "Your schedule",
    }
}

fn empty_schedule_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Không có hoạt động nào trong lịch trình.",
        Locale::En => "The schedule has no entries.",
    }
}

/// Render a schedule as a vertical timeline
///
/// Each entry shows its time range, a colored category marker and label,
/// the activity and, when present, the notes.
pub fn render_timeline(items: &[ScheduleItem], locale: Locale) -> String {
    let mut out = format!("\n{}\n\n", schedule_heading(locale).bold());

    if items.is_empty() {
        out.push_str(&format!("  {}\n", empty_schedule_message(locale).dimmed()));
        return out;
    }

    for item in items {
        let color = item.category.color();
        out.push_str(&format!(
            "{} {}  {}  {}\n",
            "●".color(color),
            item.time.bold(),
            format!("[{}]", item.category.label(locale)).color(color),
            item.activity
        ));
        if !item.notes.trim().is_empty() {
            out.push_str(&format!("│   {}\n", item.notes.dimmed()));
        }
    }
    out
}

/// Incremental printer for chat events
///
/// Streamed replies are printed as deltas: each `MessageUpdated` carries the
/// full text, and only the part not yet printed is emitted. Text that was
/// rewritten rather than extended is printed again on a new line.
#[derive(Debug)]
pub struct ChatPrinter {
    locale: Locale,
    printed: HashMap<String, String>,
    line_open: bool,
}

impl ChatPrinter {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            printed: HashMap::new(),
            line_open: false,
        }
    }

    /// Render one message in full, e.g. the greeting or a transcript line
    pub fn render_message(&self, message: &ChatMessage) -> String {
        match message.role {
            Role::Assistant => format!("{} {}\n", bot_label(), message.text),
            Role::User => format!("{} {}\n", user_label(self.locale), message.text),
        }
    }

    /// Text to print for `event`, if any
    pub fn render(&mut self, event: &ChatEvent) -> Option<String> {
        match event {
            ChatEvent::MessageAppended(message)
                if message.role == Role::Assistant && !message.text.is_empty() =>
            {
                let prefix = self.close_line();
                Some(format!("{}{}", prefix, self.render_message(message)))
            }
            ChatEvent::MessageUpdated { id, text } => {
                let previous = self
                    .printed
                    .insert(id.clone(), text.clone())
                    .unwrap_or_default();
                if *text == previous {
                    return None;
                }

                let output = if previous.is_empty() {
                    format!("{} {}", bot_label(), text)
                } else if let Some(delta) = text.strip_prefix(previous.as_str()) {
                    delta.to_string()
                } else {
                    format!("\n{} {}", bot_label(), text)
                };
                self.line_open = true;
                Some(output)
            }
            ChatEvent::StateChanged(ViewState::Idle) => {
                let close = self.close_line();
                (!close.is_empty()).then_some(close)
            }
            ChatEvent::Reset { .. } => {
                self.printed.clear();
                let prefix = self.close_line();
                Some(format!(
                    "{}{}\n",
                    prefix,
                    new_conversation_message(self.locale).dimmed()
                ))
            }
            _ => None,
        }
    }

    fn close_line(&mut self) -> String {
        if std::mem::take(&mut self.line_open) {
            "\n".to_string()
        } else {
            String::new()
        }
    }
}

fn bot_label() -> String {
    format!("{}:", BOT_NAME).cyan().bold().to_string()
}

fn user_label(locale: Locale) -> String {
    let name = match locale {
        Locale::Vi => "Bạn",
        Locale::En => "You",
    };
    format!("{}:", name).green().bold().to_string()
}
