//! Domain types shared by prompts, gateways, controllers and the CLI
//!
//! These types model what the student sees: chat messages, schedule
//! preferences and the schedule entries produced by the model.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::SmartStudyError;

/// Language used for prompts, personas and fallback messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Vietnamese
    #[default]
    Vi,
    /// English
    En,
}

impl FromStr for Locale {
    type Err = SmartStudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vi" | "vi-vn" | "vietnamese" => Ok(Locale::Vi),
            "en" | "en-us" | "english" => Ok(Locale::En),
            other => Err(SmartStudyError::Config(format!(
                "Unsupported locale: {} (expected vi or en)",
                other
            ))),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Vi => write!(f, "vi"),
            Locale::En => write!(f, "en"),
        }
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student
    User,
    /// The model
    Assistant,
}

/// A single message in a chat view
///
/// Assistant messages are created empty and grow as streamed fragments
/// arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier (ULID)
    pub id: String,
    /// Who wrote the message
    pub role: Role,
    /// Message text
    pub text: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use smartstudy::types::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::user("Explain recursion");
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.text, "Explain recursion");
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Creates a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Creates an empty assistant message that streamed fragments fill in
    pub fn placeholder() -> Self {
        Self::new(Role::Assistant, String::new())
    }

    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// How demanding the generated schedule should be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    /// Light load with generous breaks
    Relaxed,
    /// Even split between study and rest
    #[default]
    Balanced,
    /// Heavy load, Pomodoro blocks
    Intense,
}

impl Intensity {
    /// Wire value used in prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Relaxed => "relaxed",
            Intensity::Balanced => "balanced",
            Intensity::Intense => "intense",
        }
    }

    /// Human label for the given locale
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Intensity::Relaxed, Locale::Vi) => "Thoải mái",
            (Intensity::Balanced, Locale::Vi) => "Cân bằng",
            (Intensity::Intense, Locale::Vi) => "Căng thẳng",
            (Intensity::Relaxed, Locale::En) => "Relaxed",
            (Intensity::Balanced, Locale::En) => "Balanced",
            (Intensity::Intense, Locale::En) => "Intense",
        }
    }
}

impl FromStr for Intensity {
    type Err = SmartStudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relaxed" => Ok(Intensity::Relaxed),
            "balanced" => Ok(Intensity::Balanced),
            "intense" => Ok(Intensity::Intense),
            other => Err(SmartStudyError::Config(format!(
                "Unknown intensity: {} (expected relaxed, balanced or intense)",
                other
            ))),
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for the schedule builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePreferences {
    /// Wake-up time, `HH:MM`
    pub wake_time: String,
    /// Bed time, `HH:MM`
    pub sleep_time: String,
    /// Free-form list of subjects or tasks
    pub subjects: String,
    /// Desired intensity
    pub intensity: Intensity,
}

impl Default for SchedulePreferences {
    fn default() -> Self {
        Self {
            wake_time: "07:00".to_string(),
            sleep_time: "23:00".to_string(),
            subjects: String::new(),
            intensity: Intensity::Balanced,
        }
    }
}

impl SchedulePreferences {
    /// Whether every required field is filled in
    ///
    /// Subjects must be non-blank and both times must be valid `HH:MM`.
    ///
    /// # Examples
    ///
    /// ```
    /// use smartstudy::types::SchedulePreferences;
    ///
    /// let mut prefs = SchedulePreferences::default();
    /// assert!(!prefs.is_complete());
    /// prefs.subjects = "Java basics".to_string();
    /// assert!(prefs.is_complete());
    /// ```
    pub fn is_complete(&self) -> bool {
        !self.subjects.trim().is_empty()
            && parse_clock_time(&self.wake_time).is_ok()
            && parse_clock_time(&self.sleep_time).is_ok()
    }
}

/// Parse a `HH:MM` wall-clock time
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, SmartStudyError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| SmartStudyError::Config(format!("Invalid time '{}': {}", value, e)))
}

/// Kind of activity in a schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Self-study block
    Study,
    /// Rest
    Break,
    /// Meals, hygiene, errands
    Personal,
    /// Scheduled lecture
    Class,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 4] = [
        Category::Study,
        Category::Break,
        Category::Personal,
        Category::Class,
    ];

    /// Wire value used in the response schema
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Study => "study",
            Category::Break => "break",
            Category::Personal => "personal",
            Category::Class => "class",
        }
    }

    /// Human label for the given locale
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Category::Study, Locale::Vi) => "Học tập",
            (Category::Break, Locale::Vi) => "Nghỉ ngơi",
            (Category::Personal, Locale::Vi) => "Cá nhân",
            (Category::Class, Locale::Vi) => "Lên lớp",
            (Category::Study, Locale::En) => "Study",
            (Category::Break, Locale::En) => "Break",
            (Category::Personal, Locale::En) => "Personal",
            (Category::Class, Locale::En) => "Class",
        }
    }

    /// Terminal color used for the timeline marker and label
    pub fn color(&self) -> colored::Color {
        match self {
            Category::Study => colored::Color::Blue,
            Category::Break => colored::Color::Green,
            Category::Personal => colored::Color::Yellow,
            Category::Class => colored::Color::Magenta,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a generated daily schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Time range, e.g. `07:00 - 08:00`
    pub time: String,
    /// Main activity
    pub activity: String,
    /// Details or advice
    pub notes: String,
    /// Activity kind
    pub category: Category,
}
