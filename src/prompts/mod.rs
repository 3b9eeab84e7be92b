//! Prompt builders and per-feature personas
//!
//! Every function here is pure: the same inputs always produce the same
//! prompt text.

pub mod chatbot_prompt;
pub mod scheduler_prompt;
pub mod summarizer_prompt;

pub use chatbot_prompt::{chat_greeting, chat_persona};
pub use scheduler_prompt::{schedule_prompt, scheduler_persona};
pub use summarizer_prompt::{summarizer_persona, summary_prompt};

/// Feature a persona belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Lecture summarizer
    Summarizer,
    /// Daily schedule builder
    Scheduler,
    /// Study chatbot
    Chatbot,
}

/// Fixed system instruction for a feature
///
/// # Examples
///
/// ```
/// use smartstudy::prompts::{build_system_instruction, Feature};
/// use smartstudy::types::Locale;
///
/// let persona = build_system_instruction(Feature::Chatbot, Locale::En);
/// assert!(persona.contains("SmartStudy Bot"));
/// ```
pub fn build_system_instruction(feature: Feature, locale: crate::types::Locale) -> &'static str {
    match feature {
        Feature::Summarizer => summarizer_persona(locale),
        Feature::Scheduler => scheduler_persona(locale),
        Feature::Chatbot => chat_persona(locale),
    }
}
