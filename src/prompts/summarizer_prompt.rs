//! Summarizer prompts
//!
//! Builds the lecture-summary instruction and the summarizer persona.

use crate::types::Locale;

/// Persona for the summarizer feature
pub fn summarizer_persona(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Bạn là một trợ lý học tập thông minh cho sinh viên đại học.",
        Locale::En => "You are a smart study assistant for university students.",
    }
}

/// Builds the summary instruction for a block of lecture content
///
/// The content is appended verbatim after the instruction.
///
/// # Examples
///
/// ```
/// use smartstudy::prompts::summarizer_prompt::summary_prompt;
/// use smartstudy::types::Locale;
///
/// let prompt = summary_prompt("Photosynthesis converts light to energy.", Locale::En);
/// assert!(prompt.contains("Markdown"));
/// assert!(prompt.ends_with("Photosynthesis converts light to energy."));
/// ```
pub fn summary_prompt(text: &str, locale: Locale) -> String {
    match locale {
        Locale::Vi => format!(
            "Hãy tóm tắt nội dung bài giảng sau đây một cách ngắn gọn, súc tích, tập trung vào các ý chính và định nghĩa quan trọng. Định dạng đầu ra bằng Markdown.\n\nNội dung:\n{}",
            text
        ),
        Locale::En => format!(
            "Summarize the following lecture content briefly and concisely, focusing on the main ideas and key definitions. Format the output as Markdown.\n\nContent:\n{}",
            text
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_vi_contains_content() {
        let prompt = summary_prompt("Định luật Ohm: U = I * R", Locale::Vi);
        assert!(prompt.starts_with("Hãy tóm tắt"));
        assert!(prompt.contains("Markdown"));
        assert!(prompt.ends_with("Định luật Ohm: U = I * R"));
    }

    #[test]
    fn test_summary_prompt_is_deterministic() {
        assert_eq!(
            summary_prompt("abc", Locale::En),
            summary_prompt("abc", Locale::En)
        );
    }

    #[test]
    fn test_personas_differ_by_locale() {
        assert_ne!(summarizer_persona(Locale::Vi), summarizer_persona(Locale::En));
    }
}
