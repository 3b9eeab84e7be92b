//! Test utilities for SmartStudy
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, canned configuration and assertion
//! helpers.

use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Panics
///
/// Panics if the directory cannot be created
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration pointing the Gemini gateway at `api_base` with a test key
pub fn test_config(api_base: &str) -> Config {
    let mut config = Config::default();
    config.provider.gemini.api_base = api_base.to_string();
    config.provider.gemini.api_key = Some("test-key".to_string());
    config.provider.gemini.timeout_seconds = 5;
    config
}

/// A valid two-entry structured schedule payload
pub fn sample_schedule_json() -> String {
    r#"[
  {"time": "07:00 - 07:30", "activity": "Breakfast", "notes": "Eat well", "category": "personal"},
  {"time": "08:00 - 09:30", "activity": "Java basics", "notes": "Classes and objects", "category": "study"}
]"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmartStudyError;
    use crate::schema::schedule_schema;
    use crate::types::{Locale, ScheduleItem};

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(SmartStudyError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(SmartStudyError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_is_valid() {
        let config = test_config("http://127.0.0.1:1234");
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.gemini.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_sample_schedule_parses() {
        let items: Vec<ScheduleItem> = schedule_schema(Locale::En)
            .parse_records(&sample_schedule_json())
            .unwrap();
        assert_eq!(items.len(), 2);
    }
}
