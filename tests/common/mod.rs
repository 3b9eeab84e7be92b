use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use smartstudy::config::GeminiConfig;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Gemini configuration pointing at a mock server
#[allow(dead_code)]
pub fn gemini_config(api_base: &str) -> GeminiConfig {
    GeminiConfig {
        api_base: api_base.to_string(),
        api_key: Some("test-key".to_string()),
        timeout_seconds: 5,
        ..Default::default()
    }
}

/// A `generateContent` response body carrying `text`
#[allow(dead_code)]
pub fn text_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

/// An SSE body with one event per fragment
#[allow(dead_code)]
pub fn sse_body(fragments: &[&str]) -> String {
    fragments
        .iter()
        .map(|fragment| format!("data: {}\r\n\r\n", text_response(fragment)))
        .collect()
}

/// Gemini configuration with a one-second request timeout
#[allow(dead_code)]
pub fn slow_gemini_config(api_base: &str) -> GeminiConfig {
    GeminiConfig {
        timeout_seconds: 1,
        ..gemini_config(api_base)
    }
}
