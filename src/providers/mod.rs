//! Provider module for SmartStudy
//!
//! This module contains the model gateway abstraction, the Gemini
//! implementation and a scripted fake for tests.

pub mod base;
pub mod fake;
pub mod gemini;
pub mod sse;

pub use base::{complete_records, ChatSession, FragmentStream, ModelGateway, Turn, TurnRole};
pub use fake::{FakeCall, FakeCallKind, FakeFailure, FakeGateway};
pub use gemini::GeminiGateway;

use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::{Result, SmartStudyError};

/// Create a gateway instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a shared gateway that controllers can hold
///
/// # Errors
///
/// Returns error if the provider type is unknown or the provider cannot be
/// initialized (for example, a missing API key)
///
/// # Examples
///
/// ```no_run
/// use smartstudy::config::ProviderConfig;
/// use smartstudy::providers::create_gateway;
///
/// # fn example() -> smartstudy::error::Result<()> {
/// let mut config = ProviderConfig::default();
/// config.gemini.api_key = Some("my-key".to_string());
/// let gateway = create_gateway(&config)?;
/// # Ok(())
/// # }
/// ```
pub fn create_gateway(config: &ProviderConfig) -> Result<Arc<dyn ModelGateway>> {
    match config.provider_type.as_str() {
        "gemini" => Ok(Arc::new(GeminiGateway::new(config.gemini.clone())?)),
        other => Err(SmartStudyError::Config(format!("Unknown provider type: {}", other)).into()),
    }
}
