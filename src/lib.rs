//! SmartStudy - study assistant library
//!
//! This library provides the core functionality for SmartStudy: a lecture
//! summarizer, a daily schedule builder and a streaming study chatbot, all
//! backed by a hosted language model.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `providers`: Model gateway abstraction, Gemini implementation and test fake
//! - `prompts`: Prompt builders and per-feature personas
//! - `schema`: Structured-output schema descriptor and record validation
//! - `controllers`: View controllers (summarizer, scheduler, chatbot)
//! - `commands`: Terminal command handlers and rendering
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use smartstudy::controllers::SummarizerController;
//! use smartstudy::providers::create_gateway;
//! use smartstudy::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let gateway = create_gateway(&config.provider)?;
//!     let summarizer = SummarizerController::new(gateway, config.app.locale);
//!     summarizer.set_input("Object-oriented programming basics").await;
//!     summarizer.submit().await;
//!     println!("{}", summarizer.snapshot().await.summary);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod controllers;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use controllers::{ChatController, SchedulerController, SubmitOutcome, SummarizerController};
pub use error::{Result, SmartStudyError};
pub use providers::{ChatSession, ModelGateway};

#[cfg(test)]
pub mod test_utils;
