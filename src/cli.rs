//! Command-line interface definition for SmartStudy
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for summarizing, schedule building, and chat.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{Intensity, Locale};

/// SmartStudy - study assistant for students
///
/// Summarize lecture notes, build a daily study schedule, or chat with a
/// study bot backed by Gemini.
#[derive(Parser, Debug, Clone)]
#[command(name = "smartstudy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Language for prompts and messages (vi, en)
    #[arg(short, long, global = true)]
    pub locale: Option<Locale>,

    /// Override the model from config
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for SmartStudy
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Summarize lecture content
    ///
    /// Reads the text from the arguments, from --file, or from stdin.
    Summarize {
        /// Read content from a text or Markdown file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Content to summarize
        text: Vec<String>,
    },

    /// Build a daily study schedule
    Schedule {
        /// Wake-up time (HH:MM)
        #[arg(short, long, default_value = "07:00")]
        wake: String,

        /// Bed time (HH:MM)
        #[arg(short = 'S', long, default_value = "23:00")]
        sleep: String,

        /// Subjects or tasks to fit into the day
        #[arg(short, long)]
        subjects: String,

        /// Intensity: relaxed, balanced or intense
        #[arg(short, long, default_value = "balanced")]
        intensity: Intensity,

        /// Print the schedule as JSON instead of a timeline
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive chat with the study bot
    Chat,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            locale: None,
            model: None,
            command: Commands::Chat,
        }
    }
}
