//! SmartStudy - study assistant CLI
//!
#![doc = "Main entry point for the SmartStudy application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smartstudy::cli::{Cli, Commands};
use smartstudy::commands;
use smartstudy::config::Config;
use smartstudy::types::SchedulePreferences;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Summarize { file, text } => {
            tracing::info!("Starting summarizer");
            if let Some(path) = &file {
                tracing::debug!("Reading content from: {}", path.display());
            }
            commands::summarize::run_summarize(config, file, text).await?;
            Ok(())
        }
        Commands::Schedule {
            wake,
            sleep,
            subjects,
            intensity,
            json,
        } => {
            tracing::info!("Starting schedule builder");
            let preferences = SchedulePreferences {
                wake_time: wake,
                sleep_time: sleep,
                subjects,
                intensity,
            };
            commands::schedule::run_schedule(config, preferences, json).await?;
            Ok(())
        }
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with rendered output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "smartstudy=debug"
    } else {
        "smartstudy=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
