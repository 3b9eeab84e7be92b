/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `summarize` — Summarize lecture content once
- `schedule`  — Build a daily study schedule once
- `chat`      — Interactive chat with the study bot

Each handler creates the gateway, builds one view controller and renders
the controller's events while its request runs.
*/

use std::future::Future;
use std::io::Write;

use tokio::sync::mpsc;

use crate::error::Result;

// Special commands parser for the chat loop
pub mod special_commands;

// Event and snapshot rendering
pub mod render;

/// Run `task` while feeding every event it publishes to `on_event`
///
/// Events still queued when the task finishes are delivered before this
/// returns, so the terminal is fully up to date.
pub(crate) async fn drive_with_events<T, E>(
    task: impl Future<Output = T>,
    events: &mut mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> T {
    tokio::pin!(task);
    let output = loop {
        tokio::select! {
            biased;
            Some(event) = events.recv() => on_event(event),
            output = &mut task => break output,
        }
    };
    while let Ok(event) = events.try_recv() {
        on_event(event);
    }
    output
}

fn print_flush(text: &str) {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

// Summarize command handler
pub mod summarize {
    //! One-shot lecture summarizer.

    use super::*;
    use crate::config::Config;
    use crate::controllers::{SubmitOutcome, SummarizerController, SummarizerEvent, ViewState};
    use crate::error::SmartStudyError;
    use crate::providers::create_gateway;
    use colored::Colorize;
    use std::io::Read;
    use std::path::{Path, PathBuf};

    /// File extensions accepted by `--file`
    const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

    /// Summarize text from the arguments, a file, or stdin
    ///
    /// # Errors
    ///
    /// Returns error if there is no content, the file cannot be read, the
    /// gateway cannot be created, or the summary request failed.
    pub async fn run_summarize(config: Config, file: Option<PathBuf>, text: Vec<String>) -> Result<()> {
        let content = read_content(file.as_deref(), &text)?;
        tracing::info!("Summarizing {} characters", content.chars().count());

        let locale = config.app.locale;
        let gateway = create_gateway(&config.provider)?;
        let controller = SummarizerController::new(gateway, locale);
        let mut events = controller.subscribe();

        controller.set_input(content).await;
        let outcome = drive_with_events(controller.submit(), &mut events, |event| {
            if let SummarizerEvent::StateChanged(ViewState::AwaitingResponse) = event {
                eprintln!("{}", super::render::waiting_message(locale).dimmed());
            }
        })
        .await;

        let view = controller.snapshot().await;
        match outcome {
            SubmitOutcome::Failed => Err(SmartStudyError::Provider(view.summary).into()),
            _ => {
                println!("{}", view.summary);
                Ok(())
            }
        }
    }

    /// Resolve the content to summarize
    ///
    /// Positional text wins over `--file`; with neither, stdin is read.
    pub fn read_content(file: Option<&Path>, text: &[String]) -> Result<String> {
        let content = if !text.is_empty() {
            text.join(" ")
        } else if let Some(path) = file {
            read_file(path)?
        } else {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        };

        if content.trim().is_empty() {
            return Err(SmartStudyError::Config("Nothing to summarize: input is empty".to_string()).into());
        }
        Ok(content)
    }

    fn read_file(path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SmartStudyError::Config(format!(
                "Unsupported file type: {} (expected .txt or .md)",
                path.display()
            ))
            .into());
        }

        Ok(std::fs::read_to_string(path)?)
    }

}

// Schedule command handler
pub mod schedule {
    //! One-shot daily schedule builder.

    use super::*;
    use crate::config::Config;
    use crate::controllers::{SchedulerController, SchedulerEvent, SubmitOutcome, ViewState};
    use crate::error::SmartStudyError;
    use crate::providers::create_gateway;
    use crate::types::{parse_clock_time, SchedulePreferences};
    use colored::Colorize;

    /// Build and print a schedule for `preferences`
    ///
    /// # Errors
    ///
    /// Returns error if the preferences are incomplete, the gateway cannot
    /// be created, or the request failed with a network or provider error.
    pub async fn run_schedule(config: Config, preferences: SchedulePreferences, json: bool) -> Result<()> {
        validate_preferences(&preferences)?;

        let locale = config.app.locale;
        let gateway = create_gateway(&config.provider)?;
        let controller = SchedulerController::new(gateway, locale);
        let mut events = controller.subscribe();

        controller.set_preferences(preferences).await;
        let outcome = drive_with_events(controller.submit(), &mut events, |event| {
            if let SchedulerEvent::StateChanged(ViewState::AwaitingResponse) = event {
                eprintln!("{}", super::render::waiting_message(locale).dimmed());
            }
        })
        .await;

        let view = controller.snapshot().await;
        if outcome == SubmitOutcome::Failed {
            let banner = view.error.unwrap_or_default();
            return Err(SmartStudyError::Provider(banner).into());
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&view.items)?);
        } else {
            print!("{}", super::render::render_timeline(&view.items, locale));
        }
        Ok(())
    }

    /// Report why a preference set cannot be submitted
    pub fn validate_preferences(preferences: &SchedulePreferences) -> Result<()> {
        parse_clock_time(&preferences.wake_time)?;
        parse_clock_time(&preferences.sleep_time)?;
        if preferences.subjects.trim().is_empty() {
            return Err(SmartStudyError::Config("Subjects cannot be empty".to_string()).into());
        }
        Ok(())
    }

}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Creates the gateway and a `ChatController`, then runs a
    //! readline-based loop that sends each line and prints the reply as it
    //! streams in.

    use super::*;
    use crate::commands::render::ChatPrinter;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::config::Config;
    use crate::controllers::{ChatController, ChatView};
    use crate::providers::create_gateway;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat
    ///
    /// # Errors
    ///
    /// Returns error if the gateway or the line editor cannot be created.
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let locale = config.app.locale;
        let gateway = create_gateway(&config.provider)?;
        let controller = ChatController::new(gateway, locale, config.app.chat.show_greeting);
        let mut events = controller.subscribe();
        let mut printer = ChatPrinter::new(locale);

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config.provider.gemini.model);
        for message in controller.snapshot().await.messages {
            print!("{}", printer.render_message(&message));
        }
        println!();

        loop {
            let prompt = format!("{} ", ">>".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::NewSession) => {
                            drive_with_events(controller.reset(), &mut events, |event| {
                                if let Some(text) = printer.render(&event) {
                                    print_flush(&text);
                                }
                            })
                            .await;
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status(&controller.snapshot().await);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    controller.set_input(trimmed).await;
                    let outcome = drive_with_events(controller.send(), &mut events, |event| {
                        if let Some(text) = printer.render(&event) {
                            print_flush(&text);
                        }
                    })
                    .await;
                    tracing::debug!("Chat send finished: {:?}", outcome);
                    println!();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Display welcome banner at the start of interactive chat
    fn print_welcome_banner(model: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              SmartStudy Chat - Study Assistant               ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model: {}", model.cyan());
        println!("Type '/help' for available commands, '/exit' to quit\n");
    }

    /// Display the current session status
    fn print_status(view: &ChatView) {
        println!("\n{}", "Session Status".bold());
        println!("  Session:  {}", view.session_id);
        println!("  Messages: {}", view.messages.len());
        println!("  State:    {:?}\n", view.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drive_with_events_delivers_everything_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = async move {
            tx.send(1).unwrap();
            tokio::task::yield_now().await;
            tx.send(2).unwrap();
            tx.send(3).unwrap();
            "done"
        };

        let mut seen = Vec::new();
        let output = drive_with_events(task, &mut rx, |e| seen.push(e)).await;

        assert_eq!(output, "done");
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
