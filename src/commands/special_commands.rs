//! Special commands parser for interactive chat
//!
//! Special commands are prefixed with `/` and are case-insensitive. They
//! control the session instead of being sent to the study bot:
//! - `/new` starts a fresh conversation
//! - `/status` shows the current session
//! - `/help` lists the commands
//! - `/exit` leaves the chat

use colored::Colorize;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command does not take arguments but was given one
    #[error("{command} does not take arguments (got: {arg})")]
    UnexpectedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Discard the conversation and start a new session
    NewSession,

    /// Show the session id and message count
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a chat message
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if the input starts with `/` but is
/// not a known command, and `CommandError::UnexpectedArgument` if a known
/// command is followed by extra text.
///
/// # Examples
///
/// ```
/// use smartstudy::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewSession);
/// assert_eq!(parse_special_command("exit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(
///     parse_special_command("What is polymorphism?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return match lower.as_str() {
            "exit" | "quit" => Ok(SpecialCommand::Exit),
            _ => Ok(SpecialCommand::None),
        };
    }

    let (command, arg) = match lower.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (lower.as_str(), ""),
    };

    let parsed = match command {
        "/new" | "/reset" | "/clear" => SpecialCommand::NewSession,
        "/status" => SpecialCommand::ShowStatus,
        "/help" | "/?" => SpecialCommand::Help,
        "/exit" | "/quit" => SpecialCommand::Exit,
        _ => return Err(CommandError::UnknownCommand(trimmed.to_string())),
    };

    if !arg.is_empty() {
        return Err(CommandError::UnexpectedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        });
    }

    Ok(parsed)
}

/// Print help for the special commands
pub fn print_help() {
    println!(
        r#"
{}
  /new, /reset    - Start a new conversation (clears all messages)
  /status         - Show the current session and message count
  /help, /?       - Show this help
  /exit, /quit    - Leave the chat (also: exit, quit, Ctrl-D)

Anything else is sent to the study bot.
"#,
        "Chat Commands".bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("Giải thích đa hình trong Java").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_new_session_aliases() {
        for input in ["/new", "/reset", "/clear", "/NEW", "  /new  "] {
            assert_eq!(
                parse_special_command(input).unwrap(),
                SpecialCommand::NewSession,
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_help_and_status() {
        assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
        assert_eq!(
            parse_special_command("/status").unwrap(),
            SpecialCommand::ShowStatus
        );
    }

    #[test]
    fn test_exit_variants() {
        for input in ["/exit", "/quit", "exit", "QUIT"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_exit_word_inside_sentence_is_a_message() {
        assert_eq!(
            parse_special_command("how do I exit a loop?").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_special_command("/mode write").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/mode write".to_string()));
        assert!(err.to_string().contains("/help"));
    }

    #[test]
    fn test_unexpected_argument() {
        let err = parse_special_command("/new now").unwrap_err();
        assert_eq!(
            err,
            CommandError::UnexpectedArgument {
                command: "/new".to_string(),
                arg: "now".to_string()
            }
        );
    }
}
