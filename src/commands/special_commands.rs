//! Special commands parser for interactive chat mode
//!
//! Special commands manage sessions and settings instead of being sent to
//! the model:
//! - Create, list, select, rename and delete sessions
//! - Show or change the sampling temperature
//! - Show the selected conversation and status
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/`. Command words are case-insensitive,
//! arguments keep their case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialCommand {
    /// Start a new empty session and select it
    NewSession,

    /// List sessions, marking the selected one
    ListSessions,

    /// Select a session by position, id or id prefix
    SelectSession(String),

    /// Rename the selected session
    RenameSession(String),

    /// Delete a session; the selected one when no argument is given
    DeleteSession(Option<String>),

    /// Show the temperature, or set it when a value is given
    Temperature(Option<f32>),

    /// Print the messages of the selected session
    ShowHistory,

    /// Display model, temperature, database and session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the model as a prompt.
    None,
}

/// Parse user input into a special command
///
/// # Examples
///
/// ```
/// use llamachat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewSession);
/// assert_eq!(
///     parse_special_command("/rename Road Trip").unwrap(),
///     SpecialCommand::RenameSession("Road Trip".to_string())
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), Some(rest.trim())),
        None => (lower, None),
    };
    let arg = arg.filter(|a| !a.is_empty());

    match (command.as_str(), arg) {
        ("/new", None) => Ok(SpecialCommand::NewSession),
        ("/sessions" | "/list" | "/ls", None) => Ok(SpecialCommand::ListSessions),

        ("/select" | "/open", Some(key)) => Ok(SpecialCommand::SelectSession(key.to_string())),
        ("/select" | "/open", None) => Err(CommandError::MissingArgument {
            command: "/select".to_string(),
            usage: "/select <number|id>".to_string(),
        }),

        ("/rename", Some(name)) => Ok(SpecialCommand::RenameSession(name.to_string())),
        ("/rename", None) => Err(CommandError::MissingArgument {
            command: "/rename".to_string(),
            usage: "/rename <new name>".to_string(),
        }),

        ("/delete" | "/rm", key) => Ok(SpecialCommand::DeleteSession(key.map(str::to_string))),

        ("/temperature" | "/temp", None) => Ok(SpecialCommand::Temperature(None)),
        ("/temperature" | "/temp", Some(value)) => value
            .parse::<f32>()
            .map(|t| SpecialCommand::Temperature(Some(t)))
            .map_err(|_| CommandError::UnsupportedArgument {
                command: "/temperature".to_string(),
                arg: value.to_string(),
            }),

        ("/history", None) => Ok(SpecialCommand::ShowHistory),
        ("/status", None) => Ok(SpecialCommand::ShowStatus),
        ("/help" | "/?", None) => Ok(SpecialCommand::Help),
        ("/exit" | "/quit", None) => Ok(SpecialCommand::Exit),

        (
            "/new" | "/sessions" | "/list" | "/ls" | "/history" | "/status" | "/help" | "/?"
            | "/exit" | "/quit",
            Some(extra),
        ) => Err(CommandError::UnsupportedArgument {
            command: command.clone(),
            arg: extra.to_string(),
        }),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for the interactive chat commands
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

SESSIONS:
  /new                 - Start a new conversation and select it
  /sessions            - List conversations (aliases: /list, /ls)
  /select <n|id>       - Switch to a conversation by number or id prefix
  /rename <name>       - Rename the current conversation
  /delete [n|id]       - Delete a conversation (default: the current one)
  /history             - Print the current conversation

SETTINGS:
  /temperature [t]     - Show or set sampling temperature (0.0 - 2.0)
  /status              - Show model, temperature and session status

OTHER:
  /help                - Show this help message
  exit, quit, /exit    - Leave chat

Anything else is sent to the model as part of the current conversation.
The first message of a new conversation also becomes its name.
"#
    );
}
