//! Command-line interface definition for llamachat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat loop and session management commands.

use clap::{Parser, Subcommand};

/// llamachat - terminal chat with persistent sessions
///
/// Streams replies from an OpenAI-compatible endpoint and keeps every
/// conversation in a local SQLite database.
#[derive(Parser, Debug, Clone)]
#[command(name = "llamachat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Session database file (overrides config and LLAMACHAT_DB)
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for llamachat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive chat loop
    Chat {
        /// Session to open on start (id, id prefix or list position)
        #[arg(short, long)]
        session: Option<String>,

        /// Sampling temperature between 0.0 and 2.0
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage stored chat sessions
    Sessions {
        /// Session management subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List stored sessions
    List,

    /// Create an empty session
    New,

    /// Rename a session
    Rename {
        /// Session id, id prefix or list position
        id: String,

        /// New display name
        name: String,
    },

    /// Delete a session
    Delete {
        /// Session id, id prefix or list position
        id: String,
    },

    /// Print the messages of a session
    Show {
        /// Session id, id prefix or list position
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["llamachat", "chat"]).unwrap();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Chat {
                session: None,
                temperature: None,
                model: None
            }
        ));
    }

    #[test]
    fn test_cli_parse_chat_with_options() {
        let cli = Cli::try_parse_from([
            "llamachat",
            "chat",
            "--session",
            "2",
            "--temperature",
            "0.7",
            "--model",
            "llama3",
        ])
        .unwrap();
        if let Commands::Chat {
            session,
            temperature,
            model,
        } = cli.command
        {
            assert_eq!(session.as_deref(), Some("2"));
            assert_eq!(temperature, Some(0.7));
            assert_eq!(model.as_deref(), Some("llama3"));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_global_db_path_after_subcommand() {
        let cli = Cli::try_parse_from(["llamachat", "sessions", "list", "--db-path", "/tmp/a.db"])
            .unwrap();
        assert_eq!(cli.db_path.as_deref(), Some("/tmp/a.db"));
        assert!(matches!(
            cli.command,
            Commands::Sessions {
                command: SessionCommand::List
            }
        ));
    }

    #[test]
    fn test_cli_parse_sessions_rename() {
        let cli =
            Cli::try_parse_from(["llamachat", "sessions", "rename", "abcd1234", "Road trip"])
                .unwrap();
        if let Commands::Sessions {
            command: SessionCommand::Rename { id, name },
        } = cli.command
        {
            assert_eq!(id, "abcd1234");
            assert_eq!(name, "Road trip");
        } else {
            panic!("Expected Sessions Rename command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_delete_requires_id() {
        assert!(Cli::try_parse_from(["llamachat", "sessions", "delete"]).is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["llamachat"]).is_err());
    }
}
