/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`     — Interactive chat loop
- `sessions` — Non-interactive session management

Failures inside the chat loop are reported and the loop keeps running;
only setup errors end the program.
*/

use crate::chat::{ChatOrchestrator, ChatState};
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::providers::{create_provider, Provider};
use crate::session::SessionManager;
use crate::storage::SqliteStorage;
use colored::Colorize;
use std::sync::Arc;

// Special commands parser for the chat loop
pub mod special_commands;

// Session management commands
pub mod sessions;

/// Open the session store configured in `config`
pub fn open_storage(config: &Config) -> Result<SqliteStorage> {
    match &config.storage.db_path {
        Some(path) => SqliteStorage::new_with_path(path),
        None => SqliteStorage::new(),
    }
}

/// Print a non-fatal error
pub fn report(err: &anyhow::Error) {
    tracing::debug!("Action failed: {:?}", err);
    eprintln!("{}", format!("Error: {:#}", err).red());
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Loads the session collection, creates the provider and runs a
    //! readline-based loop. Each line is either a special command or a
    //! prompt for the selected session.

    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::io::Write;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `session` - Optional session to select on start
    pub async fn run_chat(config: Config, session: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let storage = open_storage(&config)?;
        tracing::info!("Using session database {}", storage.db_path().display());
        let (manager, skipped) = SessionManager::load_skipping_corrupt(storage)?;
        for err in skipped {
            report(&anyhow::Error::new(err));
        }
        let manager = manager.with_title_length(config.chat.title_length);
        sessions::warn_if_large(&manager, config.chat.large_session_warning);

        let provider: Arc<dyn Provider> = Arc::from(create_provider(&config.provider)?);
        let mut chat = ChatOrchestrator::new(manager, provider, config.provider.temperature)?;

        if let Some(key) = session.as_deref() {
            if let Err(e) = chat.sessions_mut().select(key) {
                report(&e);
            }
        }

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&chat);

        loop {
            let prompt = format_prompt(&chat);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => send_prompt(&mut chat, &line).await,
                        other => handle_special_command(&mut chat, other),
                    }
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

        if let Err(e) = chat.sessions().save_all() {
            report(&e);
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Stream a reply for `prompt`, printing tokens as they arrive
    async fn send_prompt(chat: &mut ChatOrchestrator, prompt: &str) {
        if chat.state() == ChatState::NoActiveSession {
            println!(
                "{}",
                "Please create (/new) or select (/select <n>) a chat session to start.".yellow()
            );
            return;
        }

        println!();
        let mut stdout = std::io::stdout();
        let result = chat
            .submit(prompt, |token| {
                let _ = write!(stdout, "{}", token);
                let _ = stdout.flush();
            })
            .await;
        println!("\n");

        match result {
            Ok(exchange) => {
                if let Some(name) = exchange.renamed_to {
                    println!("{}", format!("Session renamed to \"{}\"", name).dimmed());
                }
                if let Some(reason) = exchange.rename_error {
                    eprintln!("{}", format!("Error: could not rename session: {}", reason).red());
                }
            }
            Err(e) => report(&e),
        }
    }

    /// Apply a special command; errors are reported, never propagated
    pub fn handle_special_command(chat: &mut ChatOrchestrator, command: SpecialCommand) {
        let result: Result<()> = match command {
            SpecialCommand::NewSession => chat.sessions_mut().create().map(|session| {
                println!(
                    "{}",
                    format!("Started {} ({})", session.name, session.short_id()).green()
                );
            }),
            SpecialCommand::ListSessions => {
                sessions::print_session_table(chat.sessions());
                Ok(())
            }
            SpecialCommand::SelectSession(key) => {
                chat.sessions_mut().select(&key).map(|session| {
                    println!("{}", format!("Switched to {}", session.name).green());
                    sessions::print_transcript(session);
                })
            }
            SpecialCommand::RenameSession(name) => match chat.sessions().current_id() {
                Some(id) => {
                    let id = id.to_string();
                    chat.sessions_mut().rename(&id, &name).map(|applied| {
                        println!("{}", format!("Renamed to {}", applied).green());
                    })
                }
                None => Err(ChatError::NoActiveSession.into()),
            },
            SpecialCommand::DeleteSession(key) => {
                let key = key.or_else(|| chat.sessions().current_id().map(str::to_string));
                match key {
                    Some(key) => chat.sessions_mut().delete(&key).map(|removed| {
                        println!("{}", format!("Deleted {}", removed.name).green());
                    }),
                    None => Err(ChatError::NoActiveSession.into()),
                }
            }
            SpecialCommand::Temperature(None) => {
                println!("Temperature: {}", chat.temperature());
                Ok(())
            }
            SpecialCommand::Temperature(Some(value)) => {
                chat.set_temperature(value).map(|()| {
                    println!("{}", format!("Temperature set to {}", value).green());
                })
            }
            SpecialCommand::ShowHistory => match chat.sessions().current() {
                Some(session) => {
                    sessions::print_transcript(session);
                    Ok(())
                }
                None => Err(ChatError::NoActiveSession.into()),
            },
            SpecialCommand::ShowStatus => {
                print_status_display(chat);
                Ok(())
            }
            SpecialCommand::Help => {
                print_help();
                Ok(())
            }
            SpecialCommand::Exit | SpecialCommand::None => Ok(()),
        };

        if let Err(e) = result {
            report(&e);
        }
    }

    fn format_prompt(chat: &ChatOrchestrator) -> String {
        match chat.sessions().current() {
            Some(session) => format!("[{}] >> ", session.name.cyan()),
            None => format!("[{}] >> ", "no session".dimmed()),
        }
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(chat: &ChatOrchestrator) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                 llamachat - Interactive Chat                 ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model:       {}", chat.model().cyan());
        println!("Temperature: {}", chat.temperature());
        println!("Sessions:    {}\n", chat.sessions().len());
        if chat.state() == ChatState::NoActiveSession {
            println!("Use '/new' to start a conversation or '/sessions' to pick one.");
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display detailed status information about the current session
    fn print_status_display(chat: &ChatOrchestrator) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                        Session Status                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model:             {}", chat.model());
        println!("Temperature:       {}", chat.temperature());
        println!(
            "Database:          {}",
            chat.sessions().storage().db_path().display()
        );
        println!("Stored Sessions:   {}", chat.sessions().len());
        match chat.sessions().current() {
            Some(session) => {
                println!("Current Session:   {} ({})", session.name, session.short_id());
                println!("Conversation Size: {} messages", session.messages.len());
            }
            None => println!("Current Session:   {}", "none".dimmed()),
        }
        println!();
    }
}
