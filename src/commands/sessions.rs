use crate::cli::SessionCommand;
use crate::commands::open_storage;
use crate::config::Config;
use crate::error::Result;
use crate::providers::Role;
use crate::session::SessionManager;
use crate::storage::Session;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle `sessions` subcommands
pub fn handle_sessions(config: &Config, command: SessionCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let mut manager = SessionManager::load(storage)?;

    match command {
        SessionCommand::List => {
            print_session_table(&manager);
            warn_if_large(&manager, config.chat.large_session_warning);
        }
        SessionCommand::New => {
            let session = manager.create()?;
            println!(
                "{}",
                format!("Created {} ({})", session.name, session.short_id()).green()
            );
        }
        SessionCommand::Rename { id, name } => {
            let applied = manager.rename(&id, &name)?;
            println!("{}", format!("Renamed session to {}", applied).green());
        }
        SessionCommand::Delete { id } => {
            let removed = manager.delete(&id)?;
            println!(
                "{}",
                format!("Deleted {} ({})", removed.name, removed.short_id()).green()
            );
        }
        SessionCommand::Show { id } => {
            let id = manager.resolve(&id)?;
            if let Some(session) = manager.get(&id) {
                print_transcript(session);
            }
        }
    }

    Ok(())
}

/// Print the session list as a table, marking the selected session
pub fn print_session_table(manager: &SessionManager) {
    if manager.is_empty() {
        println!("{}", "No chat sessions found.".yellow());
        println!("Use {} to start one.", "/new".cyan());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "ID".bold(),
        "Name".bold(),
        "Messages".bold()
    ]);

    for (index, session) in manager.sessions().iter().enumerate() {
        let selected = manager.current_id() == Some(session.id.as_str());
        let marker = if selected {
            format!("{}*", index + 1).green().bold()
        } else {
            format!("{}", index + 1).normal()
        };
        let name = if session.name.chars().count() > 40 {
            format!("{}...", session.name.chars().take(37).collect::<String>())
        } else {
            session.name.clone()
        };

        table.add_row(prettytable::row![
            marker,
            session.short_id().cyan(),
            name,
            session.messages.len()
        ]);
    }

    println!("\nChat Sessions:");
    table.printstd();
    println!();
}

/// Print every message of a session
pub fn print_transcript(session: &Session) {
    println!("\n{}", session.name.bold());
    if session.messages.is_empty() {
        println!("{}", "(no messages yet)".dimmed());
    }
    for message in &session.messages {
        let label = match message.role {
            Role::User => "you".cyan().bold(),
            Role::Assistant => "assistant".magenta().bold(),
        };
        println!("\n{}:\n{}", label, message.content);
    }
    println!();
}

/// Suggest archiving when many sessions are loaded
pub fn warn_if_large(manager: &SessionManager, threshold: usize) {
    if manager.is_large(threshold) {
        tracing::warn!(count = manager.len(), "Large number of sessions loaded");
        println!(
            "{}",
            format!(
                "You have {} sessions. Consider deleting or archiving old sessions to keep startup fast.",
                manager.len()
            )
            .yellow()
        );
    }
}
