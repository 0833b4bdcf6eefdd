//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::cli::session::{Session, SessionMode};
use crate::core::Result;

/// Result of parsing a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
    /// No output needed
    None,
}

/// Parse and handle special commands.
///
/// A command must make up the whole line, so "history of Rome" is chat input.
/// `mode` is the only command with an argument; a bare `mode <x>` is a command
/// only when `<x>` names a mode. A leading `/` marks the line as a command.
pub fn handle_command(input: &str, session: &mut Session) -> Result<CommandResult> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(CommandResult::None);
    }

    let slashed = input.starts_with('/');
    let line = input.trim_start_matches('/').to_lowercase();
    let (cmd, args) = match line.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (line.as_str(), ""),
    };

    if !args.is_empty() {
        if cmd == "mode" {
            match args.parse::<SessionMode>() {
                Ok(mode) => {
                    session.set_mode(mode);
                    return Ok(CommandResult::Handled(format!("Mode set to: {}", mode)));
                }
                Err(e) if slashed => return Ok(CommandResult::Handled(e.to_string())),
                Err(_) => {}
            }
        }
        return Ok(unhandled(input, slashed, cmd));
    }

    match cmd {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "reset" => {
            session.clear();
            Ok(CommandResult::Clear)
        }

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "history" => Ok(CommandResult::Handled(history(session))),

        "stats" => Ok(CommandResult::Handled(session.memory().stats().to_string())),

        "status" => {
            let config = session.config();
            let status = format!(
                "Parley Status:\n\
                 ─────────────────────────────\n\
                 Model:     {} ({})\n\
                 Mode:      {}\n\
                 Memory:    {} turns, summaries {}\n\
                 Strategy:  {}\n\
                 \n{}",
                config.generation.model,
                session.generator_name(),
                session.mode(),
                session.memory().capacity(),
                if session.memory().is_summarizing() {
                    "on"
                } else {
                    "off"
                },
                config.agents.strategy,
                session.orchestrator().status()
            );
            Ok(CommandResult::Handled(status))
        }

        "summary" | "summaries" => {
            let summaries = session.memory().summaries();
            if summaries.is_empty() {
                return Ok(CommandResult::Handled("No summaries yet.".to_string()));
            }
            let output = summaries
                .iter()
                .enumerate()
                .map(|(i, s)| format!("{}. {}", i + 1, s))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(CommandResult::Handled(output))
        }

        "context" => {
            let context = session.memory().render_context();
            if context.is_empty() {
                Ok(CommandResult::Handled("Context is empty.".to_string()))
            } else {
                Ok(CommandResult::Handled(context.trim_end().to_string()))
            }
        }

        "mode" => Ok(CommandResult::Handled(format!(
            "Current mode: {}",
            session.mode()
        ))),

        _ => Ok(unhandled(input, slashed, cmd)),
    }
}

fn unhandled(input: &str, slashed: bool, cmd: &str) -> CommandResult {
    if slashed {
        CommandResult::Handled(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            cmd
        ))
    } else {
        CommandResult::Continue(input.to_string())
    }
}

fn history(session: &Session) -> String {
    let turns = session.memory().get();
    if turns.is_empty() {
        return "No conversation history yet.".to_string();
    }
    turns
        .iter()
        .enumerate()
        .map(|(i, turn)| format!("{:>2}. {}", i + 1, turn.transcript_line()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate help text
fn help_text() -> String {
    r#"Parley Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit Parley
  clear, reset     Clear conversation memory
  history          Show buffered turns
  stats            Show memory usage
  summary          Show stored summaries
  context          Show the context sent to the model
  status           Show model, mode and agents
  mode [chat|agents]   Show or switch the session mode

Keyboard Shortcuts:
  Ctrl+D           Exit Parley
─────────────────────────────────────────────"#
        .to_string()
}
