//! Interactive REPL for Parley
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::cli::commands::{handle_command, CommandResult};
use crate::cli::session::Session;
use crate::core::Result;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    session: Session,
}

impl Repl {
    /// Create a REPL around a prepared session
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the REPL until exit or EOF
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            match handle_command(&input, &mut self.session) {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Clear) => {
                    println!("Conversation cleared.\n");
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                }
                Ok(CommandResult::None) => {}
                Ok(CommandResult::Continue(input)) => match self.session.respond(&input).await {
                    Ok(response) => println!("\nAssistant: {}\n", response),
                    Err(e) => {
                        tracing::error!(error = %e, "Request failed");
                        println!("\nAssistant: {}\n", e.apology());
                    }
                },
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.session.config();

        println!();
        println!("Parley - local chat with rolling memory");
        println!("─────────────────────────────────────────────");
        println!("Ollama:  {}", config.ollama_url());
        println!("Model:   {}", config.generation.model);
        println!("Mode:    {}", self.session.mode());
        println!(
            "Memory:  last {} exchanges{}",
            config.memory.max_turns,
            if config.memory.summarize {
                ", older turns summarized"
            } else {
                ""
            }
        );
        println!();
        println!("Commands: help, history, stats, status, mode, clear, exit");
        println!("─────────────────────────────────────────────");
    }
}
