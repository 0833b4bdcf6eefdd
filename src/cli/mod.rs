//! CLI module - command-line interface
//!
//! Contains the REPL, command parsing and the per-user session.

pub mod commands;
pub mod repl;
pub mod session;

pub use repl::Repl;
pub use session::{Session, SessionMode};
