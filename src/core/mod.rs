//! Core module - shared infrastructure for Parley
//!
//! This module contains foundational types, configuration, logging and error
//! handling used throughout the application.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{Config, StrategyKind};
pub use error::{ParleyError, Result};
pub use types::*;
