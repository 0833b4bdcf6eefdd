//! Memory module - rolling conversation memory
//!
//! Keeps recent turns verbatim and older turns as model-written summaries.

pub mod rolling;
pub mod summary;

pub use rolling::{MemoryStats, RollingMemory};
pub use summary::Summarizer;
