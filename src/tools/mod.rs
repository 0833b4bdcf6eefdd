//! Tools module - tool definitions and the tool registry
//!
//! Contains the tool abstraction, the ordered registry, and the built-in
//! math and lookup tools.

pub mod lookup;
pub mod math;
pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolBuilder, ToolParameter};
