//! # Radkit-Compatible Tools
//!
//! Tools annotated with `#[tool]` macro for use by the research agents.

pub mod search_tools;
