//! # Run State
//!
//! Per-run result slots and the session registry.

pub mod results;
pub mod session;

pub use results::ResultMap;
pub use session::{RunContext, Session, SessionGuard, SessionService};
