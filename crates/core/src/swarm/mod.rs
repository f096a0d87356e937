//! # Swarm Orchestration
//!
//! Coordinates the research agents and the synthesis agent.
//!
//! ## Pipeline Flow
//!
//! ```text
//! User request → Runner → Pipeline → FanOut [3 researchers] → ResultMap → Synthesis → Report
//! ```

pub mod events;
pub mod executor;
pub mod parallel;
pub mod pipeline;
pub mod runner;
pub mod synthesis;

pub use events::{EventSink, RunEvent, RunEventKind, StreamItem};
pub use executor::{AgentExecutor, RadkitExecutor, TaskInput};
pub use parallel::FanOut;
pub use pipeline::{Pipeline, PipelineStage, RunStream};
pub use runner::{drain_final, Runner};
pub use synthesis::SynthesisStep;
