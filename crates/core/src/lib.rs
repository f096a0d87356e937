//! # Canopy Core
//!
//! Parallel research and synthesis pipeline for sustainability reports.
//!
//! ## Architecture
//!
//! - `config` - `.env` loading and the resolved `Environment`
//! - `models` - LLM provider configuration
//! - `skills` - Agent declarations, radkit-backed skills, search tool
//! - `state` - Result slots and sessions
//! - `swarm` - Fan-out, synthesis, pipeline and run driver
//!
//! ## Usage
//!
//! ```rust,ignore
//! use canopy_core::config::{initialize, AppConfig};
//! use canopy_core::swarm::{Pipeline, RadkitExecutor, Runner};
//! use std::sync::Arc;
//!
//! let env = initialize(&AppConfig::default());
//! let executor = Arc::new(RadkitExecutor::new(env.model.clone()));
//! let runner = Runner::from_environment(&env, Pipeline::default(), executor);
//! let report = runner
//!     .run(env.require_credential()?, "Generate the sustainability report.", |_| {})
//!     .await?;
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod skills;
pub mod state;
pub mod swarm;

pub use config::{initialize, AppConfig, Credential, Environment};
pub use errors::PipelineError;
