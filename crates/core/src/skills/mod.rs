//! # Canopy Skills
//!
//! Agent declarations and the radkit-backed skills that execute them.
//!
//! ## Architecture
//!
//! ```text
//! TaskDescriptor (agent_definitions)
//!   └── Skill (ResearcherSkill / SynthesisSkill)
//!         └── Tools (#[tool] functions)
//! ```

pub mod llm_helpers;
pub mod prompts;
pub mod tools;

pub mod agent_definitions;
pub mod report;

pub mod researcher_skill;
pub mod synthesis_skill;

pub use agent_definitions::{
    default_research_tasks, synthesis_agent, Capability, TaskDescriptor, TaskKind,
};
pub use report::{Report, ReportDraft, ReportSection, SectionDraft};
pub use researcher_skill::{ResearchFinding, ResearcherSkill};
pub use synthesis_skill::SynthesisSkill;
