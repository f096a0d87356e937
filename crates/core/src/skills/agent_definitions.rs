//! # Agent Definitions
//!
//! Declares the research and synthesis agents of the pipeline.
//! Descriptors are built once at process start and never mutated.

use crate::skills::prompts;
use serde::Serialize;

/// Tools an agent may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Web search via `search_tools::search_web`
    WebSearch,
}

/// Which pipeline step an agent belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Research,
    Synthesis,
}

/// An immutable agent declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDescriptor {
    /// Agent name, used as the author of its events
    pub name: &'static str,
    /// Research topic (empty for synthesis)
    pub topic: &'static str,
    /// Report heading for this agent's findings
    pub heading: &'static str,
    /// System instructions
    pub instruction: &'static str,
    pub capabilities: &'static [Capability],
    /// Result slot this agent writes (empty for synthesis)
    pub output_key: &'static str,
    pub kind: TaskKind,
}

impl TaskDescriptor {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

const WEB_SEARCH: &[Capability] = &[Capability::WebSearch];

/// The renewable energy researcher
pub fn renewable_energy_researcher() -> TaskDescriptor {
    TaskDescriptor {
        name: "RenewableEnergyResearcher",
        topic: "renewable energy sources",
        heading: "Renewable Energy Findings",
        instruction: prompts::RENEWABLE_ENERGY,
        capabilities: WEB_SEARCH,
        output_key: "renewable_energy_result",
        kind: TaskKind::Research,
    }
}

/// The electric vehicle researcher
pub fn ev_researcher() -> TaskDescriptor {
    TaskDescriptor {
        name: "EVResearcher",
        topic: "electric vehicle technology",
        heading: "Electric Vehicle Findings",
        instruction: prompts::EV_TECHNOLOGY,
        capabilities: WEB_SEARCH,
        output_key: "ev_technology_result",
        kind: TaskKind::Research,
    }
}

/// The carbon capture researcher
pub fn carbon_capture_researcher() -> TaskDescriptor {
    TaskDescriptor {
        name: "CarbonCaptureResearcher",
        topic: "carbon capture methods",
        heading: "Carbon Capture Findings",
        instruction: prompts::CARBON_CAPTURE,
        capabilities: WEB_SEARCH,
        output_key: "carbon_capture_result",
        kind: TaskKind::Research,
    }
}

/// The synthesis agent
pub fn synthesis_agent() -> TaskDescriptor {
    TaskDescriptor {
        name: "SynthesisAgent",
        topic: "",
        heading: "Overall Conclusion",
        instruction: prompts::SYNTHESIS,
        capabilities: &[],
        output_key: "",
        kind: TaskKind::Synthesis,
    }
}

/// Research agents in report order
pub fn default_research_tasks() -> Vec<TaskDescriptor> {
    vec![
        renewable_energy_researcher(),
        ev_researcher(),
        carbon_capture_researcher(),
    ]
}
