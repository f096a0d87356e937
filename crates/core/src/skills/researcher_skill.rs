//! # Researcher Skill
//!
//! Runs one research agent against the model with web search.

use crate::models::ModelConfig;
use crate::skills::agent_definitions::{Capability, TaskDescriptor};
use crate::skills::tools::search_tools;
use crate::{run_llm_function, run_llm_worker};
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from a research agent
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ResearchFinding {
    /// Key findings in 1-2 sentences
    pub summary: String,
}

/// Researcher skill for one topic
pub struct ResearcherSkill {
    config: ModelConfig,
}

impl ResearcherSkill {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Research `task.topic` in the context of the user's request
    pub async fn research(
        &self,
        task: &TaskDescriptor,
        request: &str,
    ) -> anyhow::Result<ResearchFinding> {
        let prompt = research_prompt(task, request);
        tracing::debug!(agent = task.name, model = %self.config.model, "Researching");

        if task.has_capability(Capability::WebSearch) {
            run_llm_worker!(
                &self.config,
                ResearchFinding,
                task.instruction,
                prompt,
                search_tools::search_web,
            )
        } else {
            run_llm_function!(&self.config, ResearchFinding, task.instruction, prompt)
        }
    }
}

fn research_prompt(task: &TaskDescriptor, request: &str) -> String {
    format!(
        "User request: {}\n\nResearch topic: {}",
        request.trim(),
        task.topic
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::agent_definitions::ev_researcher;

    #[test]
    fn test_prompt_carries_request_and_topic() {
        let prompt = research_prompt(&ev_researcher(), "  Generate the sustainability report. ");
        assert!(prompt.starts_with("User request: Generate the sustainability report.\n"));
        assert!(prompt.ends_with("Research topic: electric vehicle technology"));
    }
}
