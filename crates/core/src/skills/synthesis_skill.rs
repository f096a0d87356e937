//! # Synthesis Skill
//!
//! Asks the model for a structured `ReportDraft` and renders it.

use crate::models::ModelConfig;
use crate::run_llm_function;
use crate::skills::agent_definitions::TaskDescriptor;
use crate::skills::report::{Report, ReportDraft};
use crate::state::ResultMap;

pub struct SynthesisSkill {
    config: ModelConfig,
}

impl SynthesisSkill {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Produce the Markdown report from the rendered synthesis prompt
    pub async fn synthesize(
        &self,
        agent: &TaskDescriptor,
        prompt: &str,
        research_tasks: &[TaskDescriptor],
        slots: &ResultMap,
    ) -> anyhow::Result<String> {
        tracing::debug!(agent = agent.name, model = %self.config.model, "Synthesizing");

        let draft = run_llm_function!(
            &self.config,
            ReportDraft,
            agent.instruction,
            prompt.to_string()
        )?;

        let report = Report::assemble(research_tasks, &draft, slots)?;
        Ok(report.to_markdown())
    }
}
