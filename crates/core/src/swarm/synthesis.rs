//! # Synthesis Step
//!
//! Interpolates the research slots into the synthesis prompt and runs the
//! synthesis agent once.

use super::executor::{AgentExecutor, TaskInput};
use crate::errors::PipelineError;
use crate::skills::prompts::SYNTHESIS_TEMPLATE;
use crate::skills::{synthesis_agent, TaskDescriptor};
use crate::state::{ResultMap, RunContext};
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{([a-z][a-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

#[derive(Debug, Clone)]
pub struct SynthesisStep {
    agent: TaskDescriptor,
    template: &'static str,
}

impl Default for SynthesisStep {
    fn default() -> Self {
        Self::new(synthesis_agent(), SYNTHESIS_TEMPLATE)
    }
}

impl SynthesisStep {
    pub fn new(agent: TaskDescriptor, template: &'static str) -> Self {
        Self { agent, template }
    }

    pub fn agent(&self) -> &TaskDescriptor {
        &self.agent
    }

    /// Slot names the template references, in order of appearance
    pub fn placeholders(&self) -> Vec<&'static str> {
        let template: &'static str = self.template;
        placeholder_pattern()
            .captures_iter(template)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Fill every `{slot}` from the result map; any missing slot is an error
    pub fn render_prompt(&self, slots: &ResultMap) -> Result<String, PipelineError> {
        if let Some(missing) = self.placeholders().into_iter().find(|s| !slots.contains(s)) {
            return Err(PipelineError::MissingSlot {
                slot: missing.to_string(),
            });
        }

        let rendered = placeholder_pattern().replace_all(self.template, |caps: &Captures| {
            slots.get(&caps[1]).unwrap_or_default().to_string()
        });
        Ok(rendered.into_owned())
    }

    /// Render the prompt and make the single synthesis call
    #[tracing::instrument(skip_all, fields(agent = self.agent.name, session_id = %context.session_id))]
    pub async fn run(
        &self,
        executor: &dyn AgentExecutor,
        context: &RunContext,
        request: &str,
        slots: &ResultMap,
        research_tasks: &[TaskDescriptor],
    ) -> Result<String, PipelineError> {
        let prompt = self.render_prompt(slots)?;
        let input = TaskInput {
            context,
            request,
            message: &prompt,
            slots,
            research_tasks,
        };
        executor
            .execute(&self.agent, input)
            .await
            .map_err(|e| PipelineError::task(self.agent.name, e))
    }
}
