//! # Agent Executor
//!
//! The seam between the pipeline and whatever runs an agent.
//! `RadkitExecutor` calls hosted models; tests substitute scripted doubles.

use crate::models::ModelConfig;
use crate::skills::{ResearcherSkill, SynthesisSkill, TaskDescriptor, TaskKind};
use crate::state::{ResultMap, RunContext};
use async_trait::async_trait;

/// Everything an agent sees for one execution
#[derive(Debug, Clone, Copy)]
pub struct TaskInput<'a> {
    pub context: &'a RunContext,
    /// The user's original request
    pub request: &'a str,
    /// Message addressed to this agent (the request, or the rendered synthesis prompt)
    pub message: &'a str,
    /// Result slots filled so far (empty during research)
    pub slots: &'a ResultMap,
    /// The research roster that fills `slots`, in report order
    pub research_tasks: &'a [TaskDescriptor],
}

/// Runs one agent to completion and returns its response text
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn execute(&self, task: &TaskDescriptor, input: TaskInput<'_>) -> anyhow::Result<String>;
}

/// Executor backed by radkit model clients
pub struct RadkitExecutor {
    config: ModelConfig,
}

impl RadkitExecutor {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AgentExecutor for RadkitExecutor {
    async fn execute(&self, task: &TaskDescriptor, input: TaskInput<'_>) -> anyhow::Result<String> {
        match task.kind {
            TaskKind::Research => {
                let finding = ResearcherSkill::new(self.config.clone())
                    .research(task, input.message)
                    .await?;
                Ok(finding.summary)
            }
            TaskKind::Synthesis => {
                SynthesisSkill::new(self.config.clone())
                    .synthesize(task, input.message, input.research_tasks, input.slots)
                    .await
            }
        }
    }
}
