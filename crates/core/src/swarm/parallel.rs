//! # Parallel Research
//!
//! Fan-out over independent research agents with an all-or-nothing barrier.

use super::events::{EventSink, RunEvent, RunEventKind};
use super::executor::{AgentExecutor, TaskInput};
use crate::errors::PipelineError;
use crate::skills::TaskDescriptor;
use crate::state::{ResultMap, RunContext};
use futures::future::try_join_all;

/// Runs every research agent and gathers their outputs by slot
#[derive(Debug, Clone)]
pub struct FanOut {
    name: String,
    tasks: Vec<TaskDescriptor>,
}

impl FanOut {
    pub fn new(name: impl Into<String>, tasks: Vec<TaskDescriptor>) -> Self {
        Self {
            name: name.into(),
            tasks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    /// Execute all agents concurrently.
    ///
    /// The result map is built only after every agent has answered; the
    /// first failure fails the whole step and drops the remaining agents.
    #[tracing::instrument(skip_all, fields(step = %self.name, session_id = %context.session_id))]
    pub async fn run(
        &self,
        executor: &dyn AgentExecutor,
        context: &RunContext,
        request: &str,
        sink: &EventSink,
    ) -> Result<ResultMap, PipelineError> {
        let no_slots = ResultMap::new();
        let no_slots = &no_slots;
        let session_id = context.session_id.as_str();

        let branches = self.tasks.iter().map(|task| async move {
            sink.emit(RunEvent::new(RunEventKind::AgentStarted, session_id, task.name))
                .await;

            let input = TaskInput {
                context,
                request,
                message: request,
                slots: no_slots,
                research_tasks: &self.tasks,
            };
            let text = executor
                .execute(task, input)
                .await
                .map_err(|e| PipelineError::task(task.name, e))?;
            tracing::info!(agent = task.name, slot = task.output_key, "Research complete");

            sink.emit(
                RunEvent::response(session_id, task.name, text.clone())
                    .with_output_key(task.output_key),
            )
            .await;
            Ok::<_, PipelineError>((task.output_key, text))
        });

        let outputs = try_join_all(branches).await?;
        Ok(outputs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::default_research_tasks;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoTopic;

    #[async_trait]
    impl AgentExecutor for EchoTopic {
        async fn execute(&self, task: &TaskDescriptor, _input: TaskInput<'_>) -> anyhow::Result<String> {
            Ok(format!("findings on {}", task.topic))
        }
    }

    struct FailOn {
        agent: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AgentExecutor for FailOn {
        async fn execute(&self, task: &TaskDescriptor, _input: TaskInput<'_>) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if task.name == self.agent {
                anyhow::bail!("search quota exhausted");
            }
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_every_slot_filled() {
        let fan_out = FanOut::new("ParallelWebResearchAgent", default_research_tasks());
        let context = RunContext::new("app", "user");
        let slots = fan_out
            .run(&EchoTopic, &context, "report", &EventSink::discard())
            .await
            .unwrap();

        assert_eq!(slots.len(), 3);
        assert_eq!(
            slots.get("carbon_capture_result"),
            Some("findings on carbon capture methods")
        );
    }

    #[tokio::test]
    async fn test_failure_yields_no_partial_map() {
        let fan_out = FanOut::new("ParallelWebResearchAgent", default_research_tasks());
        let context = RunContext::new("app", "user");
        let executor = FailOn {
            agent: "EVResearcher",
            calls: AtomicUsize::new(0),
        };

        let result = fan_out
            .run(&executor, &context, "report", &EventSink::discard())
            .await;
        match result {
            Err(PipelineError::Task { task, .. }) => assert_eq!(task, "EVResearcher"),
            other => panic!("expected task failure, got {:?}", other),
        }
    }
}
