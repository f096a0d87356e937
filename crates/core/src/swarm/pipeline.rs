//! # Pipeline
//!
//! The two-step research-then-synthesis program and its stage machine.

use super::events::{EventSink, RunEvent, RunEventKind, StreamItem};
use super::executor::AgentExecutor;
use super::parallel::FanOut;
use super::synthesis::SynthesisStep;
use crate::errors::PipelineError;
use crate::skills::default_research_tasks;
use crate::state::RunContext;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_stream::wrappers::ReceiverStream;

/// Response stream of one pipeline run.
///
/// Dropping it aborts the run.
#[derive(Debug)]
pub struct RunStream {
    events: ReceiverStream<StreamItem>,
    task: AbortHandle,
}

impl Stream for RunStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl Drop for RunStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Research agents running
    Researching,
    /// Synthesis agent running
    Synthesizing,
    /// Complete
    Complete,
    /// Failed
    Failed,
}

impl PipelineStage {
    /// The stage after this one succeeds
    pub fn next(self) -> Self {
        match self {
            PipelineStage::Researching => PipelineStage::Synthesizing,
            PipelineStage::Synthesizing => PipelineStage::Complete,
            PipelineStage::Complete => PipelineStage::Complete,
            PipelineStage::Failed => PipelineStage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Failed)
    }
}

/// Sequential coordinator: fan-out research, then synthesis
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    research: FanOut,
    synthesis: SynthesisStep,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(
            "ResearchAndSynthesisPipeline",
            FanOut::new("ParallelWebResearchAgent", default_research_tasks()),
            SynthesisStep::default(),
        )
    }
}

impl Pipeline {
    pub fn new(name: impl Into<String>, research: FanOut, synthesis: SynthesisStep) -> Self {
        Self {
            name: name.into(),
            research,
            synthesis,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn research(&self) -> &FanOut {
        &self.research
    }

    /// Run both steps, publishing events to `sink`, and return the report
    #[tracing::instrument(skip_all, fields(pipeline = %self.name, session_id = %context.session_id))]
    pub async fn execute(
        &self,
        executor: &dyn AgentExecutor,
        context: &RunContext,
        request: &str,
        sink: &EventSink,
    ) -> Result<String, PipelineError> {
        let session_id = context.session_id.as_str();
        sink.emit(RunEvent::new(
            RunEventKind::PipelineStarted,
            session_id,
            &self.name,
        ))
        .await;

        let mut stage = PipelineStage::Researching;
        let outcome = self.run_steps(&mut stage, executor, context, request, sink).await;

        match &outcome {
            Ok(_) => {
                sink.emit(RunEvent::new(
                    RunEventKind::PipelineCompleted,
                    session_id,
                    &self.name,
                ))
                .await;
                tracing::info!(stage = ?stage, "Pipeline complete");
            }
            Err(e) => {
                tracing::warn!(stage = ?stage, "Pipeline failed: {}", e);
            }
        }
        outcome
    }

    async fn run_steps(
        &self,
        stage: &mut PipelineStage,
        executor: &dyn AgentExecutor,
        context: &RunContext,
        request: &str,
        sink: &EventSink,
    ) -> Result<String, PipelineError> {
        let session_id = context.session_id.as_str();
        let agent = self.synthesis.agent().name;

        let slots = match self.research.run(executor, context, request, sink).await {
            Ok(slots) => slots,
            Err(e) => {
                *stage = PipelineStage::Failed;
                return Err(e);
            }
        };
        *stage = stage.next();

        sink.emit(RunEvent::new(RunEventKind::AgentStarted, session_id, agent))
            .await;
        let report = match self
            .synthesis
            .run(executor, context, request, &slots, self.research.tasks())
            .await {
            Ok(report) => report,
            Err(e) => {
                *stage = PipelineStage::Failed;
                return Err(e);
            }
        };
        *stage = stage.next();

        sink.emit(RunEvent::response(session_id, agent, report.clone()))
            .await;
        Ok(report)
    }

    /// Start a run on the runtime and return its response stream.
    ///
    /// A failure is delivered as the last item of the stream. A run that
    /// dies without one ends the stream before `PipelineCompleted`.
    pub fn stream(
        self: &Arc<Self>,
        executor: Arc<dyn AgentExecutor>,
        context: RunContext,
        request: String,
    ) -> RunStream {
        let (tx, rx) = mpsc::channel::<StreamItem>(32);
        let pipeline = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let sink = EventSink::new(tx);
            if let Err(e) = pipeline
                .execute(executor.as_ref(), &context, &request, &sink)
                .await
            {
                sink.fail(e).await;
            }
        });

        RunStream {
            events: ReceiverStream::new(rx),
            task: handle.abort_handle(),
        }
    }
}
