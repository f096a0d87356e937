//! # Runner
//!
//! Drives one request through the pipeline inside a fresh session and
//! drains the response stream down to the final text.

use super::events::{RunEvent, RunEventKind, StreamItem};
use super::executor::AgentExecutor;
use super::pipeline::Pipeline;
use crate::config::{Credential, Environment, DEFAULT_APP_NAME, DEFAULT_USER_ID};
use crate::errors::PipelineError;
use crate::state::{RunContext, SessionService};
use futures::{Stream, TryStreamExt};
use std::sync::Arc;

/// Fold a response stream into the text of its last final event.
///
/// `progress` sees every event that carries content. Returns `None` when
/// the pipeline completed without a final event, and `StreamClosed` when the
/// stream ends before `PipelineCompleted`.
pub async fn drain_final<S>(
    events: S,
    progress: &(dyn Fn(&RunEvent) + Send + Sync),
) -> Result<Option<String>, PipelineError>
where
    S: Stream<Item = StreamItem>,
{
    let (last, completed) = events
        .try_fold(
            (None, false),
            |(last, completed): (Option<String>, bool), event: RunEvent| async move {
                if event.has_content() {
                    progress(&event);
                }
                let completed = completed || event.kind == RunEventKind::PipelineCompleted;
                let last = if event.is_final() && event.has_content() {
                    event.content
                } else {
                    last
                };
                Ok::<_, PipelineError>((last, completed))
            },
        )
        .await?;

    if !completed {
        return Err(PipelineError::StreamClosed);
    }
    Ok(last)
}

/// Session/run driver for the pipeline
pub struct Runner {
    pipeline: Arc<Pipeline>,
    executor: Arc<dyn AgentExecutor>,
    sessions: SessionService,
    app_name: String,
    user_id: String,
}

impl Runner {
    pub fn new(pipeline: Pipeline, executor: Arc<dyn AgentExecutor>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            executor,
            sessions: SessionService::new(),
            app_name: DEFAULT_APP_NAME.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }

    /// Runner using the app name and user id of `env`
    pub fn from_environment(
        env: &Environment,
        pipeline: Pipeline,
        executor: Arc<dyn AgentExecutor>,
    ) -> Self {
        Self::new(pipeline, executor)
            .with_app_name(&env.app_name)
            .with_user_id(&env.user_id)
    }

    pub fn with_app_name(mut self, app_name: &str) -> Self {
        self.app_name = app_name.to_string();
        self
    }

    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Run `request` as the configured user
    pub async fn run<F>(
        &self,
        credential: &Credential,
        request: &str,
        progress: F,
    ) -> Result<String, PipelineError>
    where
        F: Fn(&RunEvent) + Send + Sync,
    {
        self.run_as(credential, &self.user_id, request, progress)
            .await
    }

    /// Run `request` in a fresh session for `user_id`
    #[tracing::instrument(skip_all, fields(app = %self.app_name, credential = credential.var()))]
    pub async fn run_as<F>(
        &self,
        credential: &Credential,
        user_id: &str,
        request: &str,
        progress: F,
    ) -> Result<String, PipelineError>
    where
        F: Fn(&RunEvent) + Send + Sync,
    {
        let context = RunContext::new(&self.app_name, user_id);
        tracing::info!(session_id = %context.session_id, user_id, "Starting session");
        // Removed on every exit, including when this future is dropped
        let session = self.sessions.open(&context);
        let session = &session;

        let events = self
            .pipeline
            .stream(
                Arc::clone(&self.executor),
                context.clone(),
                request.to_string(),
            )
            .and_then(|event| async move {
                if let (Some(slot), Some(text)) = (&event.output_key, &event.content) {
                    session.record(slot, text);
                }
                Ok::<_, PipelineError>(event)
            });

        match drain_final(events, &progress).await? {
            Some(text) => Ok(text),
            None => Err(PipelineError::NoFinalResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn content(author: &str, text: &str, final_response: bool) -> StreamItem {
        Ok(RunEvent::new(RunEventKind::AgentCompleted, "s-1", author)
            .with_content(text)
            .with_final(final_response))
    }

    fn completed() -> StreamItem {
        Ok(RunEvent::new(RunEventKind::PipelineCompleted, "s-1", "pipeline"))
    }

    #[tokio::test]
    async fn test_returns_final_not_earlier_text() {
        let events = stream::iter(vec![
            content("EVResearcher", "draft notes", false),
            content("SynthesisAgent", "## Final", true),
            completed(),
        ]);
        let text = drain_final(events, &|_: &RunEvent| {}).await.unwrap();
        assert_eq!(text.as_deref(), Some("## Final"));
    }

    #[tokio::test]
    async fn test_later_non_final_does_not_replace() {
        let events = stream::iter(vec![
            content("SynthesisAgent", "## Final", true),
            content("SynthesisAgent", "trailing chatter", false),
            completed(),
        ]);
        let text = drain_final(events, &|_: &RunEvent| {}).await.unwrap();
        assert_eq!(text.as_deref(), Some("## Final"));
    }

    #[tokio::test]
    async fn test_completed_without_final_is_none() {
        let events = stream::iter(vec![completed()]);
        assert_eq!(drain_final(events, &|_: &RunEvent| {}).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_stream_is_closed() {
        let events = stream::iter(Vec::<StreamItem>::new());
        let err = drain_final(events, &|_: &RunEvent| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::StreamClosed));
    }

    #[tokio::test]
    async fn test_research_text_is_not_the_report_when_run_dies() {
        let events = stream::iter(vec![
            content("RenewableEnergyResearcher", "A", true),
            content("CarbonCaptureResearcher", "C", true),
        ]);
        let err = drain_final(events, &|_: &RunEvent| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::StreamClosed));
    }

    #[tokio::test]
    async fn test_progress_counts_content_events() {
        let seen = AtomicUsize::new(0);
        let events = stream::iter(vec![
            Ok(RunEvent::new(RunEventKind::AgentStarted, "s-1", "EVResearcher")),
            content("EVResearcher", "B", true),
            content("SynthesisAgent", "## Final", true),
            completed(),
        ]);
        drain_final(events, &|_: &RunEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let events = stream::iter(vec![
            content("EVResearcher", "B", true),
            Err(PipelineError::task("CarbonCaptureResearcher", anyhow::anyhow!("timeout"))),
        ]);
        let err = drain_final(events, &|_: &RunEvent| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::Task { .. }));
    }
}
