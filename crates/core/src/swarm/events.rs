//! # Run Events
//!
//! Items of the response stream produced by the pipeline.

use crate::errors::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Item type of the response stream
pub type StreamItem = Result<RunEvent, PipelineError>;

/// Kind of run event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunEventKind {
    /// Pipeline accepted the request
    PipelineStarted,
    /// Agent started working
    AgentStarted,
    /// Agent produced its response
    AgentCompleted,
    /// Pipeline finished both steps
    PipelineCompleted,
}

/// An event in the response stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// Unique event ID
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Session this event belongs to
    pub session_id: String,
    pub kind: RunEventKind,
    /// Agent that produced this event
    pub author: String,
    /// Message text, if the event carries any
    #[serde(default)]
    pub content: Option<String>,
    /// Result slot the content was stored under
    #[serde(default)]
    pub output_key: Option<String>,
    /// Whether this is the author's final response
    #[serde(default)]
    pub final_response: bool,
}

impl RunEvent {
    /// Create a new event without content
    pub fn new(kind: RunEventKind, session_id: &str, author: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            kind,
            author: author.to_string(),
            content: None,
            output_key: None,
            final_response: false,
        }
    }

    /// An agent's final response
    pub fn response(session_id: &str, author: &str, text: impl Into<String>) -> Self {
        let mut event = Self::new(RunEventKind::AgentCompleted, session_id, author);
        event.content = Some(text.into());
        event.final_response = true;
        event
    }

    /// Attach message content
    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        self.content = Some(text.into());
        self
    }

    /// Record the result slot the content belongs to
    pub fn with_output_key(mut self, key: &str) -> Self {
        if !key.is_empty() {
            self.output_key = Some(key.to_string());
        }
        self
    }

    /// Mark or unmark as a final response
    pub fn with_final(mut self, final_response: bool) -> Self {
        self.final_response = final_response;
        self
    }

    /// True when the event carries non-empty message text
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|text| !text.is_empty())
    }

    pub fn is_final(&self) -> bool {
        self.final_response
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// Where the pipeline publishes its events
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::Sender<StreamItem>>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<StreamItem>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops every event
    pub fn discard() -> Self {
        Self::default()
    }

    /// Emit an event; a closed receiver is ignored
    pub async fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Ok(event)).await;
        }
    }

    /// Emit the error that ends the stream
    pub async fn fail(&self, error: PipelineError) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Err(error)).await;
        }
    }
}
