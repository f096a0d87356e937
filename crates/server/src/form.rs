//! Web form adapter: an embedded page plus one JSON research endpoint.

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use canopy_core::swarm::{RunEvent, Runner};
use canopy_core::Environment;
use pulldown_cmark::{html, Event, Options, Parser};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

/// Embedded page assets
#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

pub struct AppState {
    pub env: Environment,
    pub runner: Runner,
}

type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ResearchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResearchResponse {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Render report Markdown for the page.
///
/// Raw HTML in the report is emitted as escaped text.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

async fn research(
    State(state): State<SharedState>,
    Json(req): Json<ResearchRequest>,
) -> Json<ResearchResponse> {
    let credential = match state.env.require_credential() {
        Ok(credential) => credential,
        Err(e) => return Json(ResearchResponse::failed(format!("❌ {}", e))),
    };

    let query = req.query.as_str();
    tracing::info!(query, "Research requested");
    match state.runner.run(credential, query, |_: &RunEvent| {}).await {
        Ok(report) => Json(ResearchResponse {
            success: true,
            report_html: Some(render_markdown(&report)),
            report_markdown: Some(report),
            error: None,
        }),
        Err(e) => {
            tracing::error!("Research failed: {}", e);
            Json(ResearchResponse::failed(format!("An error occurred: {}", e)))
        }
    }
}

async fn index() -> Response {
    match Assets::get("index.html") {
        Some(file) => Html(file.data.into_owned()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match Assets::get(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                file.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/v1/research", post(research))
        .fallback(get(serve_static))
        .with_state(state)
}

/// Serve the form on 127.0.0.1 until the process is stopped
pub async fn serve(env: Environment, runner: Runner, port: u16) -> anyhow::Result<()> {
    if let Err(e) = env.require_credential() {
        tracing::warn!("{}; research requests will be refused", e);
    }

    let state = Arc::new(AppState { env, runner });
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("🌍 Sustainability Research Agent running at http://{}", addr);
    println!("   Form:     /");
    println!("   Research: /api/v1/research (POST)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use canopy_core::models::ModelConfig;
    use canopy_core::skills::{Report, TaskDescriptor, TaskKind};
    use canopy_core::swarm::{AgentExecutor, Pipeline, TaskInput};
    use canopy_core::Credential;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl AgentExecutor for Counting {
        async fn execute(&self, task: &TaskDescriptor, input: TaskInput<'_>) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(task.name) {
                anyhow::bail!("rate limited");
            }
            match task.kind {
                TaskKind::Research => Ok(format!("{} for {}", task.topic, input.request)),
                TaskKind::Synthesis => Ok(Report::from_slots(
                    input.research_tasks,
                    input.slots,
                    "Momentum continues.",
                )?
                .to_markdown()),
            }
        }
    }

    fn state(executor: Arc<Counting>, credential: Option<Credential>) -> SharedState {
        Arc::new(AppState {
            env: Environment::new(ModelConfig::default(), credential),
            runner: Runner::new(Pipeline::default(), executor),
        })
    }

    fn key() -> Option<Credential> {
        Some(Credential::new("GEMINI_API_KEY", "test-key"))
    }

    fn request(query: &str) -> Json<ResearchRequest> {
        Json(ResearchRequest {
            query: query.to_string(),
        })
    }

    #[tokio::test]
    async fn test_missing_credential_is_inline_error() {
        let executor = Arc::new(Counting::default());
        let Json(resp) = research(State(state(executor.clone(), None)), request("Summarize latest tech")).await;

        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("GOOGLE_API_KEY"));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_report_rendered_to_html() {
        let executor = Arc::new(Counting::default());
        let Json(resp) = research(State(state(executor.clone(), key())), request("Summarize latest tech")).await;

        assert!(resp.success);
        let markdown = resp.report_markdown.unwrap();
        assert!(markdown.contains("renewable energy"));
        assert!(markdown.contains("Summarize latest tech"));
        let html = resp.report_html.unwrap();
        assert!(html.contains("<h3>Overall Conclusion</h3>"));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failure_is_inline_and_server_keeps_serving() {
        let executor = Arc::new(Counting {
            fail_on: Some("EVResearcher"),
            ..Default::default()
        });
        let shared = state(executor, key());

        let Json(first) = research(State(shared.clone()), request("first")).await;
        assert!(!first.success);
        assert!(first.error.unwrap().contains("EVResearcher"));

        let Json(second) = research(State(shared.clone()), request("second")).await;
        assert!(!second.success);
        assert!(shared.runner.sessions().is_empty());
    }

    #[test]
    fn test_render_markdown_headings() {
        let html = render_markdown("## Title\n\n### Section\nBody text\n");
        assert!(html.contains("<h2>Title</h2>"));
        assert!(html.contains("<h3>Section</h3>"));
        assert!(html.contains("<p>Body text</p>"));
    }

    #[test]
    fn test_raw_html_in_report_is_escaped() {
        let html = render_markdown(
            "### Carbon Capture Findings\nCosts fell <img src=x onerror=alert(2)>\n\n<script>alert(1)</script>\n",
        );
        assert!(!html.contains("<img"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;img src=x onerror=alert(2)&gt;"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<h3>Carbon Capture Findings</h3>"));
    }

    #[tokio::test]
    async fn test_any_query_text_is_submitted() {
        let executor = Arc::new(Counting::default());
        let Json(resp) = research(State(state(executor.clone(), key())), request("")).await;

        assert!(resp.success);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_index_page_is_embedded() {
        let page = Assets::get("index.html").unwrap();
        let page = String::from_utf8_lossy(&page.data);
        assert!(page.contains("Summarize latest tech"));
        assert!(page.contains("Start Research"));
    }
}
