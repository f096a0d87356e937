//! # Search Tools
//!
//! Web search for the research agents, backed by SearXNG.

use radkit::macros::tool;
use radkit::tools::ToolResult;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

/// Arguments for web search
#[derive(Deserialize, JsonSchema)]
pub struct SearchWebArgs {
    /// Search query
    pub query: String,
    /// Maximum number of results (default: 5)
    pub max_results: Option<u32>,
}

/// Search the web for information
#[tool(
    description = "Search the web for recent information. Returns search results with titles, URLs and snippets."
)]
pub async fn search_web(args: SearchWebArgs) -> ToolResult {
    let max_results = args.max_results.unwrap_or(5) as usize;

    match try_searxng(&args.query, max_results).await {
        Some(results) => ToolResult::success(json!({
            "query": args.query,
            "source": "searxng",
            "results": results
        })),
        None => {
            tracing::warn!(query = %args.query, "No search backend answered");
            ToolResult::success(json!({
                "query": args.query,
                "source": "none",
                "results": [],
                "message": "No search backend available. Set SEARXNG_URL to a SearXNG instance."
            }))
        }
    }
}

/// Endpoints in lookup order: `SEARXNG_URL`, public instances, local
fn endpoints(custom_url: Option<&str>) -> Vec<String> {
    let mut endpoints: Vec<String> = Vec::new();
    if let Some(url) = custom_url {
        endpoints.push(format!("{}/search", url.trim_end_matches('/')));
    }
    endpoints.extend([
        "https://searx.be/search".to_string(),
        "https://search.sapti.me/search".to_string(),
        "https://searx.tiekoetter.com/search".to_string(),
    ]);
    endpoints.push("http://localhost:8888/search".to_string());
    endpoints
}

async fn try_searxng(query: &str, max_results: usize) -> Option<Vec<Value>> {
    let custom_url = std::env::var("SEARXNG_URL").ok();

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent("canopy-research/0.1")
        .build()
        .ok()?;

    for endpoint in endpoints(custom_url.as_deref()) {
        let url = format!("{}?q={}&format=json", endpoint, urlencoding::encode(query));

        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(endpoint = %endpoint, "Search request failed: {}", e);
                continue;
            }
        };
        if let Ok(body) = response.json::<Value>().await {
            if let Some(results) = extract_results(&body, max_results) {
                return Some(results);
            }
        }
    }

    None
}

/// Reduce a SearXNG response to title/url/snippet triples
fn extract_results(body: &Value, max_results: usize) -> Option<Vec<Value>> {
    let results = body.get("results")?.as_array()?;
    Some(
        results
            .iter()
            .take(max_results)
            .map(|r| {
                json!({
                    "title": r.get("title").and_then(|t| t.as_str()).unwrap_or(""),
                    "url": r.get("url").and_then(|u| u.as_str()).unwrap_or(""),
                    "snippet": r.get("content").and_then(|c| c.as_str()).unwrap_or("")
                })
            })
            .collect(),
    )
}
