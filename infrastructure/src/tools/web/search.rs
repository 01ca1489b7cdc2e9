//! `web_search` tool: search the web through DuckDuckGo's HTML endpoint.
//!
//! The HTML endpoint needs no API key. Result blocks are scraped from the
//! page (`.result` → `a.result__a` title/link, `.result__snippet`), and the
//! redirect links DuckDuckGo emits are unwrapped to the target URL.
//!
//! # Parameters
//!
//! | Name | Type | Required | Description |
//! |------|------|:---:|-------------|
//! | `query` | string | Yes | The search query |
//!
//! The same search backs the `web_search` connector, which formats hits
//! for context injection instead of tool output.

use council_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult},
};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Canonical tool name for the web search tool.
pub const WEB_SEARCH: &str = "web_search";

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Hits returned to a model per tool call
pub const TOOL_MAX_RESULTS: usize = 5;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static RESULT: LazyLock<Selector> = LazyLock::new(|| selector(".result"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("a.result__a"));
static SNIPPET: LazyLock<Selector> = LazyLock::new(|| selector(".result__snippet"));

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

pub fn web_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        WEB_SEARCH,
        "Search the web for current information. Returns top search results with titles, snippets, and URLs.",
    )
    .with_parameter(ToolParameter::new("query", "The search query", true))
}

/// Execute the `web_search` tool and format the hits as markdown.
pub async fn execute_web_search(client: &reqwest::Client, call: &ToolCall) -> ToolResult {
    let query = match call.require_string("query") {
        Ok(q) => q,
        Err(e) => return ToolResult::failure(WEB_SEARCH, ToolError::invalid_argument(e)),
    };

    match search(client, query, TOOL_MAX_RESULTS).await {
        Ok(hits) => ToolResult::success(WEB_SEARCH, format_search_results(&hits)),
        Err(e) => ToolResult::failure(
            WEB_SEARCH,
            ToolError::execution_failed(format!("Web search failed: {}", e)),
        ),
    }
}

/// Run one search and return at most `max_results` hits.
pub async fn search(
    client: &reqwest::Client,
    query: &str,
    max_results: usize,
) -> Result<Vec<SearchHit>, String> {
    let response = client
        .post(DDG_HTML_URL)
        .form(&[("q", query)])
        .header("User-Agent", "Mozilla/5.0 (compatible; llm-council/0.1)")
        .send()
        .await
        .map_err(|e| format!("search request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("search returned status {}", status.as_u16()));
    }

    let html = response.text().await.map_err(|e| e.to_string())?;
    let hits = parse_results(&html, max_results);
    debug!(query, hits = hits.len(), "Web search finished");
    Ok(hits)
}

/// Scrape result blocks from a DuckDuckGo HTML results page.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT)
        .filter_map(|block| {
            let link = block.select(&TITLE).next()?;
            let title = element_text(link);
            let url = unwrap_redirect(link.value().attr("href")?);
            if title.is_empty() || url.is_empty() {
                return None;
            }
            let snippet = block.select(&SNIPPET).next().map(element_text).unwrap_or_default();
            Some(SearchHit {
                title,
                url,
                snippet,
            })
        })
        .take(max_results)
        .collect()
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `//duckduckgo.com/l/?uddg=<encoded target>&rut=...` → target URL
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    reqwest::Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}

/// Tool output: bold title, snippet, link, blank line per hit
fn format_search_results(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No search results found.".to_string();
    }
    hits.iter()
        .map(|hit| format!("**{}**\n{}\n{}\n", hit.title, hit.snippet, hit.url))
        .collect::<Vec<_>>()
        .join("\n")
}
