//! url_fetch tool: fetch a URL and extract its readable text

use council_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    value_objects::{ToolError, ToolResult},
};
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Tool name constant
pub const URL_FETCH: &str = "url_fetch";

/// Character limit for tool output
pub const TOOL_MAX_CHARS: usize = 10_000;

/// Maximum response body size (5 MB)
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

const USER_AGENT: &str = "llm-council/0.1 (+tool)";

/// Marker appended to text cut at the character limit
pub const TRUNCATION_MARKER: &str = "\n\n[... truncated ...]";

/// Subtrees never rendered as page text
const SKIP_TAGS: [&str; 7] = ["script", "style", "nav", "footer", "header", "noscript", "svg"];

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("static selector must parse"));

pub fn url_fetch_definition() -> ToolDefinition {
    ToolDefinition::new(
        URL_FETCH,
        "Fetch and read the content of a web page URL. Returns the text content of the page.",
    )
    .with_parameter(ToolParameter::new("url", "The URL to fetch", true))
}

pub async fn execute_url_fetch(client: &reqwest::Client, call: &ToolCall) -> ToolResult {
    let url = match call.require_string("url") {
        Ok(u) => u,
        Err(e) => return ToolResult::failure(URL_FETCH, ToolError::invalid_argument(e)),
    };

    match fetch_text(client, url, TOOL_MAX_CHARS).await {
        Ok(text) => ToolResult::success(URL_FETCH, text),
        Err(e) => ToolResult::failure(
            URL_FETCH,
            ToolError::execution_failed(format!("URL fetch failed: {}", e)),
        ),
    }
}

/// GET `url` and return its text, truncated to `max_chars` characters.
///
/// HTML bodies are reduced to readable text; anything else is returned as-is.
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    max_chars: usize,
) -> Result<String, String> {
    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));

    let body = response.bytes().await.map_err(|e| e.to_string())?;
    if body.len() > MAX_BODY_SIZE {
        return Err(format!("response too large: {} bytes", body.len()));
    }
    debug!(url, bytes = body.len(), is_html, "Fetched URL");

    let raw = String::from_utf8_lossy(&body);
    let text = if is_html {
        html_to_text(&raw)
    } else {
        raw.into_owned()
    };
    Ok(truncate_chars(&text, max_chars))
}

/// Cut `text` to `max_chars` characters, appending [`TRUNCATION_MARKER`].
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Extract readable text from HTML, one text node per line
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    clean_whitespace(&parts.join("\n"))
}

fn collect_text(element: ElementRef, parts: &mut Vec<String>) {
    if SKIP_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    parts.push(t.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, parts);
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of spaces and cap blank lines at one
fn clean_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;
    let mut newline_count = 0;

    for ch in text.chars() {
        if ch == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push('\n');
            }
            prev_was_space = false;
        } else if ch.is_whitespace() {
            if !prev_was_space && newline_count == 0 {
                result.push(' ');
            }
            prev_was_space = true;
        } else {
            result.push(ch);
            prev_was_space = false;
            newline_count = 0;
        }
    }

    result.trim().to_string()
}
