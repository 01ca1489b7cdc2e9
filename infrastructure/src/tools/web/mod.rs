//! **Web tools**: `web_search` and `url_fetch`
//!
//! | Tool | Description | Key Dependency |
//! |------|-------------|----------------|
//! | `web_search` | Search via DuckDuckGo's HTML endpoint | `reqwest` + `scraper` |
//! | `url_fetch` | Fetch a URL, extract readable text from HTML | `reqwest` + `scraper` |
//!
//! [`search`] and [`fetch_text`] are shared with the connectors, which
//! apply their own limits and formatting.

mod fetch;
mod search;

pub use fetch::{
    TRUNCATION_MARKER, URL_FETCH, execute_url_fetch, fetch_text, html_to_text, truncate_chars,
    url_fetch_definition,
};
pub use search::{SearchHit, WEB_SEARCH, execute_web_search, search, web_search_definition};
