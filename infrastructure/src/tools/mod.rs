//! Tools council members may call during Stage 1
//!
//! - `calculator`: arithmetic through `evalexpr`
//! - `web_search`, `url_fetch`: see [`web`]
//! - `code_execution`: Python subprocess, opt-in
//!
//! [`schema`] renders a tool's parameters as JSON Schema for the provider
//! adapters.

pub mod calculator;
pub mod code_execution;
pub mod schema;
pub mod web;

mod executor;

pub use executor::LocalToolExecutor;

use council_domain::tool::entities::ToolSpec;

/// The built-in tool registry. `code_execution` is included only when
/// `with_code_execution` is set.
pub fn default_tool_spec(with_code_execution: bool) -> ToolSpec {
    let spec = ToolSpec::new()
        .register(web::web_search_definition())
        .register(web::url_fetch_definition())
        .register(calculator::calculator_definition());
    if with_code_execution {
        spec.register(code_execution::code_execution_definition())
    } else {
        spec
    }
}
