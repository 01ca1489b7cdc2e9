//! Output formatter trait

use council_domain::PipelineRun;

/// Renders a finished (or failed) council run
pub trait OutputFormatter {
    /// Every stage, the aggregate ranking and the cost
    fn format(&self, run: &PipelineRun) -> String;

    /// Format as JSON
    fn format_json(&self, run: &PipelineRun) -> String;

    /// Synthesis only (concise output)
    fn format_synthesis_only(&self, run: &PipelineRun) -> String;
}
