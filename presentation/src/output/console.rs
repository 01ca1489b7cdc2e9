//! Console output formatter for council runs

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{
    ConnectorInfo, PipelineEvent, PipelineRun, PricingTable, Stage, ToolDefinition,
};

/// Formats council runs for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// All four stages, the aggregate ranking and the cost
    pub fn format(run: &PipelineRun) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Question:".cyan().bold(), run.query()));
        if let Some(system_prompt) = run.system_prompt() {
            output.push_str(&format!("{} {}\n", "System prompt:".cyan().bold(), system_prompt));
        }
        let models: Vec<String> = run.stage1().iter().map(|e| e.model.to_string()).collect();
        output.push_str(&format!(
            "{} {}\n",
            "Answered by:".cyan().bold(),
            models.join(", ")
        ));

        // Stage 1
        output.push_str(&Self::section_header(Stage::Collect));
        for entry in run.stage1() {
            let label = run
                .label_map()
                .label_for(&entry.model)
                .map(|l| format!(" [{}]", l))
                .unwrap_or_default();
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {}{} ──", entry.model, label).yellow().bold(),
                entry.response.text()
            ));
            if !entry.response.tool_calls.is_empty() {
                let tools: Vec<&str> = entry
                    .response
                    .tool_calls
                    .iter()
                    .map(|c| c.tool_name.as_str())
                    .collect();
                output.push_str(&format!("{} {}\n", "Tools used:".dimmed(), tools.join(", ")));
            }
        }

        // Stage 2
        if !run.stage2().is_empty() {
            output.push_str(&Self::section_header(Stage::Rank));
            for entry in run.stage2() {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", entry.evaluator_model).yellow().bold(),
                    entry.raw_evaluation
                ));
                if !entry.parsed_ranking.is_empty() {
                    let parsed: Vec<String> = entry
                        .parsed_ranking
                        .iter()
                        .map(|label| match run.label_map().model_for(label) {
                            Some(model) => format!("{} ({})", label, model),
                            None => label.to_string(),
                        })
                        .collect();
                    output.push_str(&format!(
                        "{} {}\n",
                        "Parsed:".dimmed(),
                        parsed.join(" > ")
                    ));
                }
            }
        }

        if !run.aggregate_rankings().is_empty() {
            output.push_str(&format!("\n{}\n", "Aggregate Ranking:".green().bold()));
            for (i, row) in run.aggregate_rankings().iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {:<32} avg {:.2} ({} votes)\n",
                    i + 1,
                    row.model.to_string(),
                    row.average_rank,
                    row.evaluation_count
                ));
            }
        }

        // Stage 3
        if let Some(synthesis) = run.synthesis() {
            output.push_str(&Self::section_header(Stage::Synthesize));
            output.push_str(&format!(
                "\n{}\n\n{}\n",
                format!("Chairman: {}", synthesis.model).yellow().bold(),
                synthesis.response
            ));
        }

        // Stage 4
        if let Some(reflection) = run.reflection() {
            output.push_str(&Self::section_header(Stage::Reflect));
            output.push_str(&format!("\n{}\n{}\n", "Critique:".cyan().bold(), reflection.critique));
            if let Some(comparison) = &reflection.comparison_to_previous {
                output.push_str(&format!("\n{}\n{}\n", "Compared to previous:".cyan().bold(), comparison));
            }
            if !reflection.suggested_system_prompt.is_empty() {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    "Suggested system prompt:".cyan().bold(),
                    reflection.suggested_system_prompt
                ));
            }
            if !reflection.suggested_query.is_empty() {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    "Suggested query:".cyan().bold(),
                    reflection.suggested_query
                ));
            }
        }

        if let Some(failure) = run.failure() {
            output.push_str(&format!(
                "\n{} Stage {}: {}\n",
                "Failed:".red().bold(),
                failure.stage.number(),
                failure.message
            ));
        }

        output.push_str(&Self::format_cost(run));
        output.push_str(&Self::footer());
        output
    }

    /// The run plus its run-scoped ranking metadata
    pub fn format_json(run: &PipelineRun) -> String {
        let value = serde_json::json!({
            "run": run,
            "metadata": {
                "label_to_model": run.label_map(),
                "aggregate_rankings": run.aggregate_rankings(),
            },
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Only the synthesis (concise output)
    pub fn format_synthesis_only(run: &PipelineRun) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== LLM Council Conclusion ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), run.query()));

        match (run.synthesis(), run.failure()) {
            (Some(synthesis), _) => {
                output.push_str(&format!(
                    "{} {}\n\n",
                    "Chairman:".dimmed(),
                    synthesis.model
                ));
                output.push_str(&synthesis.response);
                output.push('\n');
            }
            (None, Some(failure)) => {
                output.push_str(&format!("{} {}\n", "Error:".red().bold(), failure.message));
            }
            (None, None) => {}
        }

        output
    }

    /// One event as a JSON line
    pub fn format_event(event: &PipelineEvent) -> String {
        serde_json::to_string(event).unwrap_or_else(|_| format!("{{\"type\":\"{}\"}}", event.name()))
    }

    fn format_cost(run: &PipelineRun) -> String {
        let cost = run.cost();
        let mut output = format!("\n{} {}\n", "Cost:".cyan().bold(), cost.total);
        for (stage, amount) in &cost.per_stage {
            output.push_str(&format!("  stage {}  {}\n", stage.number(), amount));
        }
        for (model, amount) in &cost.per_model {
            output.push_str(&format!("  {:<32} {}\n", model.to_string(), amount));
        }
        output
    }

    /// `--pricing`: USD per 1M tokens
    pub fn format_pricing(table: &PricingTable) -> String {
        let mut output = format!(
            "{}\n{:<28} {:>10} {:>10}\n",
            "Model pricing (USD per 1M tokens)".cyan().bold(),
            "model",
            "input",
            "output"
        );
        for (model, price) in table.entries() {
            output.push_str(&format!(
                "{:<28} {:>10.3} {:>10.3}\n",
                model,
                price.input_usd_per_million(),
                price.output_usd_per_million()
            ));
        }
        output
    }

    /// `--list-tools`
    pub fn format_tools<'a>(
        tools: impl IntoIterator<Item = &'a ToolDefinition>,
        connectors: &[ConnectorInfo],
    ) -> String {
        let mut output = format!("{}\n", "Tools (--tool NAME):".cyan().bold());
        for tool in tools {
            output.push_str(&format!("  {:<16} {}\n", tool.name.bold(), tool.description));
        }
        output.push_str(&format!(
            "\n{}\n",
            "Connectors (--connector NAME[:JSON]):".cyan().bold()
        ));
        for connector in connectors {
            output.push_str(&format!(
                "  {:<16} {}\n",
                connector.name.bold(),
                connector.description
            ));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(stage: Stage) -> String {
        format!(
            "\n{}\n{}\n",
            format!("Stage {}: {}", stage.number(), stage.display_name())
                .cyan()
                .bold(),
            "-".repeat(40)
        )
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, run: &PipelineRun) -> String {
        Self::format(run)
    }

    fn format_json(&self, run: &PipelineRun) -> String {
        Self::format_json(run)
    }

    fn format_synthesis_only(&self, run: &PipelineRun) -> String {
        Self::format_synthesis_only(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{
        ModelId, ProviderResult, Stage1Entry, Stage2Entry, SynthesisResult, parse_ranking,
    };

    fn id(s: &str) -> ModelId {
        ModelId::new(s).unwrap()
    }

    fn sample_run() -> PipelineRun {
        let mut run = PipelineRun::new("Why is the sky blue?", None);
        run.begin(Stage::Collect).unwrap();
        run.record_stage1(vec![
            Stage1Entry {
                model: id("gpt-5.2"),
                response: ProviderResult::from_text("Rayleigh scattering."),
            },
            Stage1Entry {
                model: id("claude-sonnet-4-6"),
                response: ProviderResult::from_text("Shorter wavelengths scatter more."),
            },
        ])
        .unwrap();
        run.begin(Stage::Rank).unwrap();
        let text = "B is better.\n\nFINAL RANKING:\n1. Response B\n2. Response A";
        run.record_stage2(vec![Stage2Entry {
            evaluator_model: id("gpt-5.2"),
            raw_evaluation: text.to_string(),
            parsed_ranking: parse_ranking(text),
            usage: None,
        }]);
        run.begin(Stage::Synthesize).unwrap();
        run.record_synthesis(SynthesisResult {
            model: id("claude-sonnet-4-6"),
            response: "Blue light scatters most.".to_string(),
            usage: None,
        });
        run
    }

    #[test]
    fn test_full_output_lists_every_stage() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&sample_run());
        assert!(output.contains("Stage 1: Collecting responses"));
        assert!(output.contains("── gpt-5.2 [Response A] ──"));
        assert!(output.contains("Parsed: Response B (claude-sonnet-4-6) > Response A (gpt-5.2)"));
        assert!(output.contains("1. claude-sonnet-4-6"));
        assert!(output.contains("Chairman: claude-sonnet-4-6"));
        assert!(!output.contains("Stage 4"));
    }

    #[test]
    fn test_json_includes_ranking_metadata() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&sample_run())).unwrap();
        assert_eq!(json["run"]["query"], "Why is the sky blue?");
        assert_eq!(
            json["metadata"]["aggregate_rankings"][0]["model"],
            "claude-sonnet-4-6"
        );
    }

    #[test]
    fn test_synthesis_only() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format_synthesis_only(&sample_run());
        assert!(output.ends_with("Blue light scatters most.\n"));
    }

    #[test]
    fn test_event_line() {
        assert_eq!(
            ConsoleFormatter::format_event(&PipelineEvent::Stage1Start),
            r#"{"type":"stage1_start"}"#
        );
    }
}
