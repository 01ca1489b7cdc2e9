//! One-line summaries of pipeline events

use colored::Colorize;
use council_domain::PipelineEvent;

/// Status line for `event`; start events are covered by the stage bars.
pub fn describe_event(event: &PipelineEvent) -> Option<String> {
    let line = match event {
        PipelineEvent::Stage1Start
        | PipelineEvent::Stage2Start
        | PipelineEvent::Stage3Start
        | PipelineEvent::Stage4Start => return None,
        PipelineEvent::Stage1Complete { data } => format!(
            "{} {} of the council answered",
            "v".green(),
            data.len()
        ),
        PipelineEvent::Stage2Complete { data, metadata } => {
            let parsed = data.iter().filter(|e| !e.parsed_ranking.is_empty()).count();
            match metadata.aggregate_rankings.first() {
                Some(top) => format!(
                    "{} {} rankings ({} parsed), top: {} (avg {:.2})",
                    "v".green(),
                    data.len(),
                    parsed,
                    top.model.to_string().bold(),
                    top.average_rank
                ),
                None => format!("{} {} rankings, none parsed", "!".yellow(), data.len()),
            }
        }
        PipelineEvent::Stage3Complete { data } => {
            format!("{} {} synthesised the answer", "v".green(), data.model)
        }
        PipelineEvent::Stage4Complete { data } => {
            format!("{} {} reflected on the answer", "v".green(), data.model)
        }
        PipelineEvent::CostSummary { data } => {
            format!("  {} {}", "cost so far:".dimmed(), data.total)
        }
        PipelineEvent::Error { stage, message } => format!(
            "{} Stage {} failed: {}",
            "x".red(),
            stage.number(),
            message
        ),
        PipelineEvent::Complete => format!("{}", "Council finished".green().bold()),
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{CostBreakdown, Nanodollars, Stage};

    #[test]
    fn test_start_events_are_silent() {
        assert!(describe_event(&PipelineEvent::Stage1Start).is_none());
        assert!(describe_event(&PipelineEvent::Stage4Start).is_none());
    }

    #[test]
    fn test_error_and_cost_lines() {
        colored::control::set_override(false);
        let error = PipelineEvent::Error {
            stage: Stage::Synthesize,
            message: "timeout".to_string(),
        };
        assert_eq!(describe_event(&error).unwrap(), "x Stage 3 failed: timeout");

        let cost = PipelineEvent::CostSummary {
            data: CostBreakdown {
                total: Nanodollars(1_500_000),
                ..Default::default()
            },
        };
        assert_eq!(describe_event(&cost).unwrap(), "  cost so far: $0.001500");
    }
}
