//! Progress reporting for council runs

use super::events::describe_event;
use colored::Colorize;
use council_application::ports::progress::ProgressNotifier;
use council_domain::{ModelId, PipelineEvent, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Progress bars per stage, plus one status line per pipeline event.
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_label(stage: Stage) -> String {
        format!("Stage {}: {}", stage.number(), stage.display_name())
    }

    /// Print a status line for an event from the run's stream.
    pub fn report_event(&self, event: &PipelineEvent) {
        if let Some(line) = describe_event(event) {
            let _ = self.multi.println(line);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: Stage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_label(stage));
        pb.set_message(format!("{} waiting...", stage.emoji()));

        if let Ok(mut bar) = self.stage_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_task_complete(&self, _stage: Stage, model: &ModelId, success: bool) {
        if let Ok(bar) = self.stage_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), model)
            } else {
                format!("{} {}", "x".red(), model)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: Stage) {
        if let Ok(mut bar) = self.stage_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(format!("Stage {} done", stage.number()).green().to_string());
        }
    }
}

/// Plain line-based progress (no bars), for non-interactive output
pub struct SimpleProgress;

impl SimpleProgress {
    pub fn report_event(&self, event: &PipelineEvent) {
        if let Some(line) = describe_event(event) {
            eprintln!("{}", line);
        }
    }
}

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: Stage, total_tasks: usize) {
        eprintln!(
            "{} {} ({} calls)",
            "->".cyan(),
            ProgressReporter::stage_label(stage).bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: Stage, model: &ModelId, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), model);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), model);
        }
    }

    fn on_stage_complete(&self, _stage: Stage) {}
}
