//! Progress notification port
//!
//! Per-call progress for interactive displays. The event stream remains
//! the authoritative record of a run; these callbacks only drive spinners.

use council_domain::{ModelId, Stage};

pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage dispatches its calls
    fn on_stage_start(&self, stage: Stage, total_tasks: usize);

    /// Called when one call within a stage settles
    fn on_task_complete(&self, stage: Stage, model: &ModelId, success: bool);

    /// Called when a stage has settled
    fn on_stage_complete(&self, stage: Stage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _total_tasks: usize) {}
    fn on_task_complete(&self, _stage: Stage, _model: &ModelId, _success: bool) {}
    fn on_stage_complete(&self, _stage: Stage) {}
}
