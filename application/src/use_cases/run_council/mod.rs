//! Run Council use case.
//!
//! Drives one deliberation run through its four stages:
//!
//! ```text
//! Stage 1 (collect) ─▶ Stage 2 (rank) ─▶ Stage 3 (synthesize) ─▶ Stage 4 (reflect)
//! ```
//!
//! Each stage is a separate submodule; this module owns the controller
//! that sequences them, records results on a [`PipelineRun`] and emits
//! [`PipelineEvent`]s.
//!
//! Stage failures never surface as `Err`: they are recorded on the run
//! and reported with an `error` event. `Err` is reserved for invalid
//! input and cancellation.

mod collect;
mod events;
mod rank;
mod reflect;
mod synthesize;
mod types;

pub use events::EventEmitter;
pub use types::{RunCouncilError, RunCouncilInput};

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::query_model::QueryModelUseCase;
use crate::use_cases::shared::check_cancelled;
use council_domain::{
    PipelineEvent, PipelineRun, PricingTable, Question, RankingMetadata, Stage, StageFailure,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Message recorded when no council member answered
const ALL_MEMBERS_FAILED: &str = "All council members failed to respond";

pub struct RunCouncilUseCase {
    gateway: Arc<dyn LlmGateway>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    conversation_logger: Arc<dyn ConversationLogger>,
    pricing: Arc<PricingTable>,
    params: ExecutionParams,
}

impl Clone for RunCouncilUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tool_executor: self.tool_executor.clone(),
            conversation_logger: self.conversation_logger.clone(),
            pricing: self.pricing.clone(),
            params: self.params.clone(),
        }
    }
}

impl RunCouncilUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        params: ExecutionParams,
    ) -> Self {
        Self {
            gateway,
            tool_executor,
            conversation_logger: Arc::new(NoConversationLogger),
            pricing: Arc::new(PricingTable::builtin()),
            params,
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = Arc::new(pricing);
        self
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Per-call executor shared by all stages
    fn caller(&self) -> QueryModelUseCase {
        QueryModelUseCase::new(
            self.gateway.clone(),
            self.tool_executor.clone(),
            self.conversation_logger.clone(),
            self.params.clone(),
        )
    }

    /// Run without an event consumer.
    pub async fn execute(&self, input: RunCouncilInput) -> Result<PipelineRun, RunCouncilError> {
        self.run(input, &mut EventEmitter::disabled(), &NoProgress)
            .await
    }

    /// Run, writing every event into `events` in order.
    pub async fn execute_streaming(
        &self,
        input: RunCouncilInput,
        events: mpsc::Sender<PipelineEvent>,
        progress: &dyn ProgressNotifier,
    ) -> Result<PipelineRun, RunCouncilError> {
        self.run(input, &mut EventEmitter::new(events), progress)
            .await
    }

    /// Run on a background task and hand back the event stream.
    ///
    /// Dropping the receiver stops the run at the next stage boundary.
    pub fn spawn(
        &self,
        input: RunCouncilInput,
        progress: Arc<dyn ProgressNotifier>,
    ) -> (
        mpsc::Receiver<PipelineEvent>,
        JoinHandle<Result<PipelineRun, RunCouncilError>>,
    ) {
        let (tx, rx) = mpsc::channel(self.params.event_buffer);
        let use_case = self.clone();
        let handle = tokio::spawn(async move {
            use_case
                .execute_streaming(input, tx, progress.as_ref())
                .await
        });
        (rx, handle)
    }

    async fn run(
        &self,
        input: RunCouncilInput,
        emitter: &mut EventEmitter,
        progress: &dyn ProgressNotifier,
    ) -> Result<PipelineRun, RunCouncilError> {
        let question = Question::new(input.query.clone())
            .map_err(|e| RunCouncilError::InvalidInput(e.to_string()))?;
        let mut run = PipelineRun::new(question.content(), input.system_prompt.clone());

        info!(
            "Starting council run {} with {} members (chairman: {})",
            run.id(),
            input.council.len(),
            input.council.chairman()
        );

        // ==================== Stage 1: Collect ====================

        self.checkpoint(&input, emitter)?;
        run.begin(Stage::Collect)?;
        emitter.emit(PipelineEvent::Stage1Start).await;

        let responses = self.stage_collect(&input, progress).await;
        if responses.is_empty() {
            warn!("{}", ALL_MEMBERS_FAILED);
            return self
                .abort(run, StageFailure::new(Stage::Collect, ALL_MEMBERS_FAILED), emitter)
                .await;
        }
        run.record_stage1(responses)?;
        emitter
            .emit(PipelineEvent::Stage1Complete {
                data: run.stage1().to_vec(),
            })
            .await;
        self.emit_cost(&mut run, emitter).await;

        // ==================== Stage 2: Rank ====================

        self.checkpoint(&input, emitter)?;
        run.begin(Stage::Rank)?;
        emitter.emit(PipelineEvent::Stage2Start).await;

        let evaluations = self
            .stage_rank(run.query(), run.stage1(), run.label_map(), progress)
            .await;
        let aggregate = run.record_stage2(evaluations).to_vec();
        emitter
            .emit(PipelineEvent::Stage2Complete {
                data: run.stage2().to_vec(),
                metadata: RankingMetadata {
                    label_to_model: run.label_map().clone(),
                    aggregate_rankings: aggregate,
                },
            })
            .await;
        self.emit_cost(&mut run, emitter).await;

        // ==================== Stage 3: Synthesize ====================

        self.checkpoint(&input, emitter)?;
        run.begin(Stage::Synthesize)?;
        emitter.emit(PipelineEvent::Stage3Start).await;

        match self
            .stage_synthesize(&input, run.stage1(), run.stage2(), progress)
            .await
        {
            Ok(synthesis) => {
                run.record_synthesis(synthesis.clone());
                emitter
                    .emit(PipelineEvent::Stage3Complete { data: synthesis })
                    .await;
                self.emit_cost(&mut run, emitter).await;
            }
            Err(e) => {
                warn!("Chairman synthesis failed: {}", e);
                let failure = StageFailure::new(
                    Stage::Synthesize,
                    format!("Chairman synthesis failed ({}): {}", e.kind(), e),
                );
                return self.abort(run, failure, emitter).await;
            }
        }

        // ==================== Stage 4: Reflect ====================

        self.checkpoint(&input, emitter)?;
        run.begin(Stage::Reflect)?;
        emitter.emit(PipelineEvent::Stage4Start).await;

        let synthesis_text = run
            .synthesis()
            .map(|s| s.response.clone())
            .unwrap_or_default();
        match self
            .stage_reflect(&input, run.stage1(), &synthesis_text, progress)
            .await
        {
            Ok(reflection) => {
                run.record_reflection(reflection.clone());
                emitter
                    .emit(PipelineEvent::Stage4Complete { data: reflection })
                    .await;
            }
            Err(e) => {
                // Reflection is advisory; the run still completes.
                warn!("Chairman reflection failed: {}", e);
                let failure = StageFailure::new(
                    Stage::Reflect,
                    format!("Chairman reflection failed ({}): {}", e.kind(), e),
                );
                emitter
                    .emit(PipelineEvent::Error {
                        stage: failure.stage,
                        message: failure.message.clone(),
                    })
                    .await;
                run.fail(failure, false)?;
            }
        }

        run.finish()?;
        self.emit_cost(&mut run, emitter).await;
        emitter.emit(PipelineEvent::Complete).await;

        info!(
            "Council run {} complete (total cost {})",
            run.id(),
            run.cost().total
        );
        Ok(run)
    }

    /// Stop before a stage when the caller cancelled or the consumer left.
    fn checkpoint(
        &self,
        input: &RunCouncilInput,
        emitter: &EventEmitter,
    ) -> Result<(), RunCouncilError> {
        check_cancelled(&input.cancellation)?;
        if emitter.is_disconnected() {
            info!("Event consumer disconnected; abandoning run");
            return Err(RunCouncilError::Cancelled);
        }
        Ok(())
    }

    async fn abort(
        &self,
        mut run: PipelineRun,
        failure: StageFailure,
        emitter: &mut EventEmitter,
    ) -> Result<PipelineRun, RunCouncilError> {
        emitter
            .emit(PipelineEvent::Error {
                stage: failure.stage,
                message: failure.message.clone(),
            })
            .await;
        run.fail(failure, true)?;
        Ok(run)
    }

    async fn emit_cost(&self, run: &mut PipelineRun, emitter: &mut EventEmitter) {
        let cost = run.recompute_cost(&self.pricing).clone();
        if run.state().is_terminal() {
            self.conversation_logger.log(ConversationEvent::new(
                "cost_summary",
                serde_json::json!({
                    "run_id": run.id().to_string(),
                    "total_usd": cost.total.usd(),
                }),
            ));
        }
        emitter.emit(PipelineEvent::CostSummary { data: cost }).await;
    }
}

#[cfg(test)]
mod tests;
