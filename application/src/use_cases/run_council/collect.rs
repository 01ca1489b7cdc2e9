//! Stage 1: parallel fan-out to the council members

use super::{RunCouncilInput, RunCouncilUseCase};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::query_model::ModelCall;
use council_domain::{Message, ModelId, PromptTemplate, Stage, Stage1Entry};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// The Stage 1 user message: previous-iteration note (when shared),
/// then attached files, then the query itself.
pub(super) fn stage1_message(input: &RunCouncilInput) -> Message {
    let query = match input.shared_previous() {
        Some(previous) => PromptTemplate::with_previous_context(&input.query, previous),
        None => input.query.clone(),
    };
    let text = PromptTemplate::with_file_context(&query, input.file_context.as_deref());
    Message::user_with_images(text, input.images.clone())
}

impl RunCouncilUseCase {
    /// Query every member concurrently. Entries come back in arrival
    /// order; failed members are dropped.
    pub(super) async fn stage_collect(
        &self,
        input: &RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> Vec<Stage1Entry> {
        let members = input.council.members();
        info!("Stage 1: Collecting responses from {} models", members.len());
        progress.on_stage_start(Stage::Collect, members.len());

        let message = stage1_message(input);
        let tools = self.tool_executor.definitions_for(&input.enabled_tools);
        if !tools.is_empty() {
            info!(
                "Stage 1: Offering {} tools ({})",
                tools.len(),
                tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
            );
        }

        let mut pending: Vec<ModelId> = members.to_vec();
        let mut join_set = JoinSet::new();
        for model in members {
            let caller = self.caller();
            let call = ModelCall::new(model.clone(), message.clone())
                .with_system_prompt(input.system_prompt.clone())
                .with_tools(tools.clone());

            join_set.spawn(async move {
                let model = call.model.clone();
                let result = caller.execute(call).await;
                (model, result)
            });
        }

        let mut entries = Vec::with_capacity(members.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((model, Ok(response))) => {
                    info!("Model {} responded", model);
                    pending.retain(|m| m != &model);
                    progress.on_task_complete(Stage::Collect, &model, true);
                    self.conversation_logger.log(ConversationEvent::new(
                        "council_response",
                        serde_json::json!({
                            "model": model.to_string(),
                            "content": response.text(),
                            "tool_calls": response.tool_calls.len(),
                        }),
                    ));
                    entries.push(Stage1Entry { model, response });
                }
                Ok((model, Err(e))) => {
                    warn!("Model {} failed ({}): {}", model, e.kind(), e);
                    pending.retain(|m| m != &model);
                    progress.on_task_complete(Stage::Collect, &model, false);
                }
                Err(e) => {
                    warn!("Stage 1 task panicked: {}", e);
                }
            }
        }

        // Tasks that panicked never reported their model
        for model in pending {
            warn!("Model {} produced no result in Stage 1", model);
            progress.on_task_complete(Stage::Collect, &model, false);
        }

        progress.on_stage_complete(Stage::Collect);
        entries
    }
}
