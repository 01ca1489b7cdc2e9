//! Stage 2: anonymised peer ranking

use super::RunCouncilUseCase;
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::query_model::ModelCall;
use council_domain::{
    LabelMap, Message, ModelId, PromptTemplate, Stage, Stage1Entry, Stage2Entry, parse_ranking,
};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

impl RunCouncilUseCase {
    /// Every Stage 1 responder ranks the labelled answers. Evaluations
    /// come back in arrival order; failed evaluators are dropped.
    pub(super) async fn stage_rank(
        &self,
        query: &str,
        stage1: &[Stage1Entry],
        labels: &LabelMap,
        progress: &dyn ProgressNotifier,
    ) -> Vec<Stage2Entry> {
        info!("Stage 2: Peer ranking by {} evaluators", stage1.len());
        progress.on_stage_start(Stage::Rank, stage1.len());

        // Label order, not arrival order, fixes the presentation order.
        let responses: Vec<_> = labels
            .iter()
            .filter_map(|(label, model)| {
                stage1
                    .iter()
                    .find(|e| &e.model == model)
                    .map(|e| (label, e.response.text()))
            })
            .collect();
        let prompt = PromptTemplate::ranking_prompt(query, &responses);
        let message = Message::user(prompt);

        let mut pending: Vec<ModelId> = stage1.iter().map(|e| &e.model).cloned().collect();
        let mut join_set = JoinSet::new();
        for entry in stage1 {
            let caller = self.caller();
            let call = ModelCall::new(entry.model.clone(), message.clone());
            join_set.spawn(async move {
                let model = call.model.clone();
                let result = caller.execute(call).await;
                (model, result)
            });
        }

        let mut evaluations = Vec::with_capacity(stage1.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((model, Ok(response))) => {
                    let raw = response.text().to_string();
                    let parsed = parse_ranking(&raw);
                    debug!("Evaluator {} ranked {} responses", model, parsed.len());
                    pending.retain(|m| m != &model);
                    progress.on_task_complete(Stage::Rank, &model, true);
                    self.conversation_logger.log(ConversationEvent::new(
                        "peer_evaluation",
                        serde_json::json!({
                            "evaluator": model.to_string(),
                            "evaluation": raw,
                            "parsed_ranking": parsed.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
                        }),
                    ));
                    evaluations.push(Stage2Entry {
                        evaluator_model: model,
                        raw_evaluation: raw,
                        parsed_ranking: parsed,
                        usage: response.usage,
                    });
                }
                Ok((model, Err(e))) => {
                    warn!("Evaluator {} failed ({}): {}", model, e.kind(), e);
                    pending.retain(|m| m != &model);
                    progress.on_task_complete(Stage::Rank, &model, false);
                }
                Err(e) => {
                    warn!("Stage 2 task panicked: {}", e);
                }
            }
        }

        // Tasks that panicked never reported their model
        for model in pending {
            warn!("Model {} produced no result in Stage 2", model);
            progress.on_task_complete(Stage::Rank, &model, false);
        }

        progress.on_stage_complete(Stage::Rank);
        evaluations
    }
}
