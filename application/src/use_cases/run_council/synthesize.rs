//! Stage 3: chairman synthesis

use super::{RunCouncilInput, RunCouncilUseCase};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::llm_gateway::GatewayError;
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::query_model::ModelCall;
use council_domain::{Message, PromptTemplate, Stage, Stage1Entry, Stage2Entry, SynthesisResult};
use tracing::info;

impl RunCouncilUseCase {
    /// The chairman sees every answer and evaluation with model names
    /// attached. No system prompt and no tools.
    pub(super) async fn stage_synthesize(
        &self,
        input: &RunCouncilInput,
        stage1: &[Stage1Entry],
        stage2: &[Stage2Entry],
        progress: &dyn ProgressNotifier,
    ) -> Result<SynthesisResult, GatewayError> {
        let chairman = input.council.chairman();
        info!("Stage 3: Chairman {} synthesizing", chairman);
        progress.on_stage_start(Stage::Synthesize, 1);

        let prompt = PromptTemplate::synthesis_prompt(&input.query, stage1, stage2);
        let result = self
            .caller()
            .execute(ModelCall::new(chairman.clone(), Message::user(prompt)))
            .await;
        progress.on_task_complete(Stage::Synthesize, chairman, result.is_ok());
        progress.on_stage_complete(Stage::Synthesize);

        let response = result?;
        self.conversation_logger.log(ConversationEvent::new(
            "synthesis",
            serde_json::json!({
                "model": chairman.to_string(),
                "content": response.text(),
            }),
        ));

        Ok(SynthesisResult {
            model: chairman.clone(),
            response: response.text().to_string(),
            usage: response.usage,
        })
    }
}
