//! Stage 4: chairman reflection

use super::{RunCouncilInput, RunCouncilUseCase};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::llm_gateway::GatewayError;
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::query_model::ModelCall;
use council_domain::{
    Message, PromptTemplate, ReflectionResult, Stage, Stage1Entry, parse_reflection,
};
use tracing::{debug, info};

impl RunCouncilUseCase {
    /// The chairman critiques its own synthesis and proposes a better
    /// system prompt and query. The comparison section is only requested
    /// (and only kept) when the previous iteration is shared.
    pub(super) async fn stage_reflect(
        &self,
        input: &RunCouncilInput,
        stage1: &[Stage1Entry],
        synthesis: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<ReflectionResult, GatewayError> {
        let chairman = input.council.chairman();
        let previous = input.shared_previous();
        info!(
            "Stage 4: Chairman {} reflecting{}",
            chairman,
            if previous.is_some() { " (with previous iteration)" } else { "" }
        );
        progress.on_stage_start(Stage::Reflect, 1);

        let prompt = PromptTemplate::reflection_prompt(
            &input.query,
            input.system_prompt.as_deref(),
            stage1,
            synthesis,
            previous,
        );
        let result = self
            .caller()
            .execute(ModelCall::new(chairman.clone(), Message::user(prompt)))
            .await;
        progress.on_task_complete(Stage::Reflect, chairman, result.is_ok());
        progress.on_stage_complete(Stage::Reflect);

        let response = result?;
        let sections = parse_reflection(response.text());
        debug!(
            "Reflection sections: critique={} prompt={} query={}",
            !sections.critique.is_empty(),
            !sections.suggested_system_prompt.is_empty(),
            !sections.suggested_query.is_empty()
        );

        self.conversation_logger.log(ConversationEvent::new(
            "reflection",
            serde_json::json!({
                "model": chairman.to_string(),
                "critique": sections.critique,
                "suggested_system_prompt": sections.suggested_system_prompt,
                "suggested_query": sections.suggested_query,
            }),
        ));

        Ok(ReflectionResult {
            model: chairman.clone(),
            critique: sections.critique,
            suggested_system_prompt: sections.suggested_system_prompt,
            suggested_query: sections.suggested_query,
            comparison_to_previous: sections.comparison.filter(|_| previous.is_some()),
            usage: response.usage,
        })
    }
}
