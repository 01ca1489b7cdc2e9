//! The aggregate root of one deliberation run

use super::entries::{
    PreviousIteration, ReflectionResult, Stage1Entry, Stage2Entry, StageFailure, SynthesisResult,
};
use super::stage::Stage;
use super::state::PipelineState;
use crate::core::error::DomainError;
use crate::cost::breakdown::{CostBreakdown, UsageLine};
use crate::cost::pricing::PricingTable;
use crate::council::label::LabelMap;
use crate::council::ranking::{AggregateRankingRow, aggregate_rankings};
use serde::Serialize;
use uuid::Uuid;

/// Everything one query (or rerun) produced.
///
/// Lives for one run only. The label map and aggregate rankings are
/// run-scoped metadata and are skipped when the run is serialized.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    id: Uuid,
    query: String,
    system_prompt: Option<String>,
    state: PipelineState,
    stage1: Vec<Stage1Entry>,
    #[serde(skip)]
    label_map: LabelMap,
    stage2: Vec<Stage2Entry>,
    #[serde(skip)]
    aggregate_rankings: Vec<AggregateRankingRow>,
    stage3: Option<SynthesisResult>,
    stage4: Option<ReflectionResult>,
    cost: CostBreakdown,
    failure: Option<StageFailure>,
}

impl PipelineRun {
    pub fn new(query: impl Into<String>, system_prompt: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            system_prompt,
            state: PipelineState::Idle,
            stage1: Vec::new(),
            label_map: LabelMap::default(),
            stage2: Vec::new(),
            aggregate_rankings: Vec::new(),
            stage3: None,
            stage4: None,
            cost: CostBreakdown::default(),
            failure: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stage1(&self) -> &[Stage1Entry] {
        &self.stage1
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.label_map
    }

    pub fn stage2(&self) -> &[Stage2Entry] {
        &self.stage2
    }

    pub fn aggregate_rankings(&self) -> &[AggregateRankingRow] {
        &self.aggregate_rankings
    }

    pub fn synthesis(&self) -> Option<&SynthesisResult> {
        self.stage3.as_ref()
    }

    pub fn reflection(&self) -> Option<&ReflectionResult> {
        self.stage4.as_ref()
    }

    pub fn cost(&self) -> &CostBreakdown {
        &self.cost
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        self.failure.as_ref()
    }

    /// Enter `stage`; stages must be entered in order.
    pub fn begin(&mut self, stage: Stage) -> Result<(), DomainError> {
        self.state = self.state.advance(PipelineState::Running(stage))?;
        Ok(())
    }

    /// Store Stage 1 results (in arrival order) and assign labels.
    pub fn record_stage1(&mut self, entries: Vec<Stage1Entry>) -> Result<&LabelMap, DomainError> {
        self.label_map = LabelMap::assign(entries.iter().map(|e| &e.model))?;
        self.stage1 = entries;
        Ok(&self.label_map)
    }

    /// Store Stage 2 evaluations and derive the aggregate ranking.
    pub fn record_stage2(&mut self, entries: Vec<Stage2Entry>) -> &[AggregateRankingRow] {
        self.aggregate_rankings = aggregate_rankings(
            entries.iter().map(|e| e.parsed_ranking.as_slice()),
            &self.label_map,
        );
        self.stage2 = entries;
        &self.aggregate_rankings
    }

    pub fn record_synthesis(&mut self, result: SynthesisResult) {
        self.stage3 = Some(result);
    }

    pub fn record_reflection(&mut self, result: ReflectionResult) {
        self.stage4 = Some(result);
    }

    /// Record a failure. Terminal failures move the run to `failed`;
    /// a Stage 4 failure is kept for reporting and the run still completes.
    pub fn fail(&mut self, failure: StageFailure, terminal: bool) -> Result<(), DomainError> {
        if terminal {
            self.state = self.state.advance(PipelineState::Failed)?;
        }
        self.failure = Some(failure);
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), DomainError> {
        self.state = self.state.advance(PipelineState::Complete)?;
        Ok(())
    }

    /// Every usage record produced so far, tagged with its stage.
    pub fn usage_lines(&self) -> Vec<UsageLine<'_>> {
        let mut lines = Vec::new();
        for entry in &self.stage1 {
            if let Some(usage) = entry.response.usage {
                lines.push(UsageLine { stage: Stage::Collect, model: &entry.model, usage });
            }
        }
        for entry in &self.stage2 {
            if let Some(usage) = entry.usage {
                lines.push(UsageLine { stage: Stage::Rank, model: &entry.evaluator_model, usage });
            }
        }
        if let Some(result) = &self.stage3
            && let Some(usage) = result.usage
        {
            lines.push(UsageLine { stage: Stage::Synthesize, model: &result.model, usage });
        }
        if let Some(result) = &self.stage4
            && let Some(usage) = result.usage
        {
            lines.push(UsageLine { stage: Stage::Reflect, model: &result.model, usage });
        }
        lines
    }

    /// Recompute the cumulative cost from everything recorded so far.
    pub fn recompute_cost(&mut self, pricing: &PricingTable) -> &CostBreakdown {
        self.cost = CostBreakdown::compute(self.usage_lines(), pricing);
        &self.cost
    }

    /// Context bundle for a rerun; requires a synthesis.
    pub fn to_previous_iteration(&self) -> Option<PreviousIteration> {
        let synthesis = self.stage3.as_ref()?;
        Some(PreviousIteration {
            query: self.query.clone(),
            system_prompt: self.system_prompt.clone(),
            stage3_response: synthesis.response.clone(),
            critique: self
                .stage4
                .as_ref()
                .map(|r| r.critique.clone())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model_id::ModelId;
    use crate::cost::pricing::ModelPrice;
    use crate::council::label::AnonymizedLabel;
    use crate::pipeline::entries::ProviderResult;
    use crate::session::response::TokenUsage;

    fn id(s: &str) -> ModelId {
        ModelId::new(s).unwrap()
    }

    fn entry(model: &str, usage: TokenUsage) -> Stage1Entry {
        Stage1Entry {
            model: id(model),
            response: ProviderResult::from_text(format!("answer from {model}")).with_usage(usage),
        }
    }

    #[test]
    fn test_labels_follow_arrival_order() {
        let mut run = PipelineRun::new("q", None);
        run.begin(Stage::Collect).unwrap();
        let map = run
            .record_stage1(vec![entry("late", TokenUsage::default()), entry("early", TokenUsage::default())])
            .unwrap();
        assert_eq!(
            map.model_for(&AnonymizedLabel::for_index(0)).unwrap().as_str(),
            "late"
        );
    }

    #[test]
    fn test_terminal_failure_keeps_completed_stages() {
        let mut run = PipelineRun::new("q", None);
        run.begin(Stage::Collect).unwrap();
        run.record_stage1(vec![entry("a", TokenUsage::default())]).unwrap();
        run.begin(Stage::Rank).unwrap();
        run.record_stage2(vec![]);
        run.begin(Stage::Synthesize).unwrap();
        run.fail(StageFailure::new(Stage::Synthesize, "timeout"), true).unwrap();

        assert_eq!(run.state(), PipelineState::Failed);
        assert_eq!(run.stage1().len(), 1);
        assert!(run.synthesis().is_none());
        assert!(run.to_previous_iteration().is_none());
    }

    #[test]
    fn test_cost_is_cumulative_across_stages() {
        let pricing = PricingTable::empty().with_price("a", ModelPrice::new(1, 1));
        let mut run = PipelineRun::new("q", None);
        run.begin(Stage::Collect).unwrap();
        run.record_stage1(vec![entry("a", TokenUsage::new(10, 0))]).unwrap();
        assert_eq!(run.recompute_cost(&pricing).total.0, 10);

        run.begin(Stage::Rank).unwrap();
        run.record_stage2(vec![Stage2Entry {
            evaluator_model: id("a"),
            raw_evaluation: String::new(),
            parsed_ranking: vec![],
            usage: Some(TokenUsage::new(0, 5)),
        }]);
        let cost = run.recompute_cost(&pricing);
        assert_eq!(cost.total.0, 15);
        assert_eq!(cost.stage(Stage::Collect).0, 10);
        assert_eq!(cost.stage(Stage::Rank).0, 5);
    }

    #[test]
    fn test_serialized_run_omits_label_metadata() {
        let mut run = PipelineRun::new("q", None);
        run.begin(Stage::Collect).unwrap();
        run.record_stage1(vec![entry("a", TokenUsage::default())]).unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert!(json.get("label_map").is_none());
        assert!(json.get("aggregate_rankings").is_none());
        assert_eq!(json["state"], "stage1");
    }
}
