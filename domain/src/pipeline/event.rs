//! The typed event stream of one run.
//!
//! Events are append-only and ordered: a stage's start precedes its
//! complete, and stage n completes before stage n+1 starts.

use super::entries::{ReflectionResult, Stage1Entry, Stage2Entry, SynthesisResult};
use super::stage::Stage;
use crate::cost::breakdown::CostBreakdown;
use crate::council::label::LabelMap;
use crate::council::ranking::AggregateRankingRow;
use serde::Serialize;

/// Run-scoped Stage 2 metadata. Emitted with `stage2_complete`, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingMetadata {
    pub label_to_model: LabelMap,
    pub aggregate_rankings: Vec<AggregateRankingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Stage1Start,
    Stage1Complete {
        data: Vec<Stage1Entry>,
    },
    Stage2Start,
    Stage2Complete {
        data: Vec<Stage2Entry>,
        metadata: RankingMetadata,
    },
    Stage3Start,
    Stage3Complete {
        data: SynthesisResult,
    },
    Stage4Start,
    Stage4Complete {
        data: ReflectionResult,
    },
    CostSummary {
        data: CostBreakdown,
    },
    Error {
        stage: Stage,
        message: String,
    },
    Complete,
}

impl PipelineEvent {
    pub fn start(stage: Stage) -> Self {
        match stage {
            Stage::Collect => PipelineEvent::Stage1Start,
            Stage::Rank => PipelineEvent::Stage2Start,
            Stage::Synthesize => PipelineEvent::Stage3Start,
            Stage::Reflect => PipelineEvent::Stage4Start,
        }
    }

    /// Wire name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::Stage1Start => "stage1_start",
            PipelineEvent::Stage1Complete { .. } => "stage1_complete",
            PipelineEvent::Stage2Start => "stage2_start",
            PipelineEvent::Stage2Complete { .. } => "stage2_complete",
            PipelineEvent::Stage3Start => "stage3_start",
            PipelineEvent::Stage3Complete { .. } => "stage3_complete",
            PipelineEvent::Stage4Start => "stage4_start",
            PipelineEvent::Stage4Complete { .. } => "stage4_complete",
            PipelineEvent::CostSummary { .. } => "cost_summary",
            PipelineEvent::Error { .. } => "error",
            PipelineEvent::Complete => "complete",
        }
    }

    /// Stage this event belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineEvent::Stage1Start | PipelineEvent::Stage1Complete { .. } => Some(Stage::Collect),
            PipelineEvent::Stage2Start | PipelineEvent::Stage2Complete { .. } => Some(Stage::Rank),
            PipelineEvent::Stage3Start | PipelineEvent::Stage3Complete { .. } => {
                Some(Stage::Synthesize)
            }
            PipelineEvent::Stage4Start | PipelineEvent::Stage4Complete { .. } => {
                Some(Stage::Reflect)
            }
            PipelineEvent::Error { stage, .. } => Some(*stage),
            PipelineEvent::CostSummary { .. } | PipelineEvent::Complete => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model_id::ModelId;

    #[test]
    fn test_tag_matches_name() {
        let events = [
            PipelineEvent::Stage1Start,
            PipelineEvent::Stage3Start,
            PipelineEvent::Complete,
            PipelineEvent::Error {
                stage: Stage::Synthesize,
                message: "boom".to_string(),
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.name());
        }
    }

    #[test]
    fn test_error_payload() {
        let event = PipelineEvent::Error {
            stage: Stage::Synthesize,
            message: "chairman timed out".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["stage"], "stage3");
        assert_eq!(json["message"], "chairman timed out");
        assert_eq!(event.stage(), Some(Stage::Synthesize));
    }

    #[test]
    fn test_stage3_complete_payload() {
        let event = PipelineEvent::Stage3Complete {
            data: SynthesisResult {
                model: ModelId::new("chair").unwrap(),
                response: "final".to_string(),
                usage: None,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stage3_complete");
        assert_eq!(json["data"]["model"], "chair");
        assert_eq!(json["data"]["response"], "final");
    }
}
