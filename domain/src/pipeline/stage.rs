//! Deliberation stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four stages of one deliberation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Independent answers from every council member
    #[serde(rename = "stage1")]
    Collect,
    /// Anonymised peer ranking
    #[serde(rename = "stage2")]
    Rank,
    /// Chairman synthesis
    #[serde(rename = "stage3")]
    Synthesize,
    /// Chairman self-critique and follow-up suggestions
    #[serde(rename = "stage4")]
    Reflect,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Collect, Stage::Rank, Stage::Synthesize, Stage::Reflect];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Collect => "stage1",
            Stage::Rank => "stage2",
            Stage::Synthesize => "stage3",
            Stage::Reflect => "stage4",
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Stage::Collect => 1,
            Stage::Rank => 2,
            Stage::Synthesize => 3,
            Stage::Reflect => 4,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Collect => "Collecting responses",
            Stage::Rank => "Peer ranking",
            Stage::Synthesize => "Synthesis",
            Stage::Reflect => "Reflection",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Stage::Collect => "💬",
            Stage::Rank => "🔍",
            Stage::Synthesize => "🧩",
            Stage::Reflect => "🪞",
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Collect => Some(Stage::Rank),
            Stage::Rank => Some(Stage::Synthesize),
            Stage::Synthesize => Some(Stage::Reflect),
            Stage::Reflect => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::Collect.next(), Some(Stage::Rank));
        assert_eq!(Stage::Reflect.next(), None);
        assert!(Stage::Rank < Stage::Synthesize);
        let numbers: Vec<u8> = Stage::ALL.iter().map(Stage::number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stage_serializes_as_wire_name() {
        assert_eq!(serde_json::to_string(&Stage::Synthesize).unwrap(), "\"stage3\"");
        let back: Stage = serde_json::from_str("\"stage1\"").unwrap();
        assert_eq!(back, Stage::Collect);
    }
}
