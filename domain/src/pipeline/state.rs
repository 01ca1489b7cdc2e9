//! Pipeline state machine
//!
//! ```text
//! idle → stage1 → stage2 → stage3 → stage4 → complete
//!          └────────┴────────┴────────┴──→ failed
//! ```

use super::stage::Stage;
use crate::core::error::DomainError;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Running(Stage),
    Complete,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Running(stage) => stage.as_str(),
            PipelineState::Complete => "complete",
            PipelineState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed)
    }

    /// Move to `to` if the transition is legal.
    pub fn advance(self, to: PipelineState) -> Result<PipelineState, DomainError> {
        use PipelineState::*;
        let legal = match (self, to) {
            (Idle, Running(Stage::Collect)) => true,
            (Running(from), Running(next)) => from.next() == Some(next),
            (Running(Stage::Reflect), Complete) => true,
            (Running(_), Failed) => true,
            _ => false,
        };
        if legal {
            Ok(to)
        } else {
            Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PipelineState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn test_happy_path() {
        let mut state = Idle;
        for stage in Stage::ALL {
            state = state.advance(Running(stage)).unwrap();
        }
        state = state.advance(Complete).unwrap();
        assert!(state.is_terminal());
        assert_eq!(state.to_string(), "complete");
    }

    #[test]
    fn test_cannot_skip_stages() {
        assert!(Idle.advance(Running(Stage::Rank)).is_err());
        assert!(Running(Stage::Collect).advance(Running(Stage::Synthesize)).is_err());
        assert!(Running(Stage::Synthesize).advance(Complete).is_err());
    }

    #[test]
    fn test_failed_reachable_only_from_running() {
        assert!(Running(Stage::Rank).advance(Failed).is_ok());
        assert!(Idle.advance(Failed).is_err());
        assert!(Complete.advance(Failed).is_err());
        assert!(Failed.advance(Running(Stage::Collect)).is_err());
    }
}
