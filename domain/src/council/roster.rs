//! Council membership

use crate::core::{error::DomainError, model_id::ModelId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The set of models queried in Stage 1 plus the chairman that
/// synthesises and reflects (Value Object).
///
/// Members keep their configured order; duplicates are rejected so
/// that every successful response can be mapped to exactly one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CouncilSpec", into = "CouncilSpec")]
pub struct Council {
    members: Vec<ModelId>,
    chairman: ModelId,
}

impl Council {
    pub fn new(members: Vec<ModelId>, chairman: ModelId) -> Result<Self, DomainError> {
        if members.is_empty() {
            return Err(DomainError::EmptyCouncil);
        }
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member) {
                return Err(DomainError::DuplicateModel(member.to_string()));
            }
        }
        Ok(Self { members, chairman })
    }

    /// Build a council from raw identifiers.
    pub fn from_strs<S: AsRef<str>>(members: &[S], chairman: &str) -> Result<Self, DomainError> {
        let members = members
            .iter()
            .map(|m| ModelId::new(m.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(members, ModelId::new(chairman)?)
    }

    pub fn members(&self) -> &[ModelId] {
        &self.members
    }

    pub fn chairman(&self) -> &ModelId {
        &self.chairman
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, model: &ModelId) -> bool {
        self.members.contains(model)
    }
}

#[derive(Serialize, Deserialize)]
struct CouncilSpec {
    members: Vec<ModelId>,
    chairman: ModelId,
}

impl TryFrom<CouncilSpec> for Council {
    type Error = DomainError;

    fn try_from(spec: CouncilSpec) -> Result<Self, Self::Error> {
        Council::new(spec.members, spec.chairman)
    }
}

impl From<Council> for CouncilSpec {
    fn from(council: Council) -> Self {
        CouncilSpec {
            members: council.members,
            chairman: council.chairman,
        }
    }
}
