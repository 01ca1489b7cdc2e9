//! Anonymised labels for peer evaluation
//!
//! A [`LabelMap`] is created fresh for every pipeline run and owned by
//! that run alone. Evaluator prompts only ever contain the labels.

use crate::core::{error::DomainError, model_id::ModelId};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

const LABEL_PREFIX: &str = "Response ";

/// Opaque per-run stand-in for a model ("Response A", "Response B", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AnonymizedLabel(String);

impl AnonymizedLabel {
    /// Label for the `index`-th collected response (0 → "Response A",
    /// 25 → "Response Z", 26 → "Response AA").
    pub fn for_index(index: usize) -> Self {
        Self(format!("{LABEL_PREFIX}{}", letters(index)))
    }

    /// Parse a label token such as `"Response C"`.
    pub fn parse(token: &str) -> Option<Self> {
        let suffix = token.trim().strip_prefix(LABEL_PREFIX)?;
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_uppercase()) {
            Some(Self(format!("{LABEL_PREFIX}{suffix}")))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AnonymizedLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not a response label: {value:?}"))
    }
}

impl From<AnonymizedLabel> for String {
    fn from(label: AnonymizedLabel) -> Self {
        label.0
    }
}

impl fmt::Display for AnonymizedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bijective base-26 letters: A..Z, AA..AZ, BA..
fn letters(mut index: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Bijection between labels and the models that produced them.
///
/// Entry order is the label assignment order, which is the Stage 1
/// arrival order. It doubles as the final tie-breaker in aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: Vec<(AnonymizedLabel, ModelId)>,
}

impl LabelMap {
    /// Assign labels to models in the given (arrival) order.
    pub fn assign<'a>(models: impl IntoIterator<Item = &'a ModelId>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (i, model) in models.into_iter().enumerate() {
            if !seen.insert(model.clone()) {
                return Err(DomainError::DuplicateModel(model.to_string()));
            }
            entries.push((AnonymizedLabel::for_index(i), model.clone()));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &AnonymizedLabel> {
        self.entries.iter().map(|(label, _)| label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnonymizedLabel, &ModelId)> {
        self.entries.iter().map(|(label, model)| (label, model))
    }

    pub fn model_for(&self, label: &AnonymizedLabel) -> Option<&ModelId> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, model)| model)
    }

    pub fn label_for(&self, model: &ModelId) -> Option<&AnonymizedLabel> {
        self.entries
            .iter()
            .find(|(_, m)| m == model)
            .map(|(label, _)| label)
    }

    /// Assignment position of a label, if it belongs to this run.
    pub fn position(&self, label: &AnonymizedLabel) -> Option<usize> {
        self.entries.iter().position(|(l, _)| l == label)
    }
}

impl Serialize for LabelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, model) in &self.entries {
            map.serialize_entry(label.as_str(), model)?;
        }
        map.end()
    }
}
