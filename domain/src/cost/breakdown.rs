//! Cost breakdown derived from token usage

use super::pricing::PricingTable;
use crate::core::model_id::ModelId;
use crate::pipeline::stage::Stage;
use crate::session::response::TokenUsage;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Integer amount of 1e-9 USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nanodollars(pub u64);

impl Nanodollars {
    pub fn usd(&self) -> f64 {
        self.0 as f64 / 1e9
    }
}

impl Add for Nanodollars {
    type Output = Nanodollars;

    fn add(self, rhs: Nanodollars) -> Nanodollars {
        Nanodollars(self.0 + rhs.0)
    }
}

impl AddAssign for Nanodollars {
    fn add_assign(&mut self, rhs: Nanodollars) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Nanodollars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.6}", self.usd())
    }
}

impl Serialize for Nanodollars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.usd())
    }
}

/// Token usage attributed to one model call in one stage.
#[derive(Debug, Clone, Copy)]
pub struct UsageLine<'a> {
    pub stage: Stage,
    pub model: &'a ModelId,
    pub usage: TokenUsage,
}

/// Cumulative cost of a run so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub total: Nanodollars,
    pub per_stage: BTreeMap<Stage, Nanodollars>,
    pub per_model: BTreeMap<ModelId, Nanodollars>,
}

impl CostBreakdown {
    /// Price every usage line. Every stage that appears gets an entry,
    /// even when its cost is zero.
    pub fn compute<'a>(
        lines: impl IntoIterator<Item = UsageLine<'a>>,
        pricing: &PricingTable,
    ) -> Self {
        let mut breakdown = CostBreakdown::default();
        for line in lines {
            let cost = pricing.cost_of(line.model, line.usage);
            breakdown.total += cost;
            *breakdown.per_stage.entry(line.stage).or_default() += cost;
            *breakdown.per_model.entry(line.model.clone()).or_default() += cost;
        }
        breakdown
    }

    pub fn stage(&self, stage: Stage) -> Nanodollars {
        self.per_stage.get(&stage).copied().unwrap_or_default()
    }
}
