//! Model pricing registry.
//!
//! Costs are in nanodollars per token. $1.00 per 1M tokens is 1,000
//! nanodollars per token.

use super::breakdown::Nanodollars;
use crate::core::model_id::ModelId;
use crate::session::response::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Price of one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPrice {
    pub input_nanos_per_token: u64,
    pub output_nanos_per_token: u64,
}

impl ModelPrice {
    pub const fn new(input: u64, output: u64) -> Self {
        Self {
            input_nanos_per_token: input,
            output_nanos_per_token: output,
        }
    }

    /// Convert a USD-per-1M-tokens price pair. Negative values clamp to zero.
    pub fn from_usd_per_million(input: f64, output: f64) -> Self {
        let to_nanos = |usd: f64| (usd.max(0.0) * 1_000.0).round() as u64;
        Self::new(to_nanos(input), to_nanos(output))
    }

    pub fn input_usd_per_million(&self) -> f64 {
        self.input_nanos_per_token as f64 / 1_000.0
    }

    pub fn output_usd_per_million(&self) -> f64 {
        self.output_nanos_per_token as f64 / 1_000.0
    }

    pub fn cost(&self, usage: TokenUsage) -> Nanodollars {
        Nanodollars(
            usage.input_tokens * self.input_nanos_per_token
                + usage.output_tokens * self.output_nanos_per_token,
        )
    }
}

// Anthropic
// claude-opus-4-6: $5/1M input, $25/1M output
// claude-sonnet-4-6: $3/1M input, $15/1M output
// claude-haiku-4-5: $1/1M input, $5/1M output
const CLAUDE_OPUS_4_6: ModelPrice = ModelPrice::new(5_000, 25_000);
const CLAUDE_SONNET_4_6: ModelPrice = ModelPrice::new(3_000, 15_000);
const CLAUDE_HAIKU_4_5: ModelPrice = ModelPrice::new(1_000, 5_000);

// OpenAI
const GPT_5_2_PRO: ModelPrice = ModelPrice::new(21_000, 168_000);
const GPT_5_2: ModelPrice = ModelPrice::new(1_750, 14_000);
const GPT_5_MINI: ModelPrice = ModelPrice::new(250, 2_000);
const GPT_4_1: ModelPrice = ModelPrice::new(2_000, 8_000);
const GPT_4_1_MINI: ModelPrice = ModelPrice::new(400, 1_600);
const GPT_4_1_NANO: ModelPrice = ModelPrice::new(100, 400);
const O4_MINI: ModelPrice = ModelPrice::new(1_100, 4_400);
const O3: ModelPrice = ModelPrice::new(2_000, 8_000);

// Google
const GEMINI_3_1_PRO: ModelPrice = ModelPrice::new(2_000, 12_000);
const GEMINI_3_FLASH: ModelPrice = ModelPrice::new(500, 3_000);
const GEMINI_2_5_PRO: ModelPrice = ModelPrice::new(1_250, 10_000);
const GEMINI_2_5_FLASH: ModelPrice = ModelPrice::new(300, 2_500);
const GEMINI_2_0_FLASH: ModelPrice = ModelPrice::new(100, 400);

static BUILTIN_PRICES: OnceLock<HashMap<&'static str, ModelPrice>> = OnceLock::new();

fn init_prices() -> HashMap<&'static str, ModelPrice> {
    let mut map = HashMap::new();

    map.insert("claude-opus-4-6", CLAUDE_OPUS_4_6);
    map.insert("claude-sonnet-4-6", CLAUDE_SONNET_4_6);
    map.insert("claude-haiku-4-5", CLAUDE_HAIKU_4_5);
    map.insert("claude-haiku-4-5-20251001", CLAUDE_HAIKU_4_5);

    map.insert("gpt-5.2-pro", GPT_5_2_PRO);
    map.insert("gpt-5.2", GPT_5_2);
    map.insert("gpt-5-mini", GPT_5_MINI);
    map.insert("gpt-4.1", GPT_4_1);
    map.insert("gpt-4.1-mini", GPT_4_1_MINI);
    map.insert("gpt-4.1-nano", GPT_4_1_NANO);
    map.insert("o4-mini", O4_MINI);
    map.insert("o3", O3);

    map.insert("gemini-3.1-pro-preview", GEMINI_3_1_PRO);
    map.insert("gemini-3-flash-preview", GEMINI_3_FLASH);
    map.insert("gemini-2.5-pro", GEMINI_2_5_PRO);
    map.insert("gemini-2.5-flash", GEMINI_2_5_FLASH);
    map.insert("gemini-2.0-flash", GEMINI_2_0_FLASH);

    map
}

/// Read-only lookup from model id to price.
///
/// Models without an entry cost nothing; an unknown model never fails a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingTable {
    prices: HashMap<String, ModelPrice>,
}

impl PricingTable {
    /// An empty table: everything is free.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in price list.
    pub fn builtin() -> Self {
        let prices = BUILTIN_PRICES
            .get_or_init(init_prices)
            .iter()
            .map(|(model, price)| (model.to_string(), *price))
            .collect();
        Self { prices }
    }

    /// Add or replace one entry.
    pub fn with_price(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.prices.insert(model.into(), price);
        self
    }

    pub fn get(&self, model: &ModelId) -> Option<&ModelPrice> {
        self.prices.get(model.as_str())
    }

    /// Cost of one usage record; zero when the model is not priced.
    pub fn cost_of(&self, model: &ModelId, usage: TokenUsage) -> Nanodollars {
        self.get(model)
            .map(|price| price.cost(usage))
            .unwrap_or_default()
    }

    /// Entries sorted by model id
    pub fn entries(&self) -> Vec<(&str, &ModelPrice)> {
        let mut entries: Vec<_> = self.prices.iter().map(|(m, p)| (m.as_str(), p)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
