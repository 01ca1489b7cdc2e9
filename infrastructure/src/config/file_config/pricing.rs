//! Price overrides from TOML (`[pricing]` section)
//!
//! ```toml
//! [pricing]
//! "gpt-5.2" = { input = 1.75, output = 14.0 }   # USD per 1M tokens
//! ```

use council_domain::{ModelPrice, PricingTable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilePrice {
    /// USD per million input tokens
    pub input: f64,
    /// USD per million output tokens
    pub output: f64,
}

impl FilePrice {
    pub fn to_model_price(self) -> ModelPrice {
        ModelPrice::from_usd_per_million(self.input, self.output)
    }
}

/// Merge overrides over the built-in table.
pub fn pricing_table<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a FilePrice)>) -> PricingTable {
    overrides
        .into_iter()
        .fold(PricingTable::builtin(), |table, (model, price)| {
            table.with_price(model.clone(), price.to_model_price())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::ModelId;
    use std::collections::BTreeMap;

    #[test]
    fn test_override_and_addition() {
        let mut overrides = BTreeMap::new();
        overrides.insert("gpt-5.2".to_string(), FilePrice { input: 2.0, output: 10.0 });
        overrides.insert("local-llama".to_string(), FilePrice { input: 0.0, output: 0.0 });

        let table = pricing_table(&overrides);
        let id = |s: &str| ModelId::new(s).unwrap();
        assert_eq!(table.get(&id("gpt-5.2")), Some(&ModelPrice::new(2_000, 10_000)));
        assert_eq!(table.get(&id("local-llama")), Some(&ModelPrice::new(0, 0)));
        assert!(table.get(&id("claude-sonnet-4-6")).is_some());
    }
}
