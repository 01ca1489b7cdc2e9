//! Cost accounting: static per-model pricing and the derived breakdown.
//!
//! Amounts are integer nanodollars (1e-9 USD) so that the total is
//! exactly the sum of its parts; they serialize as USD.

pub mod breakdown;
pub mod pricing;
