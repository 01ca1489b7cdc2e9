//! Council subdomain: who deliberates, how they are hidden from each
//! other, and how their free-text evaluations become a ranking.
//!
//! | Module | Concern |
//! |--------|---------|
//! | [`roster`] | [`Council`](roster::Council) membership and chairman |
//! | [`label`] | Per-run anonymisation ([`LabelMap`](label::LabelMap)) |
//! | [`ranking`] | `FINAL RANKING:` extraction and aggregate averaging |
//! | [`reflection`] | Section parsing of chairman reflections |

pub mod label;
pub mod ranking;
pub mod reflection;
pub mod roster;
