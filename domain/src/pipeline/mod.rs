//! Pipeline subdomain: stages, the run state machine, per-stage results
//! and the typed event stream.

pub mod entries;
pub mod event;
pub mod run;
pub mod stage;
pub mod state;
