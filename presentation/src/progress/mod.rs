//! Live progress while a run streams its events

pub mod events;
pub mod reporter;
