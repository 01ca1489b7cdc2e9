//! Application-level configuration.
//!
//! - [`ExecutionParams`]: tool rounds, timeouts and channel sizing
//! - [`CouncilConfig`]: council, pricing and defaults for building run inputs

pub mod council_config;
pub mod execution_params;

pub use council_config::CouncilConfig;
pub use execution_params::ExecutionParams;
