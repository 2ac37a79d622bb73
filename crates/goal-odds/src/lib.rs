//! Goal metric capture and prediction API client.
//!
//! The [`metrics`] module turns user input into the delimited context string the
//! prediction service consumes, [`prediction`] talks to that service, and
//! [`session`] ties both together behind a single screen-level controller.

pub mod config;
pub mod error;
pub mod metrics;
pub mod prediction;
pub mod session;
pub mod telemetry;
