//! Class management core for a tutoring center: transfer eligibility between classes,
//! attendance reconciliation, and the class catalog import used to seed the service.

pub mod attendance;
pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod transfers;
