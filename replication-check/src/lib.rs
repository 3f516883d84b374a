// Library interface for the replication check tools
// Exposes modules for the binaries and integration testing

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod report;
pub mod services;

pub use errors::{CheckError, CheckResult, DataError};
pub use report::Report;
