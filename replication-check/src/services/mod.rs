pub mod probe;
pub mod status_check;

pub use probe::{PollSettings, ProbeOutcome, ProbeReport, ProbeSettings, ReplicationProbe};
pub use status_check::{evaluate, CheckOutcome, StatusCheckService};
