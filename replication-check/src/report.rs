// replication-check/src/report.rs
//
// Turns check results into the single stdout line and the process exit code.
// Exit codes: 0 = OK, 1 = WARNING, 2 = CRITICAL or ERROR.

use crate::domain::Severity;
use crate::errors::CheckError;
use crate::services::{CheckOutcome, ProbeOutcome, ProbeReport};

/// What a binary prints and how it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub line: String,
    pub severity: Severity,
}

impl Report {
    pub fn exit_code(&self) -> u8 {
        self.severity.exit_code()
    }

    /// A check that never reached the server (bad configuration, ...).
    pub fn from_error(err: &CheckError) -> Self {
        Self {
            line: error_line(err),
            severity: Severity::Error,
        }
    }
}

fn error_line(err: &CheckError) -> String {
    match err {
        CheckError::Query(detail) => format!("ERROR: Something went wrong: {}", detail),
        other => format!("ERROR: {}", other),
    }
}

impl From<&CheckOutcome> for Report {
    fn from(outcome: &CheckOutcome) -> Self {
        match outcome {
            CheckOutcome::Classified { status, severity } => {
                let (delay, message) = match status.lag_seconds {
                    Some(lag) => (lag.to_string(), severity.lag_message()),
                    None => (
                        "NULL".to_string(),
                        "Replica replication delay is unknown (replication threads not running)",
                    ),
                };
                let line = format!(
                    "IO: {}, SQL: {}, Server: {}, SSL: {}, Delay: {}, {}: {}",
                    status.io_thread_running,
                    status.sql_thread_running,
                    status.source_host.as_deref().unwrap_or("Unknown"),
                    status.ssl_allowed.as_deref().unwrap_or("No"),
                    delay,
                    severity,
                    message
                );
                Self {
                    line,
                    severity: *severity,
                }
            }
            CheckOutcome::Failed(err) => Self::from_error(err),
        }
    }
}

impl From<&ProbeReport> for Report {
    fn from(report: &ProbeReport) -> Self {
        let line = match &report.outcome {
            Ok(ProbeOutcome::Replicated) => "Replication status: OK".to_string(),
            Ok(ProbeOutcome::NotReplicated) => "Replication status: FAIL".to_string(),
            Err(err) => format!("An error occurred: {}", err),
        };
        Self {
            line,
            severity: report.severity(),
        }
    }
}
