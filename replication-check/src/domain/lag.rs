// replication-check/src/domain/lag.rs
//
// Lag threshold classification and the monitoring severity scale.

use std::fmt;

pub const DEFAULT_WARNING_DELAY: i64 = 10;
pub const DEFAULT_CRITICAL_DELAY: i64 = 30;

/// Monitoring-plugin style severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    /// The check could not complete (no connection, no status row, ...).
    Error,
}

impl Severity {
    /// 0 = OK, 1 = WARNING, 2 = CRITICAL or ERROR
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical | Self::Error => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
        }
    }

    /// Text describing a lag classification result.
    pub fn lag_message(self) -> &'static str {
        match self {
            Self::Ok => "Replica replication delay is within acceptable thresholds",
            Self::Warning => "Replica replication delay is over the warning delay",
            Self::Critical => "Replica replication delay is over the critical delay",
            Self::Error => "Replica replication delay could not be determined",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LagThresholds {
    pub warning: i64,
    pub critical: i64,
}

impl LagThresholds {
    pub fn new(warning: i64, critical: i64) -> Self {
        Self { warning, critical }
    }

    /// `critical >= warning` is expected but not enforced.
    pub fn is_inverted(&self) -> bool {
        self.critical < self.warning
    }
}

impl Default for LagThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_DELAY, DEFAULT_CRITICAL_DELAY)
    }
}

/// Strictly-greater-than comparison, critical first. Negative lag (clock skew)
/// is a valid input.
pub fn classify_lag(lag_seconds: i64, thresholds: &LagThresholds) -> Severity {
    if lag_seconds > thresholds.critical {
        Severity::Critical
    } else if lag_seconds > thresholds.warning {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
