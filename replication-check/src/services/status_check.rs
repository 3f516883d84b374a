use crate::config::ConnectionConfig;
use crate::domain::{
    classify_lag, normalize, LagThresholds, NamingScheme, ReplicationStatus, Severity,
};
use crate::errors::{CheckError, CheckResult};
use crate::ports::{Connector, Session};
use std::sync::Arc;

/// Result of one status check, ready for the reporting layer.
#[derive(Debug)]
pub enum CheckOutcome {
    Classified {
        status: ReplicationStatus,
        severity: Severity,
    },
    Failed(CheckError),
}

impl CheckOutcome {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Classified { severity, .. } => *severity,
            Self::Failed(_) => Severity::Error,
        }
    }
}

/// Severity for a normalized status. A NULL lag means replication is not
/// applying events at all and is treated as CRITICAL.
pub fn evaluate(status: &ReplicationStatus, thresholds: &LagThresholds) -> Severity {
    match status.lag_seconds {
        Some(lag) => classify_lag(lag, thresholds),
        None => Severity::Critical,
    }
}

pub struct StatusCheckService<C: ?Sized> {
    connector: Arc<C>,
    thresholds: LagThresholds,
}

impl<C> StatusCheckService<C>
where
    C: Connector + ?Sized,
{
    pub fn new(connector: Arc<C>, thresholds: LagThresholds) -> Self {
        if thresholds.is_inverted() {
            tracing::warn!(
                "critical delay ({}s) is below warning delay ({}s); WARNING can never be reported",
                thresholds.critical,
                thresholds.warning
            );
        }
        Self {
            connector,
            thresholds,
        }
    }

    /// Connect, read the replica status, classify, disconnect.
    pub async fn run(&self, config: &ConnectionConfig) -> CheckOutcome {
        let mut session = match self.connector.connect(config).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Status check aborted: {}", e);
                return CheckOutcome::Failed(e);
            }
        };

        let result = Self::read_status(session.as_mut()).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close connection to {}: {}", config.endpoint(), e);
        }

        match result {
            Ok(status) => {
                let severity = evaluate(&status, &self.thresholds);
                tracing::debug!("Replica status {:?} classified as {}", status, severity);
                CheckOutcome::Classified { status, severity }
            }
            Err(e) => {
                tracing::error!("Status check failed: {}", e);
                CheckOutcome::Failed(e)
            }
        }
    }

    async fn read_status(session: &mut dyn Session) -> CheckResult<ReplicationStatus> {
        let version = session.server_version().await?;
        let scheme = NamingScheme::from_version(&version);
        let row = session.replica_status(scheme).await?;
        Ok(normalize(row.as_ref(), &version)?)
    }
}
