// replication-check/src/services/probe.rs
//
// Round-trip replication probe: write a marker row on the primary, read it
// back from the replica, clean up on success.
//
// The default wait is a fixed delay, not an acknowledgement from the replica.
// A replica lagging longer than the delay reports FAIL even though the row
// would arrive later. Poll mode narrows that window but is opt-in.

use crate::config::ConnectionConfig;
use crate::domain::{ProbeMarker, Severity, TableName};
use crate::errors::{CheckError, CheckResult};
use crate::ports::{Connector, Session};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub table: TableName,
    /// Fixed wait between the write and the first replica read
    pub delay: Duration,
    /// Re-read the replica until found or timed out. `None` reads once.
    pub poll: Option<PollSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Marker found on the replica
    Replicated,
    /// Marker not found; it stays on the primary for inspection
    NotReplicated,
}

#[derive(Debug)]
pub struct ProbeReport {
    pub marker: ProbeMarker,
    pub outcome: CheckResult<ProbeOutcome>,
    /// Failures while deleting the marker after a successful read, for callers
    /// to surface. They never change `outcome` or the report line.
    pub cleanup_errors: Vec<CheckError>,
}

impl ProbeReport {
    pub fn severity(&self) -> Severity {
        match self.outcome {
            Ok(ProbeOutcome::Replicated) => Severity::Ok,
            Ok(ProbeOutcome::NotReplicated) => Severity::Critical,
            Err(_) => Severity::Error,
        }
    }
}

/// Connections opened during a probe, released together on every exit path.
#[derive(Default)]
struct ProbeSessions {
    primary: Option<Box<dyn Session>>,
    replica: Option<Box<dyn Session>>,
}

impl ProbeSessions {
    async fn release(self) {
        for (role, session) in [("primary", self.primary), ("replica", self.replica)] {
            if let Some(mut session) = session {
                if let Err(e) = session.close().await {
                    tracing::warn!("Failed to close {} connection: {}", role, e);
                }
            }
        }
    }
}

pub struct ReplicationProbe<C: ?Sized> {
    connector: Arc<C>,
    settings: ProbeSettings,
}

impl<C> ReplicationProbe<C>
where
    C: Connector + ?Sized,
{
    pub fn new(connector: Arc<C>, settings: ProbeSettings) -> Self {
        Self {
            connector,
            settings,
        }
    }

    pub async fn run_probe(
        &self,
        primary: &ConnectionConfig,
        replica: &ConnectionConfig,
    ) -> ProbeReport {
        self.run_probe_with(ProbeMarker::generate(), primary, replica)
            .await
    }

    /// Same as [`run_probe`](Self::run_probe) with a caller supplied marker.
    pub async fn run_probe_with(
        &self,
        marker: ProbeMarker,
        primary: &ConnectionConfig,
        replica: &ConnectionConfig,
    ) -> ProbeReport {
        let mut sessions = ProbeSessions::default();
        let mut cleanup_errors = Vec::new();

        let outcome = self
            .probe(&marker, primary, replica, &mut sessions, &mut cleanup_errors)
            .await;
        sessions.release().await;

        match &outcome {
            Ok(ProbeOutcome::Replicated) => {
                tracing::info!("Marker {} replicated to {}", marker.token, replica.endpoint())
            }
            Ok(ProbeOutcome::NotReplicated) => tracing::warn!(
                "Marker {} (id {}) not found on {}; left on {} for inspection",
                marker.token,
                marker.id,
                replica.endpoint(),
                primary.endpoint()
            ),
            Err(e) => tracing::error!("Replication probe aborted: {}", e),
        }

        ProbeReport {
            marker,
            outcome,
            cleanup_errors,
        }
    }

    async fn probe(
        &self,
        marker: &ProbeMarker,
        primary: &ConnectionConfig,
        replica: &ConnectionConfig,
        sessions: &mut ProbeSessions,
        cleanup_errors: &mut Vec<CheckError>,
    ) -> CheckResult<ProbeOutcome> {
        let table = &self.settings.table;

        let primary_session = sessions
            .primary
            .insert(self.connector.connect(primary).await?);
        primary_session.insert_marker(table, marker).await?;
        tracing::debug!(
            "Inserted marker {} (id {}) into {} on {} at {}",
            marker.token,
            marker.id,
            table,
            primary.endpoint(),
            marker.created_at
        );

        if !self.settings.delay.is_zero() {
            tracing::debug!("Waiting {:?} before reading the replica", self.settings.delay);
            sleep(self.settings.delay).await;
        }

        let replica_session = sessions
            .replica
            .insert(self.connector.connect(replica).await?);
        if !self.wait_for_marker(replica_session.as_mut(), marker).await? {
            return Ok(ProbeOutcome::NotReplicated);
        }

        for (role, session) in [
            ("primary", primary_session.as_mut()),
            ("replica", replica_session.as_mut()),
        ] {
            match session.delete_marker(table, marker).await {
                Ok(rows) => tracing::debug!("Removed {} marker row(s) on {}", rows, role),
                Err(e) => {
                    tracing::warn!("Failed to remove marker on {}: {}", role, e);
                    cleanup_errors.push(e);
                }
            }
        }

        Ok(ProbeOutcome::Replicated)
    }

    async fn wait_for_marker(
        &self,
        session: &mut dyn Session,
        marker: &ProbeMarker,
    ) -> CheckResult<bool> {
        let table = &self.settings.table;
        let Some(poll) = self.settings.poll else {
            return session.marker_exists(table, marker).await;
        };

        // A timeout past the clock's range means no deadline
        let deadline = Instant::now().checked_add(poll.timeout);
        loop {
            if session.marker_exists(table, marker).await? {
                return Ok(true);
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    poll.interval.min(deadline - now)
                }
                None => poll.interval,
            };
            sleep(pause).await;
        }
    }
}
