use crate::config::ConnectionConfig;
use crate::domain::{NamingScheme, ProbeMarker, RawStatusRow, TableName};
use crate::errors::CheckResult;
use async_trait::async_trait;

/// Opens connections to a server described by a [`ConnectionConfig`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> CheckResult<Box<dyn Session>>;
}

/// One open connection. Every write commits before returning.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send {
    /// Result of `SELECT VERSION()`
    async fn server_version(&mut self) -> CheckResult<String>;

    /// First row of the scheme's status query, or `None` when the server is
    /// not a replica.
    async fn replica_status(&mut self, scheme: NamingScheme) -> CheckResult<Option<RawStatusRow>>;

    async fn insert_marker(&mut self, table: &TableName, marker: &ProbeMarker) -> CheckResult<()>;

    async fn marker_exists(&mut self, table: &TableName, marker: &ProbeMarker) -> CheckResult<bool>;

    /// Returns the number of rows removed.
    async fn delete_marker(&mut self, table: &TableName, marker: &ProbeMarker) -> CheckResult<u64>;

    /// Graceful shutdown. Safe to call more than once.
    async fn close(&mut self) -> CheckResult<()>;
}
