// replication-check/tests/common/mod.rs
//
// In-memory primary/replica pair implementing the connection boundary.

#![allow(dead_code)]

use async_trait::async_trait;
use replication_check::config::{ConnectionConfig, TlsPolicy};
use replication_check::domain::{NamingScheme, ProbeMarker, RawStatusRow, TableName};
use replication_check::ports::{Connector, Session};
use replication_check::{CheckError, CheckResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PRIMARY_HOST: &str = "primary";
pub const REPLICA_HOST: &str = "replica";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub id: i64,
    pub info: String,
}

#[derive(Debug)]
pub struct FakeNode {
    pub version: String,
    pub rows: Mutex<Vec<StoredRow>>,
    pub status: Mutex<Option<RawStatusRow>>,
    pub open_sessions: AtomicUsize,
}

impl FakeNode {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            rows: Mutex::new(Vec::new()),
            status: Mutex::new(None),
            open_sessions: AtomicUsize::new(0),
        }
    }

    pub fn rows(&self) -> Vec<StoredRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.rows.lock().unwrap().iter().any(|r| r.info == token)
    }

    pub fn set_status(&self, row: Option<RawStatusRow>) {
        *self.status.lock().unwrap() = row;
    }

    fn insert(&self, row: StoredRow) -> CheckResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.id == row.id) {
            return Err(CheckError::query(format!(
                "Duplicate entry '{}' for key 'PRIMARY'",
                row.id
            )));
        }
        rows.push(row);
        Ok(())
    }

    fn delete(&self, token: &str) -> u64 {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.info != token);
        (before - rows.len()) as u64
    }
}

/// Two nodes; when `replicating` is set, primary writes are applied to the
/// replica immediately.
pub struct FakeCluster {
    pub primary: Arc<FakeNode>,
    pub replica: Arc<FakeNode>,
    pub replicating: AtomicBool,
}

impl FakeCluster {
    pub fn new(replicating: bool) -> Self {
        Self {
            primary: Arc::new(FakeNode::new("8.0.36")),
            replica: Arc::new(FakeNode::new("8.0.36")),
            replicating: AtomicBool::new(replicating),
        }
    }

    pub fn with_replica_version(version: &str) -> Self {
        Self {
            replica: Arc::new(FakeNode::new(version)),
            ..Self::new(true)
        }
    }

    pub fn open_sessions(&self) -> usize {
        self.primary.open_sessions.load(Ordering::SeqCst)
            + self.replica.open_sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeCluster {
    async fn connect(&self, config: &ConnectionConfig) -> CheckResult<Box<dyn Session>> {
        let (node, downstream) = match config.host.as_deref() {
            Some(PRIMARY_HOST) => {
                let downstream = self
                    .replicating
                    .load(Ordering::SeqCst)
                    .then(|| self.replica.clone());
                (self.primary.clone(), downstream)
            }
            Some(REPLICA_HOST) => (self.replica.clone(), None),
            other => {
                return Err(CheckError::connection(format!(
                    "Unknown MySQL server host '{}'",
                    other.unwrap_or("")
                )))
            }
        };
        node.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            node,
            downstream,
            closed: false,
        }))
    }
}

pub struct FakeSession {
    node: Arc<FakeNode>,
    downstream: Option<Arc<FakeNode>>,
    closed: bool,
}

impl FakeSession {
    fn ensure_open(&self) -> CheckResult<()> {
        if self.closed {
            return Err(CheckError::query("connection already closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn server_version(&mut self) -> CheckResult<String> {
        self.ensure_open()?;
        Ok(self.node.version.clone())
    }

    async fn replica_status(&mut self, _scheme: NamingScheme) -> CheckResult<Option<RawStatusRow>> {
        self.ensure_open()?;
        Ok(self.node.status.lock().unwrap().clone())
    }

    async fn insert_marker(&mut self, _table: &TableName, marker: &ProbeMarker) -> CheckResult<()> {
        self.ensure_open()?;
        let row = StoredRow {
            id: marker.id,
            info: marker.token.clone(),
        };
        self.node.insert(row.clone())?;
        if let Some(replica) = &self.downstream {
            replica.insert(row)?;
        }
        Ok(())
    }

    async fn marker_exists(&mut self, _table: &TableName, marker: &ProbeMarker) -> CheckResult<bool> {
        self.ensure_open()?;
        Ok(self.node.contains(&marker.token))
    }

    async fn delete_marker(&mut self, _table: &TableName, marker: &ProbeMarker) -> CheckResult<u64> {
        self.ensure_open()?;
        let removed = self.node.delete(&marker.token);
        if let Some(replica) = &self.downstream {
            replica.delete(&marker.token);
        }
        Ok(removed)
    }

    async fn close(&mut self) -> CheckResult<()> {
        if !self.closed {
            self.closed = true;
            self.node.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

pub fn config_for(host: &str) -> ConnectionConfig {
    ConnectionConfig {
        host: Some(host.to_string()),
        port: 3306,
        username: "probe".to_string(),
        password: Some("secret".to_string()),
        database: Some("lbtest".to_string()),
        socket_path: None,
        tls: TlsPolicy::Disabled,
    }
}

pub fn status_row(pairs: &[(&str, Option<&str>)]) -> RawStatusRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
        .collect()
}
