// replication-check/src/domain/status.rs
//
// Maps the server-version dependent columns of SHOW REPLICA STATUS /
// SHOW SLAVE STATUS onto one canonical record.

use crate::errors::DataError;
use std::collections::BTreeMap;
use std::fmt;

/// One status row as returned by the server: column name -> nullable text.
pub type RawStatusRow = BTreeMap<String, Option<String>>;

/// Column naming used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingScheme {
    /// 8.0 / 8.4: `Replica_*`, `Source_*`
    SourceReplica,
    /// Older servers and MariaDB: `Slave_*`, `Master_*`
    MasterSlave,
}

impl NamingScheme {
    pub fn from_version(version: &str) -> Self {
        if version.contains("8.0") || version.contains("8.4") {
            Self::SourceReplica
        } else {
            Self::MasterSlave
        }
    }

    pub fn status_query(self) -> &'static str {
        match self {
            Self::SourceReplica => "SHOW REPLICA STATUS",
            Self::MasterSlave => "SHOW SLAVE STATUS",
        }
    }

    fn alternate(self) -> Self {
        match self {
            Self::SourceReplica => Self::MasterSlave,
            Self::MasterSlave => Self::SourceReplica,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    IoRunning,
    SqlRunning,
    SourceHost,
    SslAllowed,
    Lag,
}

/// Column names per field, indexed by `StatusField as usize`:
/// (Source/Replica column, Master/Slave column)
const FIELD_COLUMNS: [(&str, &str); 5] = [
    ("Replica_IO_Running", "Slave_IO_Running"),
    ("Replica_SQL_Running", "Slave_SQL_Running"),
    ("Source_Host", "Master_Host"),
    ("Source_SSL_Allowed", "Master_SSL_Allowed"),
    ("Seconds_Behind_Source", "Seconds_Behind_Master"),
];

impl StatusField {
    pub fn column(self, scheme: NamingScheme) -> &'static str {
        let (source_replica, master_slave) = FIELD_COLUMNS[self as usize];
        match scheme {
            NamingScheme::SourceReplica => source_replica,
            NamingScheme::MasterSlave => master_slave,
        }
    }
}

/// Running state of a replication thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    Yes,
    No,
    /// Missing column, NULL, or a transitional value such as `Connecting`.
    Unknown,
}

impl ThreadState {
    fn from_raw(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("yes") => Self::Yes,
            Some(v) if v.eq_ignore_ascii_case("no") => Self::No,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Canonical replica status, independent of the server's naming scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationStatus {
    pub io_thread_running: ThreadState,
    pub sql_thread_running: ThreadState,
    pub source_host: Option<String>,
    pub ssl_allowed: Option<String>,
    /// `None` when the server reports NULL (a replication thread is stopped).
    pub lag_seconds: Option<i64>,
}

/// Normalize a raw status row for a server reporting `version`.
///
/// Each field is looked up under the version's scheme first, then under the
/// other scheme. An absent or empty row is [`DataError::NoStatusRow`]; a row
/// without any lag column is [`DataError::LagFieldMissing`].
pub fn normalize(
    row: Option<&RawStatusRow>,
    version: &str,
) -> Result<ReplicationStatus, DataError> {
    let row = row
        .filter(|r| !r.is_empty())
        .ok_or(DataError::NoStatusRow)?;
    let scheme = NamingScheme::from_version(version);

    // Outer None: column absent. Inner None: column is NULL.
    let lookup = |field: StatusField| {
        [scheme, scheme.alternate()]
            .into_iter()
            .find_map(|s| row.get(field.column(s)))
            .map(|v| v.as_deref())
    };
    let text = |field: StatusField| lookup(field).flatten().map(str::to_string);

    let lag_seconds = match lookup(StatusField::Lag) {
        None => return Err(DataError::LagFieldMissing),
        Some(None) => None,
        Some(Some(raw)) => Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|_| DataError::InvalidLag(raw.to_string()))?,
        ),
    };

    Ok(ReplicationStatus {
        io_thread_running: ThreadState::from_raw(lookup(StatusField::IoRunning).flatten()),
        sql_thread_running: ThreadState::from_raw(lookup(StatusField::SqlRunning).flatten()),
        source_host: text(StatusField::SourceHost),
        ssl_allowed: text(StatusField::SslAllowed),
        lag_seconds,
    })
}
