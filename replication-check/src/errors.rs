use thiserror::Error;

/// Failure classes for a single check invocation. None of them are retried.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Cannot connect to the MySQL server: {0}")]
    Connection(String),

    #[error("Query Error: {0}")]
    Query(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// The server answered, but not with what a status check needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("no replication status available")]
    NoStatusRow,

    #[error("lag field missing: couldn't find 'Seconds_Behind_Master' or 'Seconds_Behind_Source' in the replica status response")]
    LagFieldMissing,

    #[error("invalid lag value: {0:?}")]
    InvalidLag(String),
}

impl CheckError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a driver error raised while opening a connection.
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }

    /// Wrap a driver error raised by a statement on an open connection.
    pub fn query(err: impl std::fmt::Display) -> Self {
        Self::Query(err.to_string())
    }
}

pub type CheckResult<T> = std::result::Result<T, CheckError>;
