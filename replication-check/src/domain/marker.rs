use crate::errors::{CheckError, CheckResult};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// A row written to the primary and searched for on the replica.
///
/// The token is a fresh UUID v4, so concurrent probes never match each
/// other's rows. The numeric id fills the table's primary key and is derived
/// from the same UUID; lookups and deletes go by token only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeMarker {
    pub id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl ProbeMarker {
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::new_v4(), Utc::now())
    }

    pub fn from_uuid(uuid: Uuid, created_at: DateTime<Utc>) -> Self {
        // 31 bits keeps the id inside a signed INT column
        let id = (uuid.as_u128() & 0x7fff_ffff) as i64;
        Self {
            id,
            token: uuid.simple().to_string(),
            created_at,
        }
    }
}

/// A validated `table` or `schema.table` identifier, safe to interpolate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> CheckResult<Self> {
        let valid_part = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        };
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() > 2 || !parts.iter().all(|p| valid_part(p)) {
            return Err(CheckError::config(format!("invalid table name: {:?}", raw)));
        }
        Ok(Self(raw.to_string()))
    }

    /// Backtick-quoted form for SQL text.
    pub fn quoted(&self) -> String {
        self.0
            .split('.')
            .map(|p| format!("`{}`", p))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
