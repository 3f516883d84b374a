// replication-check/src/adapters/mysql.rs
//
// sqlx implementation of the connection boundary.

use crate::config::{ConnectionConfig, TlsPolicy};
use crate::domain::{NamingScheme, ProbeMarker, RawStatusRow, TableName};
use crate::errors::{CheckError, CheckResult};
use crate::ports::{Connector, Session};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow, MySqlSslMode};
use sqlx::{Column, Connection, Executor, Row};

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlConnector;

impl MySqlConnector {
    pub fn new() -> Self {
        Self
    }

    /// Translate a resolved config into driver options.
    pub fn connect_options(config: &ConnectionConfig) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .port(config.port)
            .username(&config.username);

        if let Some(host) = &config.host {
            options = options.host(host);
        }
        if let Some(socket) = &config.socket_path {
            options = options.socket(socket);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        if let Some(database) = &config.database {
            options = options.database(database);
        }

        match &config.tls {
            TlsPolicy::Disabled => options.ssl_mode(MySqlSslMode::Disabled),
            TlsPolicy::Enabled {
                verify_cert: true,
                ca_path,
            } => options.ssl_mode(MySqlSslMode::VerifyCa).ssl_ca(ca_path),
            // Self-signed allowed: encrypt, skip verification
            TlsPolicy::Enabled {
                verify_cert: false,
                ..
            } => options.ssl_mode(MySqlSslMode::Required),
        }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self, config: &ConnectionConfig) -> CheckResult<Box<dyn Session>> {
        tracing::debug!(
            "Connecting to {} as {} (tls={}, verify_cert={})",
            config.endpoint(),
            config.username,
            config.tls.use_tls(),
            config.tls.verify_cert()
        );
        let options = Self::connect_options(config);
        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(CheckError::connection)?;
        tracing::debug!("Connected to {}", config.endpoint());
        Ok(Box::new(MySqlSession {
            conn: Some(conn),
            endpoint: config.endpoint(),
        }))
    }
}

pub struct MySqlSession {
    conn: Option<MySqlConnection>,
    endpoint: String,
}

impl MySqlSession {
    fn conn(&mut self) -> CheckResult<&mut MySqlConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| CheckError::query("connection already closed"))
    }
}

/// Read every column as nullable text. Status queries run over the text
/// protocol, so numeric columns arrive as their decimal representation.
fn row_to_status(row: &MySqlRow) -> CheckResult<RawStatusRow> {
    row.columns()
        .iter()
        .map(|column| {
            let bytes: Option<Vec<u8>> = row
                .try_get_unchecked(column.ordinal())
                .map_err(CheckError::query)?;
            let text = bytes.map(|b| String::from_utf8_lossy(&b).into_owned());
            Ok((column.name().to_string(), text))
        })
        .collect()
}

#[async_trait]
impl Session for MySqlSession {
    async fn server_version(&mut self) -> CheckResult<String> {
        let conn = self.conn()?;
        let row = conn
            .fetch_one("SELECT VERSION()")
            .await
            .map_err(CheckError::query)?;
        let bytes: Vec<u8> = row.try_get_unchecked(0).map_err(CheckError::query)?;
        let version = String::from_utf8_lossy(&bytes).into_owned();
        tracing::debug!("Server version: {}", version);
        Ok(version)
    }

    async fn replica_status(&mut self, scheme: NamingScheme) -> CheckResult<Option<RawStatusRow>> {
        let conn = self.conn()?;
        let row = conn
            .fetch_optional(scheme.status_query())
            .await
            .map_err(CheckError::query)?;
        row.as_ref().map(row_to_status).transpose()
    }

    async fn insert_marker(&mut self, table: &TableName, marker: &ProbeMarker) -> CheckResult<()> {
        let sql = format!("INSERT INTO {} (id, info) VALUES (?, ?)", table.quoted());
        let conn = self.conn()?;
        let mut tx = conn.begin().await.map_err(CheckError::query)?;
        sqlx::query(&sql)
            .bind(marker.id)
            .bind(marker.token.as_str())
            .execute(&mut *tx)
            .await
            .map_err(CheckError::query)?;
        tx.commit().await.map_err(CheckError::query)?;
        Ok(())
    }

    async fn marker_exists(&mut self, table: &TableName, marker: &ProbeMarker) -> CheckResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE info = ? LIMIT 1", table.quoted());
        let conn = self.conn()?;
        let row = sqlx::query(&sql)
            .bind(marker.token.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(CheckError::query)?;
        Ok(row.is_some())
    }

    async fn delete_marker(&mut self, table: &TableName, marker: &ProbeMarker) -> CheckResult<u64> {
        let sql = format!("DELETE FROM {} WHERE info = ?", table.quoted());
        let conn = self.conn()?;
        let mut tx = conn.begin().await.map_err(CheckError::query)?;
        let result = sqlx::query(&sql)
            .bind(marker.token.as_str())
            .execute(&mut *tx)
            .await
            .map_err(CheckError::query)?;
        tx.commit().await.map_err(CheckError::query)?;
        Ok(result.rows_affected())
    }

    async fn close(&mut self) -> CheckResult<()> {
        if let Some(conn) = self.conn.take() {
            tracing::debug!("Closing connection to {}", self.endpoint);
            conn.close().await.map_err(CheckError::query)?;
        }
        Ok(())
    }
}
