// replication-check/src/cli.rs
//
// Command line surfaces of both tools. Long flag names keep the underscored
// spelling existing monitoring configurations already use.

use crate::config::{self, ConnectionConfig, ConnectionOverrides, TlsOptions};
use crate::domain::lag::{DEFAULT_CRITICAL_DELAY, DEFAULT_WARNING_DELAY};
use crate::domain::{LagThresholds, TableName};
use crate::errors::CheckResult;
use crate::services::{PollSettings, ProbeSettings};
use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Accepts the usual spellings of a boolean (`yes/true/t/y/1`, `no/false/f/n/0`).
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(format!("boolean value expected, got {:?}", value)),
    }
}

#[derive(Debug, Clone, Args)]
pub struct TlsArgs {
    /// Use SSL connection (bare flag means true)
    #[arg(
        long = "use_ssl",
        value_name = "BOOL",
        num_args = 0..=1,
        default_value = "true",
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = parse_bool
    )]
    pub use_ssl: bool,

    /// Accept self signed certificates
    #[arg(long = "allow_self_signed")]
    pub allow_self_signed: bool,

    /// CA bundle used to verify the server certificate
    #[arg(long = "ssl_ca", value_name = "PATH")]
    pub ssl_ca: Option<PathBuf>,
}

impl TlsArgs {
    pub fn tls_options(&self) -> TlsOptions {
        TlsOptions {
            use_tls: self.use_ssl,
            allow_self_signed: self.allow_self_signed,
            ca_path: self.ssl_ca.clone(),
        }
    }
}

/// Check MySQL replica status.
#[derive(Debug, Clone, Parser)]
#[command(name = "check-mysql-replication", version = env!("BUILD_INFO"))]
pub struct CheckArgs {
    /// Path to mysql client options file containing connection credentials
    #[arg(long = "options_file", value_name = "PATH")]
    pub options_file: Option<PathBuf>,

    /// Hostname/IP
    #[arg(long, env = "MYSQL_HOST")]
    pub host: Option<String>,

    /// MySQL port
    #[arg(long, env = "MYSQL_TCP_PORT")]
    pub port: Option<u16>,

    /// Path to local mysqld socket
    #[arg(long, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// MySQL username
    #[arg(long)]
    pub username: Option<String>,

    /// MySQL password
    #[arg(long, env = "MYSQL_PWD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(flatten)]
    pub tls: TlsArgs,

    /// Warning delay of replica replication behind source (in seconds)
    #[arg(long = "warning_delay", default_value_t = DEFAULT_WARNING_DELAY, allow_negative_numbers = true)]
    pub warning_delay: i64,

    /// Critical delay of replica replication behind source (in seconds)
    #[arg(long = "critical_delay", default_value_t = DEFAULT_CRITICAL_DELAY, allow_negative_numbers = true)]
    pub critical_delay: i64,

    /// Log every step to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            username: self.username.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: self.port,
            socket: self.socket.clone(),
            database: None,
        }
    }

    pub fn thresholds(&self) -> LagThresholds {
        LagThresholds::new(self.warning_delay, self.critical_delay)
    }

    pub fn connection_config(&self) -> CheckResult<ConnectionConfig> {
        config::resolve(
            self.options_file.as_deref(),
            &self.overrides(),
            &self.tls.tls_options(),
        )
    }
}

/// Test MySQL replication.
#[derive(Debug, Clone, Parser)]
#[command(name = "test-replication", version = env!("BUILD_INFO"))]
pub struct ProbeArgs {
    /// Master MySQL server host
    #[arg(long = "master_host", visible_alias = "primary_host")]
    pub master_host: String,

    /// Slave MySQL server host
    #[arg(long = "slave_host", visible_alias = "replica_host")]
    pub slave_host: String,

    /// MySQL port, used for both servers
    #[arg(long, env = "MYSQL_TCP_PORT")]
    pub port: Option<u16>,

    /// MySQL username
    #[arg(long)]
    pub username: Option<String>,

    /// MySQL password
    #[arg(long, env = "MYSQL_PWD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name
    #[arg(long, default_value = "lbtest")]
    pub database: String,

    /// Table name
    #[arg(long, default_value = "test")]
    pub table: String,

    #[command(flatten)]
    pub tls: TlsArgs,

    /// Delay in seconds between writing to the master and reading from the slave
    #[arg(long, default_value_t = 0)]
    pub delay: u64,

    /// Keep re-reading the slave for up to this many seconds (0 reads once)
    #[arg(long = "poll_timeout", default_value_t = 0)]
    pub poll_timeout: u64,

    /// Seconds between reads in poll mode
    #[arg(long = "poll_interval", default_value_t = 1)]
    pub poll_interval: u64,

    /// Log every step to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl ProbeArgs {
    fn overrides_for(&self, host: &str) -> ConnectionOverrides {
        ConnectionOverrides {
            username: self.username.clone(),
            password: self.password.clone(),
            host: Some(host.to_string()),
            port: self.port,
            socket: None,
            database: Some(self.database.clone()),
        }
    }

    fn resolve_for(&self, host: &str) -> CheckResult<ConnectionConfig> {
        config::resolve_with(
            &config::ClientOptions::default(),
            &self.overrides_for(host),
            &self.tls.tls_options(),
        )
    }

    pub fn primary_config(&self) -> CheckResult<ConnectionConfig> {
        self.resolve_for(&self.master_host)
    }

    pub fn replica_config(&self) -> CheckResult<ConnectionConfig> {
        self.resolve_for(&self.slave_host)
    }

    pub fn probe_settings(&self) -> CheckResult<ProbeSettings> {
        let poll = (self.poll_timeout > 0).then(|| PollSettings {
            timeout: Duration::from_secs(self.poll_timeout),
            interval: Duration::from_secs(self.poll_interval.max(1)),
        });
        Ok(ProbeSettings {
            table: TableName::parse(&self.table)?,
            delay: Duration::from_secs(self.delay),
            poll,
        })
    }
}
