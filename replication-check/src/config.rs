use crate::errors::{CheckError, CheckResult};
use ini::{Ini, ParseOption};
use std::path::{Path, PathBuf};

/// Port used when neither the command line nor the options file names one.
pub const DEFAULT_PORT: u16 = 3306;

/// CA bundle used for certificate verification unless `--ssl_ca` overrides it.
pub const DEFAULT_CA_BUNDLE: &str = "/etc/ssl/certs/ca-certificates.crt";

const CLIENT_SECTION: &str = "client";

/// TLS settings for one connection.
///
/// Certificate material only exists on the `Enabled` variant, so a disabled
/// policy can never reference a CA bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsPolicy {
    Disabled,
    Enabled { verify_cert: bool, ca_path: PathBuf },
}

impl TlsPolicy {
    pub fn from_options(options: &TlsOptions) -> Self {
        if !options.use_tls {
            return Self::Disabled;
        }
        Self::Enabled {
            verify_cert: !options.allow_self_signed,
            ca_path: options
                .ca_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CA_BUNDLE)),
        }
    }

    pub fn use_tls(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    pub fn verify_cert(&self) -> bool {
        matches!(
            self,
            Self::Enabled {
                verify_cert: true,
                ..
            }
        )
    }

    pub fn ca_path(&self) -> Option<&Path> {
        match self {
            Self::Enabled { ca_path, .. } => Some(ca_path.as_path()),
            Self::Disabled => None,
        }
    }
}

/// Fully resolved connection descriptor. Built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub database: Option<String>,
    pub socket_path: Option<PathBuf>,
    pub tls: TlsPolicy,
}

impl ConnectionConfig {
    /// Human readable endpoint for log lines. Never includes credentials.
    pub fn endpoint(&self) -> String {
        match (&self.socket_path, &self.host) {
            (Some(socket), _) => format!("unix:{}", socket.display()),
            (None, Some(host)) => format!("{}:{}", host, self.port),
            (None, None) => format!("<unknown>:{}", self.port),
        }
    }
}

/// Values given explicitly on the command line or through the environment.
///
/// Empty strings count as "not given" and never clobber an options file value.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub socket: Option<PathBuf>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsOptions {
    pub use_tls: bool,
    pub allow_self_signed: bool,
    pub ca_path: Option<PathBuf>,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            use_tls: true,
            allow_self_signed: false,
            ca_path: None,
        }
    }
}

/// The `[client]` section of a MySQL options file (`~/.my.cnf` style).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub socket: Option<String>,
    pub database: Option<String>,
}

impl ClientOptions {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CheckResult<Self> {
        let path = path.as_ref();
        let conf = Ini::load_from_file_opt(path, parse_option()).map_err(|e| {
            CheckError::config(format!(
                "failed to read options file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_ini(&conf).ok_or_else(|| {
            CheckError::config(format!(
                "options file {} has no [{}] section",
                path.display(),
                CLIENT_SECTION
            ))
        })
    }

    pub fn parse(content: &str) -> CheckResult<Self> {
        let conf = Ini::load_from_str_opt(content, parse_option())
            .map_err(|e| CheckError::config(format!("failed to parse options: {}", e)))?;
        Self::from_ini(&conf).ok_or_else(|| {
            CheckError::config(format!("options have no [{}] section", CLIENT_SECTION))
        })
    }

    fn from_ini(conf: &Ini) -> Option<Self> {
        let section = conf.section(Some(CLIENT_SECTION))?;
        let get = |key: &str| section.get(key).map(|v| unquote(v.trim()).to_string());
        Some(Self {
            user: get("user"),
            password: get("password"),
            host: get("host"),
            port: get("port"),
            socket: get("socket"),
            database: get("database"),
        })
    }
}

/// Values are kept as written; backslashes reach the driver untouched.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

/// Merge the options file, explicit overrides, and TLS flags into one config.
///
/// Explicit non-empty overrides win over file values. A missing password stays
/// `None`; no default credential is ever filled in.
pub fn resolve(
    options_file: Option<&Path>,
    overrides: &ConnectionOverrides,
    tls: &TlsOptions,
) -> CheckResult<ConnectionConfig> {
    let file = match options_file {
        Some(path) => ClientOptions::load_from_file(path)?,
        None => ClientOptions::default(),
    };
    resolve_with(&file, overrides, tls)
}

/// Same as [`resolve`] with an already parsed `[client]` section.
pub fn resolve_with(
    file: &ClientOptions,
    overrides: &ConnectionOverrides,
    tls: &TlsOptions,
) -> CheckResult<ConnectionConfig> {
    let host = pick(&overrides.host, &file.host);
    let password = pick(&overrides.password, &file.password);
    let database = pick(&overrides.database, &file.database);
    let socket_path = overrides
        .socket
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| non_empty(&file.socket).map(PathBuf::from));

    let port = match (overrides.port, non_empty(&file.port)) {
        (Some(port), _) => port,
        (None, Some(raw)) => raw.parse::<u16>().map_err(|_| {
            CheckError::config(format!("invalid port in options file: {:?}", raw))
        })?,
        (None, None) => DEFAULT_PORT,
    };

    if host.is_none() && socket_path.is_none() {
        return Err(CheckError::config(
            "no host resolved: pass --host or --socket, or set them in the options file",
        ));
    }

    let username = pick(&overrides.username, &file.user).ok_or_else(|| {
        CheckError::config("no username resolved: pass --username or set user in the options file")
    })?;

    Ok(ConnectionConfig {
        host,
        port,
        username,
        password,
        database,
        socket_path,
        tls: TlsPolicy::from_options(tls),
    })
}

fn pick(explicit: &Option<String>, file: &Option<String>) -> Option<String> {
    non_empty(explicit).or_else(|| non_empty(file))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
