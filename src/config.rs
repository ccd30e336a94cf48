use crate::authz::ExpectedSecret;
use crate::error::Error;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub type SharedConfig = Arc<Config>;

pub const AUTHZ_HEADER_ENV: &str = "AUTHZ_HEADER";
pub const BIND_ADDR_ENV: &str = "AUTHZ_BIND_ADDR";
pub const LOG_FORMAT_ENV: &str = "AUTHZ_LOG_FORMAT";
pub const LOG_LEVEL_ENV: &str = "AUTHZ_LOG_LEVEL";

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_LOG_LEVEL: &str = "edge_authz=info,tower_http=info";

/// Output format for log entries written to stderr.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(Error::InvalidLogFormat(s.to_string())),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub log_level: String,
    /// Never read from a config file, only from [`AUTHZ_HEADER_ENV`].
    #[serde(skip)]
    pub authz_header: ExpectedSecret,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            log_format: LogFormat::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            authz_header: ExpectedSecret::unconfigured(),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// A JSON config file overridden by the process environment.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.with_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, typically [`std::env::var`]. Unset and empty values
    /// leave the current setting untouched, except for the expected `Authorization` header
    /// which is always replaced.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            self.bind_addr =
                SocketAddr::from_str(&addr).map_err(|err| Error::InvalidBindAddr(addr, err))?;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            self.log_format = format.parse()?;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        self.authz_header = lookup(AUTHZ_HEADER_ENV)
            .map_or_else(ExpectedSecret::unconfigured, ExpectedSecret::new);
        Ok(self)
    }

    #[must_use]
    pub fn with_authz_header(mut self, secret: impl AsRef<[u8]>) -> Self {
        self.authz_header = ExpectedSecret::new(secret);
        self
    }

    #[must_use]
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }
}
