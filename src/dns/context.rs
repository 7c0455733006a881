//! `HuntConfig` holds the settings shared by every lookup of a process
//!
//! Settings come from an optional TOML file; the CLI layers its flags and
//! environment variables on top.
//!
//! ```toml
//! [resolver]
//! endpoint = "https://cloudflare-dns.com/dns-query"
//! timeout_secs = 10
//!
//! [signatures]
//! path = "/etc/hosthunt/providers.toml"
//!
//! [logging]
//! level = "debug"
//! json_format = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_more::{Display, Error, From};
use serde_derive::Deserialize;

use crate::detect::signatures::{SignatureTable, TableError};
use crate::dns::doh::{DohClient, DohError, DEFAULT_DOH_ENDPOINT};
use crate::dns::logging::{LogLevel, LoggerConfig};

#[derive(Debug, Display, From, Error)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Resolver endpoint settings
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// DoH JSON endpoint
    pub endpoint: String,
    /// Per-request timeout; the HTTP transport default applies when unset
    pub timeout_secs: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_DOH_ENDPOINT.to_string(),
            timeout_secs: None,
        }
    }
}

/// Where the provider signature table comes from
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SignatureSource {
    /// TOML table replacing the built-in one
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: LogLevel,
    pub json_format: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            json_format: false,
        }
    }
}

/// Process-wide configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HuntConfig {
    pub resolver: ResolverConfig,
    pub signatures: SignatureSource,
    pub logging: LoggingSection,
}

impl HuntConfig {
    pub fn from_toml_str(data: &str) -> Result<HuntConfig> {
        Ok(toml::from_str(data)?)
    }

    pub fn load(path: &Path) -> Result<HuntConfig> {
        let data = fs::read_to_string(path)?;
        Self::from_toml_str(&data)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.resolver.timeout_secs.map(Duration::from_secs)
    }

    /// Build the DoH client described by the resolver section
    pub fn doh_client(&self) -> std::result::Result<DohClient, DohError> {
        DohClient::new(self.resolver.endpoint.clone(), self.timeout())
    }

    /// Load the signature table once; the built-in table unless a path is set
    pub fn signature_table(&self) -> std::result::Result<SignatureTable, TableError> {
        match &self.signatures.path {
            Some(path) => SignatureTable::load(path),
            None => Ok(SignatureTable::builtin()),
        }
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.logging.level,
            json_format: self.logging.json_format,
            console_output: true,
        }
    }
}
