//! Unified error handling for configuration loading.
//!
//! Every variant is terminal: a config either loads completely or not at
//! all. Component errors are wrapped so the message names the field that
//! failed alongside the underlying cause.

use thiserror::Error;

use crate::config::logging::LoggingError;
use crate::config::oper::{OperClassError, OperError};
use crate::config::security::{ExemptionError, ThrottleError};
use crate::config::tls::TlsError;
use crate::config::units::UnitError;
use crate::security::cloaking::CloakError;
use crate::security::password::PasswordError;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("network name missing")]
    MissingNetworkName,
    #[error("server name missing")]
    MissingServerName,
    #[error("server name must match the format of a hostname, got {0:?}")]
    InvalidServerName(String),
    #[error("datastore path missing")]
    MissingDatastorePath,
    #[error("server listening addresses missing")]
    MissingListenAddresses,
    #[error("limits aren't set up properly, check them and make them sane")]
    InvalidLimits,
    #[error("could not parse STS duration: {0}")]
    InvalidStsDuration(#[source] UnitError),
    #[error("STS port is incorrect, should be 0 if disabled: {0}")]
    InvalidStsPort(i64),
    #[error("IP cloaking config is incorrect: {0}")]
    InvalidCloaking(#[from] CloakError),
    #[error(transparent)]
    InvalidThrottle(#[from] ThrottleError),
    #[error("connection-limits {0}")]
    InvalidExemption(#[from] ExemptionError),
    #[error("line lengths must be 512 or greater (check the linelen section under limits)")]
    LineLenTooShort,
    #[error("invalid logging directive: {0}")]
    Logging(#[from] LoggingError),
    #[error("could not parse maximum SendQ size: {0}")]
    InvalidMaxSendQ(#[source] UnitError),
    #[error("could not decode server password: {0}")]
    ServerPassword(#[source] PasswordError),
    #[error(transparent)]
    OperClass(#[from] OperClassError),
    #[error(transparent)]
    Oper(#[from] OperError),
    #[error(transparent)]
    Tls(#[from] TlsError),
}

impl ConfigError {
    /// Get a static error code string for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::MissingNetworkName => "missing_network_name",
            Self::MissingServerName => "missing_server_name",
            Self::InvalidServerName(_) => "invalid_server_name",
            Self::MissingDatastorePath => "missing_datastore_path",
            Self::MissingListenAddresses => "missing_listen_addresses",
            Self::InvalidLimits => "invalid_limits",
            Self::InvalidStsDuration(_) => "invalid_sts_duration",
            Self::InvalidStsPort(_) => "invalid_sts_port",
            Self::InvalidCloaking(_) => "invalid_cloaking",
            Self::InvalidThrottle(_) => "invalid_throttle",
            Self::InvalidExemption(_) => "invalid_exemption",
            Self::LineLenTooShort => "linelen_too_short",
            Self::Logging(_) => "logging",
            Self::InvalidMaxSendQ(_) => "invalid_max_sendq",
            Self::ServerPassword(_) => "server_password",
            Self::OperClass(_) => "oper_class",
            Self::Oper(_) => "oper",
            Self::Tls(_) => "tls",
        }
    }
}
