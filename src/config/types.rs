//! Core configuration types.
//!
//! [`RawConfig`] mirrors the TOML document one to one. [`Config`] is what the
//! rest of the daemon sees: every string that needed parsing has been parsed,
//! oper classes are flattened, and TLS contexts are loaded. It is built once
//! by [`RawConfig::resolve`](super::validation) and never mutated afterwards.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use super::limits::LimitsConfig;
use super::listen::{RestApiConfig, StsBlock, StsPolicy, TlsListenBlock};
use super::logging::{LoggingBlock, LoggingConfig};
use super::oper::{Oper, OperBlock, OperClass, OperClassBlock};
use super::security::{
    ConnectionLimits, ConnectionLimitsBlock, ConnectionThrottle, ConnectionThrottleBlock,
};
use super::tls::TlsListener;
use super::units::ByteSize;
use crate::error::ConfigError;
use crate::security::cloaking::CloakConfig;

/// The configuration document as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub network: NetworkBlock,
    #[serde(default)]
    pub server: ServerBlock,
    #[serde(default)]
    pub datastore: DatastoreConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub oper_classes: BTreeMap<String, OperClassBlock>,
    #[serde(default)]
    pub opers: BTreeMap<String, OperBlock>,
    #[serde(default)]
    pub logging: Vec<LoggingBlock>,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Raw `[network]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkBlock {
    /// Network name (e.g., "Straylight").
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip_cloaking: CloakConfig,
}

/// Raw `[server]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerBlock {
    /// Server name (e.g., "irc.straylight.net").
    #[serde(default)]
    pub name: String,
    /// Encoded connection password hash (optional).
    #[serde(default)]
    pub password: Option<String>,
    /// Plaintext listen addresses (e.g., "0.0.0.0:6667").
    #[serde(default)]
    pub listen: Vec<String>,
    /// WebSocket listen address.
    #[serde(default)]
    pub ws_listen: Option<String>,
    #[serde(default)]
    pub tls_listeners: BTreeMap<String, TlsListenBlock>,
    #[serde(default)]
    pub sts: StsBlock,
    #[serde(default)]
    pub rest_api: RestApiConfig,
    #[serde(default)]
    pub check_ident: bool,
    /// Path to the MOTD file.
    #[serde(default)]
    pub motd: Option<String>,
    /// Maximum send queue per client, e.g. `"16k"`.
    #[serde(default)]
    pub max_sendq: String,
    #[serde(default)]
    pub connection_limits: ConnectionLimitsBlock,
    #[serde(default)]
    pub connection_throttling: ConnectionThrottleBlock,
}

/// Datastore configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DatastoreConfig {
    /// Path to the datastore file.
    #[serde(default)]
    pub path: String,
}

/// Account configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountsConfig {
    #[serde(default)]
    pub registration: AccountRegistrationConfig,
    #[serde(default)]
    pub authentication_enabled: bool,
}

/// Account registration configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountRegistrationConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Verification callbacks offered to registering users (e.g. "mailto").
    #[serde(default)]
    pub enabled_callbacks: Vec<String>,
    #[serde(default)]
    pub callbacks: RegistrationCallbacks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationCallbacks {
    #[serde(default)]
    pub mailto: MailtoCallbackConfig,
}

/// Email verification callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailtoCallbackConfig {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub tls: MailtoTlsConfig,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub verify_message_subject: String,
    #[serde(default)]
    pub verify_message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailtoTlsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    #[serde(default)]
    pub server_name: String,
}

/// Channel configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub registration: ChannelRegistrationConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelRegistrationConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub network: NetworkConfig,
    pub server: ServerConfig,
    pub datastore: DatastoreConfig,
    pub accounts: AccountsConfig,
    pub channels: ChannelsConfig,
    /// Flattened oper classes by name.
    pub oper_classes: HashMap<String, Arc<OperClass>>,
    /// Operators by casefolded name.
    pub opers: HashMap<String, Oper>,
    pub logging: Vec<LoggingConfig>,
    pub limits: LimitsConfig,
}

/// Resolved `[network]` section.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub name: String,
    /// Passed through for the cloaking module; probed at load time.
    pub ip_cloaking: CloakConfig,
}

/// Resolved `[server]` section.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    /// Decoded connection password hash.
    pub password: Option<Vec<u8>>,
    pub listen: Vec<String>,
    pub ws_listen: Option<String>,
    /// TLS contexts by casefolded listener name.
    pub tls_listeners: HashMap<String, TlsListener>,
    /// STS policy, present only when STS is enabled.
    pub sts: Option<StsPolicy>,
    pub rest_api: RestApiConfig,
    pub check_ident: bool,
    pub motd: Option<String>,
    pub max_sendq: ByteSize,
    /// Present only when connection limits are enabled.
    pub connection_limits: Option<ConnectionLimits>,
    /// Present only when throttling is enabled.
    pub connection_throttle: Option<ConnectionThrottle>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        raw.resolve()
    }

    /// Look up an operator by name (case-insensitively).
    pub fn oper(&self, name: &str) -> Option<&Oper> {
        let folded = crate::names::casefold_name(name).ok()?;
        self.opers.get(&folded)
    }

    /// Look up a TLS listener by name (case-insensitively).
    pub fn tls_listener(&self, name: &str) -> Option<&TlsListener> {
        let folded = crate::names::casefold_name(name).ok()?;
        self.server.tls_listeners.get(&folded)
    }
}
