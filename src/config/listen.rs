//! Network listener configuration.

use serde::Deserialize;

use super::units::HumanDuration;

/// TLS listener configuration (`[server.tls_listeners.<name>]`).
#[derive(Debug, Clone, Deserialize)]
pub struct TlsListenBlock {
    /// Path to certificate file (PEM format).
    pub cert_path: String,
    /// Path to private key file (PEM format).
    pub key_path: String,
}

/// Raw Strict Transport Security (STS) block.
///
/// STS lets the server advertise that clients should only connect via TLS.
/// Reference: <https://ircv3.net/specs/extensions/sts>
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StsBlock {
    #[serde(default)]
    pub enabled: bool,
    /// How long clients must keep using TLS, e.g. `"1mo"` or `"30d"`.
    #[serde(default)]
    pub duration: String,
    /// TLS port to advertise. 0 leaves the port out of the advertisement.
    /// Kept signed so an out-of-range value reaches validation instead of
    /// failing deserialization.
    #[serde(default)]
    pub port: i64,
    /// Whether to opt in to STS preload lists.
    #[serde(default)]
    pub preload: bool,
}

/// Validated STS policy. Only exists when STS is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StsPolicy {
    pub duration: HumanDuration,
    pub port: u16,
    pub preload: bool,
}

impl StsPolicy {
    /// Value to advertise in the `sts` capability.
    pub fn value(&self) -> String {
        let mut value = format!("duration={}", self.duration.as_duration().as_secs());
        if self.port > 0 {
            value.push_str(&format!(",port={}", self.port));
        }
        if self.preload {
            value.push_str(",preload");
        }
        value
    }
}

/// Integrated REST API configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestApiConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Address to bind to (e.g., "127.0.0.1:8090").
    #[serde(default)]
    pub listen: String,
}
