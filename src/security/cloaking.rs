//! IP cloaking configuration and address cloaking.
//!
//! Provides HMAC-SHA256 based cloaking for IP addresses, protecting user
//! privacy while keeping cloaks deterministic for a given secret.
//!
//! The config loader only runs a probe address through [`CloakConfig::cloak_ip`]
//! to prove the configuration is usable; connection handling does the rest.
//!
//! # Format Examples
//!
//! - IPv4: `abc12.def45.ghi78.example` (3 segments + netname)
//! - IPv6: `abc12:def45:ghi78:example` (colon-separated)

use hmac::{Hmac, Mac};
use ipnet::IpNet;
use serde::Deserialize;
use sha2::Sha256;
use std::net::IpAddr;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Base32 alphabet (RFC 4648 without padding, lowercase for IRC).
const BASE32_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Minimum secret length accepted for cloaking.
const MIN_SECRET_LEN: usize = 16;

/// Cloaking errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloakError {
    #[error("ip cloaking is not enabled")]
    Disabled,
    #[error("ip cloaking netname is missing")]
    MissingNetName,
    #[error("ip cloaking secret is missing, too short or a placeholder")]
    WeakSecret,
    #[error("ip cloaking CIDR length {len} is out of range for {family}")]
    InvalidCidrLen { family: &'static str, len: u8 },
}

/// IP cloaking configuration (`[network.ip_cloaking]`).
#[derive(Debug, Clone, Deserialize)]
pub struct CloakConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Label appended to every cloak (usually the network name).
    #[serde(default)]
    pub netname: String,
    /// Secret key for the HMAC. MUST be kept private.
    #[serde(default)]
    pub secret: String,
    /// Prefix length kept from IPv4 addresses before hashing (default: 24).
    #[serde(default = "default_cidr_len_ipv4")]
    pub cidr_len_ipv4: u8,
    /// Prefix length kept from IPv6 addresses before hashing (default: 48).
    #[serde(default = "default_cidr_len_ipv6")]
    pub cidr_len_ipv6: u8,
}

impl Default for CloakConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            netname: String::new(),
            secret: String::new(),
            cidr_len_ipv4: default_cidr_len_ipv4(),
            cidr_len_ipv6: default_cidr_len_ipv6(),
        }
    }
}

fn default_cidr_len_ipv4() -> u8 {
    24
}

fn default_cidr_len_ipv6() -> u8 {
    48
}

impl CloakConfig {
    /// Generate a cloaked hostname for `ip`.
    ///
    /// The address is masked to the configured prefix length first, so every
    /// address in the same network gets the same cloak.
    pub fn cloak_ip(&self, ip: &IpAddr) -> Result<String, CloakError> {
        if !self.enabled {
            return Err(CloakError::Disabled);
        }
        if self.netname.is_empty() {
            return Err(CloakError::MissingNetName);
        }
        if is_default_secret(&self.secret) {
            return Err(CloakError::WeakSecret);
        }

        let masked = self.mask(ip)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| CloakError::WeakSecret)?;
        mac.update(masked.to_string().as_bytes());
        let hash_bytes = mac.finalize().into_bytes();

        let segment1 = base32_encode(&hash_bytes[0..3]);
        let segment2 = base32_encode(&hash_bytes[3..6]);
        let segment3 = base32_encode(&hash_bytes[6..9]);

        Ok(match ip {
            IpAddr::V4(_) => format!("{segment1}.{segment2}.{segment3}.{}", self.netname),
            IpAddr::V6(_) => format!("{segment1}:{segment2}:{segment3}:{}", self.netname),
        })
    }

    fn mask(&self, ip: &IpAddr) -> Result<IpAddr, CloakError> {
        let (family, len) = match ip {
            IpAddr::V4(_) => ("IPv4", self.cidr_len_ipv4),
            IpAddr::V6(_) => ("IPv6", self.cidr_len_ipv6),
        };
        let net = IpNet::new(*ip, len).map_err(|_| CloakError::InvalidCidrLen { family, len })?;
        Ok(net.trunc().addr())
    }
}

/// Encode bytes to base32 (RFC 4648 style, lowercase, no padding).
fn base32_encode(data: &[u8]) -> String {
    let mut result = String::new();
    let mut bits = 0u32;
    let mut bit_count = 0u8;

    for &byte in data {
        bits = (bits << 8) | u32::from(byte);
        bit_count += 8;

        while bit_count >= 5 {
            bit_count -= 5;
            let index = ((bits >> bit_count) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[index] as char);
        }
    }

    if bit_count > 0 {
        let index = ((bits << (5 - bit_count)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[index] as char);
    }

    result
}

/// Check if a secret key is the insecure default.
///
/// Returns `true` if the key appears to be a placeholder that should be changed.
pub fn is_default_secret(secret: &str) -> bool {
    secret.is_empty()
        || secret.contains("default")
        || secret.contains("changeme")
        || secret.len() < MIN_SECRET_LEN
}
