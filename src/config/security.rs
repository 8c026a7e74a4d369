//! Connection limit and connection throttling configuration.

use ipnet::IpNet;
use serde::Deserialize;
use std::net::IpAddr;
use thiserror::Error;

use super::units::{HumanDuration, UnitError};

/// Exemption list errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid exempted address or network {0:?}")]
pub struct ExemptionError(pub String);

/// Automated connection limits (`[server.connection_limits]`).
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionLimitsBlock {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cidr_len_ipv4")]
    pub cidr_len_ipv4: u8,
    #[serde(default = "default_cidr_len_ipv6")]
    pub cidr_len_ipv6: u8,
    /// Maximum concurrent clients from one subnet.
    #[serde(default = "default_ips_per_subnet")]
    pub ips_per_subnet: u32,
    /// Addresses or networks that bypass the limit.
    #[serde(default)]
    pub exempted: Vec<String>,
}

impl Default for ConnectionLimitsBlock {
    fn default() -> Self {
        Self {
            enabled: false,
            cidr_len_ipv4: default_cidr_len_ipv4(),
            cidr_len_ipv6: default_cidr_len_ipv6(),
            ips_per_subnet: default_ips_per_subnet(),
            exempted: Vec::new(),
        }
    }
}

/// Automated connection throttling (`[server.connection_throttling]`).
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionThrottleBlock {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_cidr_len_ipv4")]
    pub cidr_len_ipv4: u8,
    #[serde(default = "default_cidr_len_ipv6")]
    pub cidr_len_ipv6: u8,
    /// Connections allowed from one subnet within `duration`.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Throttle window, e.g. `"10m"`.
    #[serde(default)]
    pub duration: String,
    /// How long an offending subnet is banned, e.g. `"10m"`.
    #[serde(default)]
    pub ban_duration: String,
    #[serde(default = "default_ban_message")]
    pub ban_message: String,
    #[serde(default)]
    pub exempted: Vec<String>,
}

impl Default for ConnectionThrottleBlock {
    fn default() -> Self {
        Self {
            enabled: false,
            cidr_len_ipv4: default_cidr_len_ipv4(),
            cidr_len_ipv6: default_cidr_len_ipv6(),
            max_connections: default_max_connections(),
            duration: String::new(),
            ban_duration: String::new(),
            ban_message: default_ban_message(),
            exempted: Vec::new(),
        }
    }
}

fn default_cidr_len_ipv4() -> u8 {
    32
}

fn default_cidr_len_ipv6() -> u8 {
    64
}

fn default_ips_per_subnet() -> u32 {
    16
}

fn default_max_connections() -> u32 {
    32
}

fn default_ban_message() -> String {
    "You have attempted to connect too many times within a short duration. Wait a while, and you will be able to connect.".to_string()
}

/// Resolved connection limits. Only exists when limits are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionLimits {
    pub cidr_len_ipv4: u8,
    pub cidr_len_ipv6: u8,
    pub ips_per_subnet: u32,
    pub exempted: Vec<IpNet>,
}

/// Resolved connection throttling. Only exists when throttling is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionThrottle {
    pub cidr_len_ipv4: u8,
    pub cidr_len_ipv6: u8,
    pub max_connections: u32,
    pub duration: HumanDuration,
    pub ban_duration: HumanDuration,
    pub ban_message: String,
    pub exempted: Vec<IpNet>,
}

/// Which throttle field failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThrottleError {
    #[error("could not parse connection-throttle duration: {0}")]
    Duration(#[source] UnitError),
    #[error("could not parse connection-throttle ban-duration: {0}")]
    BanDuration(#[source] UnitError),
    #[error(transparent)]
    Exemption(#[from] ExemptionError),
}

impl ConnectionLimitsBlock {
    /// Resolve the limits; `None` when disabled, in which case the
    /// exemption list is not looked at.
    pub fn resolve(&self) -> Result<Option<ConnectionLimits>, ExemptionError> {
        if !self.enabled {
            return Ok(None);
        }

        Ok(Some(ConnectionLimits {
            cidr_len_ipv4: self.cidr_len_ipv4,
            cidr_len_ipv6: self.cidr_len_ipv6,
            ips_per_subnet: self.ips_per_subnet,
            exempted: parse_exemptions(&self.exempted)?,
        }))
    }
}

impl ConnectionThrottleBlock {
    /// Resolve the throttle; `None` when disabled, in which case the
    /// duration strings are not looked at.
    pub fn resolve(&self) -> Result<Option<ConnectionThrottle>, ThrottleError> {
        if !self.enabled {
            return Ok(None);
        }

        let duration =
            HumanDuration::parse_standard(&self.duration).map_err(ThrottleError::Duration)?;
        let ban_duration =
            HumanDuration::parse_standard(&self.ban_duration).map_err(ThrottleError::BanDuration)?;

        Ok(Some(ConnectionThrottle {
            cidr_len_ipv4: self.cidr_len_ipv4,
            cidr_len_ipv6: self.cidr_len_ipv6,
            max_connections: self.max_connections,
            duration,
            ban_duration,
            ban_message: self.ban_message.clone(),
            exempted: parse_exemptions(&self.exempted)?,
        }))
    }
}

/// Parse exemption entries; a bare address becomes a single-host network.
pub fn parse_exemptions(entries: &[String]) -> Result<Vec<IpNet>, ExemptionError> {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.trim();
            entry
                .parse::<IpNet>()
                .or_else(|_| entry.parse::<IpAddr>().map(IpNet::from))
                .map_err(|_| ExemptionError(entry.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn exemptions_accept_addresses_and_networks() {
        let nets = parse_exemptions(&[
            "127.0.0.1".to_string(),
            "10.0.0.0/8".to_string(),
            "::1".to_string(),
            " 2001:db8::/32 ".to_string(),
        ])
        .unwrap();
        assert_eq!(nets.len(), 4);
        assert_eq!(nets[0], "127.0.0.1/32".parse::<IpNet>().unwrap());
        assert_eq!(nets[2], "::1/128".parse::<IpNet>().unwrap());
        assert!(nets[1].contains(&"10.1.2.3".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn malformed_exemption_is_rejected() {
        let err = parse_exemptions(&["localhost".to_string()]).unwrap_err();
        assert_eq!(err, ExemptionError("localhost".to_string()));
    }

    #[test]
    fn disabled_limits_ignore_exemptions() {
        let block = ConnectionLimitsBlock {
            exempted: vec!["localhost".to_string()],
            ..ConnectionLimitsBlock::default()
        };
        assert_eq!(block.resolve().unwrap(), None);

        let block = ConnectionLimitsBlock {
            enabled: true,
            ..block
        };
        assert_eq!(
            block.resolve().unwrap_err(),
            ExemptionError("localhost".to_string())
        );
    }

    #[test]
    fn enabled_limits_keep_their_settings() {
        let block = ConnectionLimitsBlock {
            enabled: true,
            ips_per_subnet: 4,
            exempted: vec!["127.0.0.1".to_string()],
            ..ConnectionLimitsBlock::default()
        };
        let limits = block.resolve().unwrap().unwrap();
        assert_eq!(limits.ips_per_subnet, 4);
        assert_eq!(limits.cidr_len_ipv4, 32);
        assert_eq!(limits.exempted.len(), 1);
    }

    #[test]
    fn disabled_throttle_ignores_durations() {
        let block = ConnectionThrottleBlock {
            duration: "garbage".to_string(),
            ..ConnectionThrottleBlock::default()
        };
        assert_eq!(block.resolve().unwrap(), None);
    }

    #[test]
    fn enabled_throttle_parses_durations() {
        let block = ConnectionThrottleBlock {
            enabled: true,
            duration: "10m".to_string(),
            ban_duration: "1h30m".to_string(),
            ..ConnectionThrottleBlock::default()
        };
        let throttle = block.resolve().unwrap().unwrap();
        assert_eq!(throttle.duration.as_duration(), Duration::from_secs(600));
        assert_eq!(throttle.ban_duration.as_duration(), Duration::from_secs(5400));
        assert_eq!(throttle.max_connections, 32);
    }

    #[test]
    fn enabled_throttle_reports_which_duration_failed() {
        let block = ConnectionThrottleBlock {
            enabled: true,
            duration: "10m".to_string(),
            ban_duration: "1d".to_string(),
            ..ConnectionThrottleBlock::default()
        };
        assert!(matches!(
            block.resolve(),
            Err(ThrottleError::BanDuration(UnitError::UnknownUnit { .. }))
        ));

        let block = ConnectionThrottleBlock {
            enabled: true,
            ..ConnectionThrottleBlock::default()
        };
        assert!(matches!(block.resolve(), Err(ThrottleError::Duration(_))));
    }
}
