//! Configuration validation.
//!
//! Turns a [`RawConfig`] into a [`Config`], checking the global invariants
//! and running each component resolver in dependency order. The first
//! failure aborts the load.

use std::net::{IpAddr, Ipv4Addr};
use tracing::info;

use super::listen::StsPolicy;
use super::logging::LoggingConfig;
use super::oper::{bind_opers, resolve_oper_classes};
use super::tls::build_tls_listeners;
use super::types::{Config, NetworkConfig, RawConfig, ServerConfig};
use super::units::{ByteSize, HumanDuration};
use crate::error::ConfigError;
use crate::names::is_hostname;
use crate::security::password::decode_password_hash;

/// Address run through the cloaking module to prove the config is usable.
const CLOAK_PROBE_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8));

impl RawConfig {
    /// Validate and resolve the document into the runtime configuration.
    pub fn resolve(self) -> Result<Config, ConfigError> {
        if self.network.name.is_empty() {
            return Err(ConfigError::MissingNetworkName);
        }
        if self.server.name.is_empty() {
            return Err(ConfigError::MissingServerName);
        }
        if !is_hostname(&self.server.name) {
            return Err(ConfigError::InvalidServerName(self.server.name.clone()));
        }
        if self.datastore.path.is_empty() {
            return Err(ConfigError::MissingDatastorePath);
        }
        if self.server.listen.is_empty() {
            return Err(ConfigError::MissingListenAddresses);
        }
        if !self.limits.lengths_are_sane() {
            return Err(ConfigError::InvalidLimits);
        }

        let sts = self.resolve_sts()?;

        if self.network.ip_cloaking.enabled {
            self.network.ip_cloaking.cloak_ip(&CLOAK_PROBE_ADDR)?;
        }

        let connection_throttle = self.server.connection_throttling.resolve()?;
        let connection_limits = self.server.connection_limits.resolve()?;

        if !self.limits.linelen.is_sane() {
            return Err(ConfigError::LineLenTooShort);
        }

        let logging = self
            .logging
            .iter()
            .map(|block| block.resolve())
            .collect::<Result<Vec<LoggingConfig>, _>>()?;

        let max_sendq =
            ByteSize::parse(&self.server.max_sendq).map_err(ConfigError::InvalidMaxSendQ)?;

        let password = self
            .server
            .password
            .as_deref()
            .map(decode_password_hash)
            .transpose()
            .map_err(ConfigError::ServerPassword)?;

        let oper_classes = resolve_oper_classes(&self.oper_classes)?;
        let opers = bind_opers(&self.opers, &oper_classes)?;
        let tls_listeners = build_tls_listeners(&self.server.tls_listeners)?;

        info!(
            network = %self.network.name,
            server = %self.server.name,
            listeners = self.server.listen.len(),
            tls_listeners = tls_listeners.len(),
            oper_classes = oper_classes.len(),
            opers = opers.len(),
            "Configuration loaded"
        );

        let RawConfig {
            network,
            server,
            datastore,
            accounts,
            channels,
            limits,
            ..
        } = self;

        Ok(Config {
            network: NetworkConfig {
                name: network.name,
                ip_cloaking: network.ip_cloaking,
            },
            server: ServerConfig {
                name: server.name,
                password,
                listen: server.listen,
                ws_listen: server.ws_listen.filter(|addr| !addr.is_empty()),
                tls_listeners,
                sts,
                rest_api: server.rest_api,
                check_ident: server.check_ident,
                motd: server.motd.filter(|path| !path.is_empty()),
                max_sendq,
                connection_limits,
                connection_throttle,
            },
            datastore,
            accounts,
            channels,
            oper_classes,
            opers,
            logging,
            limits,
        })
    }

    fn resolve_sts(&self) -> Result<Option<StsPolicy>, ConfigError> {
        let sts = &self.server.sts;
        if !sts.enabled {
            return Ok(None);
        }

        let duration =
            HumanDuration::parse_extended(&sts.duration).map_err(ConfigError::InvalidStsDuration)?;
        let port = u16::try_from(sts.port).map_err(|_| ConfigError::InvalidStsPort(sts.port))?;

        Ok(Some(StsPolicy {
            duration,
            port,
            preload: sts.preload,
        }))
    }
}
