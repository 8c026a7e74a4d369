//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: The raw document ([`RawConfig`]) and the resolved [`Config`]
//! - [`validation`]: Global checks and the resolve pipeline
//! - [`listen`]: TLS listener blocks, STS policy, REST API
//! - [`tls`]: Loading certificate/key pairs into server TLS contexts
//! - [`security`]: Connection limits and connection throttling
//! - [`limits`]: Protocol length limits (LimitsConfig)
//! - [`oper`]: Operator classes and operator blocks
//! - [`logging`]: Logging directives
//! - [`units`]: Duration and byte size grammars

pub mod limits;
pub mod listen;
pub mod logging;
pub mod oper;
pub mod security;
pub mod tls;
pub mod types;
pub mod units;
mod validation;

pub use limits::{LimitsConfig, LineLenConfig};
pub use listen::{RestApiConfig, StsPolicy, TlsListenBlock};
pub use logging::{LogLevel, LoggingConfig, LoggingError};
pub use oper::{Oper, OperClass, OperClassError, OperError};
pub use security::{ConnectionLimits, ConnectionThrottle, ExemptionError, ThrottleError};
pub use tls::{TlsError, TlsListener};
pub use types::{Config, NetworkConfig, RawConfig, ServerConfig};
pub use units::{ByteSize, DurationGrammar, HumanDuration, UnitError};
