//! slircd-config - configuration loader for the Straylight IRC daemon.
//!
//! Reads a TOML document, validates it, and resolves it into an immutable
//! [`Config`]: oper classes flattened, passwords decoded, durations and sizes
//! parsed, TLS contexts built. Loading either succeeds completely or returns a
//! [`ConfigError`].

pub mod config;
pub mod error;
pub mod names;
pub mod security;

pub use config::Config;
pub use error::ConfigError;
