//! TLS listener contexts.
//!
//! Every `[server.tls_listeners.<name>]` block becomes a ready rustls
//! `ServerConfig`. A certificate/key pair that cannot be loaded aborts the
//! whole config load, as do two names that casefold to the same key. A
//! listener name that cannot be casefolded only drops that listener.

use rustls_pemfile::{certs, private_key};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::{BufReader, Cursor};
use std::sync::Arc;
use thiserror::Error;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tracing::{info, warn};

use super::listen::TlsListenBlock;
use crate::names::casefold_name;

/// TLS listener errors.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read TLS file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no certificates found in {0}")]
    NoCertificates(String),
    #[error("no private key found in {0}")]
    NoPrivateKey(String),
    #[error("tls cert+key for listener [{listener}]: invalid pair: {source}")]
    InvalidPair {
        listener: String,
        #[source]
        source: tokio_rustls::rustls::Error,
    },
    #[error("tls listener [{0}] is defined more than once")]
    Duplicate(String),
}

/// A loaded TLS listener.
#[derive(Clone)]
pub struct TlsListener {
    /// Casefolded listener name.
    pub name: String,
    pub cert_path: String,
    pub key_path: String,
    server_config: Arc<ServerConfig>,
}

impl TlsListener {
    pub fn server_config(&self) -> Arc<ServerConfig> {
        Arc::clone(&self.server_config)
    }

    /// Acceptor for the connection engine.
    pub fn acceptor(&self) -> TlsAcceptor {
        TlsAcceptor::from(self.server_config())
    }
}

impl fmt::Debug for TlsListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsListener")
            .field("name", &self.name)
            .field("cert_path", &self.cert_path)
            .field("key_path", &self.key_path)
            .finish_non_exhaustive()
    }
}

impl TlsListenBlock {
    /// Load the certificate chain and private key into a server config.
    pub fn load(&self, listener: &str) -> Result<ServerConfig, TlsError> {
        let cert_file = read(&self.cert_path)?;
        let cert_reader = &mut BufReader::new(Cursor::new(cert_file));
        let cert_chain: Vec<CertificateDer<'static>> = certs(cert_reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| TlsError::Read {
                path: self.cert_path.clone(),
                source,
            })?;

        if cert_chain.is_empty() {
            return Err(TlsError::NoCertificates(self.cert_path.clone()));
        }

        let key_file = read(&self.key_path)?;
        let key_reader = &mut BufReader::new(Cursor::new(key_file));
        let key: PrivateKeyDer<'static> = private_key(key_reader)
            .map_err(|source| TlsError::Read {
                path: self.key_path.clone(),
                source,
            })?
            .ok_or_else(|| TlsError::NoPrivateKey(self.key_path.clone()))?;

        let invalid_pair = |source| TlsError::InvalidPair {
            listener: listener.to_string(),
            source,
        };
        ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(invalid_pair)?
            .with_no_client_auth()
            .with_single_cert(cert_chain, key)
            .map_err(invalid_pair)
    }
}

fn read(path: &str) -> Result<Vec<u8>, TlsError> {
    std::fs::read(path).map_err(|source| TlsError::Read {
        path: path.to_string(),
        source,
    })
}

/// Build every configured TLS listener, keyed by casefolded name.
pub fn build_tls_listeners(
    blocks: &BTreeMap<String, TlsListenBlock>,
) -> Result<HashMap<String, TlsListener>, TlsError> {
    let mut listeners = HashMap::with_capacity(blocks.len());

    for (raw_name, block) in blocks {
        let server_config = block.load(raw_name)?;

        let name = match casefold_name(raw_name) {
            Ok(name) => name,
            Err(e) => {
                warn!(listener = %raw_name, error = %e, "Could not casefold TLS listener, skipping it");
                continue;
            }
        };

        info!(listener = %name, cert = %block.cert_path, "Loaded TLS listener");
        let listener = TlsListener {
            name: name.clone(),
            cert_path: block.cert_path.clone(),
            key_path: block.key_path.clone(),
            server_config: Arc::new(server_config),
        };
        if listeners.insert(name.clone(), listener).is_some() {
            return Err(TlsError::Duplicate(name));
        }
    }

    Ok(listeners)
}
