//! slircd-config - validate a Straylight IRC daemon configuration file.
//!
//! `slircd-config [path]` loads and checks the config (default `ircd.toml`).
//! `slircd-config genpasswd` reads a password from stdin and prints the
//! encoded hash for use in `password` fields.

use slircd_config::Config;
use slircd_config::security::hash_password;
use std::io::BufRead;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "ircd.toml";

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("genpasswd") {
        return genpasswd();
    }

    let config_path = arg.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, code = e.error_code(), error = %e, "Failed to load config");
        e
    })?;

    info!(
        network = %config.network.name,
        server = %config.server.name,
        listen = ?config.server.listen,
        tls_listeners = config.server.tls_listeners.len(),
        sts = config.server.sts.is_some(),
        opers = config.opers.len(),
        max_sendq = config.server.max_sendq.bytes(),
        "Config OK"
    );

    Ok(())
}

fn genpasswd() -> anyhow::Result<()> {
    let mut password = String::new();
    std::io::stdin().lock().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        anyhow::bail!("no password given on stdin");
    }

    let encoded = hash_password(password, bcrypt::DEFAULT_COST)?;
    println!("{encoded}");
    Ok(())
}
