//! Integration test common infrastructure.
//!
//! Provides a minimal valid config document and helpers for writing config
//! files and certificate material into a temporary directory.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

pub mod tls;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Smallest document that passes validation.
pub const MINIMAL_CONFIG: &str = r#"
[network]
name = "StraylightNet"

[server]
name = "irc.straylight.net"
listen = ["127.0.0.1:6667"]
max_sendq = "16k"

[datastore]
path = "ircd.db"

[limits]
awaylen = 200
chan_list_modes = 60
channellen = 64
kicklen = 390
monitor_entries = 100
nicklen = 32
topiclen = 390
whowas_entries = 100

[limits.linelen]
tags = 2048
rest = 2048
"#;

/// A temporary directory holding a config file and anything it points at.
pub struct TestConfig {
    dir: TempDir,
}

impl TestConfig {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `MINIMAL_CONFIG` followed by `extra` and return the file path.
    pub fn write_with(&self, extra: &str) -> anyhow::Result<PathBuf> {
        self.write_raw(&format!("{MINIMAL_CONFIG}\n{extra}"))
    }

    pub fn write_raw(&self, content: &str) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join("ircd.toml");
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Quote a path for embedding in a TOML string.
pub fn toml_path(path: &Path) -> String {
    format!("{:?}", path.display().to_string())
}
