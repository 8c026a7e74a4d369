//! Security collaborators used while loading the configuration.
//!
//! - **Cloaking**: HMAC-SHA256 IP cloaking, probed at load time
//! - **Password**: base64-encoded bcrypt hashes for opers and the server password

pub mod cloaking;
pub mod password;

pub use cloaking::{CloakConfig, CloakError};
pub use password::{PasswordError, decode_password_hash, hash_password, verify_password};
