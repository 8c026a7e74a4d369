//! The `slircd-config` binary.

mod common;

use common::{MINIMAL_CONFIG, TestConfig};
use slircd_config::security::{decode_password_hash, verify_password};
use std::io::Write;
use std::process::{Command, Stdio};

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_slircd-config"))
}

#[test]
fn valid_config_exits_zero() {
    let fixture = TestConfig::new().unwrap();
    let path = fixture.write_raw(MINIMAL_CONFIG).unwrap();

    let output = binary().arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn invalid_config_exits_non_zero() {
    let fixture = TestConfig::new().unwrap();
    let path = fixture
        .write_raw(&MINIMAL_CONFIG.replacen("listen = [\"127.0.0.1:6667\"]", "listen = []", 1))
        .unwrap();

    let output = binary().arg(&path).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("server listening addresses missing"), "{stderr}");
}

#[test]
fn default_path_is_ircd_toml() {
    let fixture = TestConfig::new().unwrap();
    fixture.write_raw(MINIMAL_CONFIG).unwrap();

    let output = binary().current_dir(fixture.path()).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn genpasswd_prints_an_encoded_hash() {
    let mut child = binary()
        .arg("genpasswd")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"correct horse\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let encoded = String::from_utf8(output.stdout).unwrap();
    let decoded = decode_password_hash(encoded.trim()).unwrap();
    assert!(verify_password(&decoded, "correct horse"));
    assert!(!verify_password(&decoded, "correct horse\n"));
}
