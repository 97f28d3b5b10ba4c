#![allow(dead_code)]

use assert_cmd::Command;
use std::io::Write;

pub const HELLO: &str = concat!(
    "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.",
    "<<+++++++++++++++.>.+++.------.--------.>+.>.",
);

/// The binary with a private config directory and no `BF_*` overrides.
pub fn cargo_bin(config_home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("brainfuck").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("BF_TAPE_SIZE")
        .env_remove("BF_MAX_PROGRAM_SIZE")
        .env_remove("BF_MAX_STEPS")
        .env_remove("BF_TIMEOUT_MS")
        .env_remove("RUST_LOG");
    cmd
}

pub fn script(content: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("tempfile");
    tf.write_all(content).unwrap();
    tf
}
