//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Package version for testing --version flag
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Helper to get the compiled binary path
pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_argmap-demo"))
}

/// Helper to create a Command for the demo with a predictable environment.
pub fn test_command() -> Command {
    isolated(get_binary_path())
}

/// Run `binary` with UTF-8 output, no logging and nothing read from the
/// terminal.
pub fn isolated(binary: impl Into<PathBuf>) -> Command {
    let mut cmd = Command::new(binary.into());
    cmd.env_remove("LC_ALL")
        .env_remove("LC_CTYPE")
        .env_remove("ARGMAP_LOG")
        .env_remove("ARGMAP_ENCODING_ERRORS")
        .env("LANG", "C.UTF-8")
        .stdin(Stdio::null());
    cmd
}

/// Run the demo with `args`.
pub fn run(args: &[&str]) -> Output {
    test_command()
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Run the demo with `args`, feeding `input` on stdin.
pub fn run_with_input(args: &[&str], input: &str) -> Output {
    let mut child = test_command()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().expect("Failed to wait for command")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
