//! The small programs built on `EntryPoint`, `dispatch_command` and
//! `dispatch_commands`

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;
use std::process::Output;

fn echo(args: &[&str]) -> Output {
    isolated(env!("CARGO_BIN_EXE_argmap-echo"))
        .args(args)
        .output()
        .expect("Failed to execute argmap-echo")
}

fn calc(args: &[&str]) -> Output {
    isolated(env!("CARGO_BIN_EXE_argmap-calc"))
        .args(args)
        .output()
        .expect("Failed to execute argmap-calc")
}

fn case(args: &[&str]) -> Output {
    isolated(env!("CARGO_BIN_EXE_argmap-case"))
        .args(args)
        .output()
        .expect("Failed to execute argmap-case")
}

#[test]
fn test_single_command_program_takes_arguments_directly() {
    let output = echo(&["hello", "world"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "hello world\n");

    let output = echo(&["--upper", "--sep", "+", "a", "b"]);
    assert_eq!(stdout(&output), "A+B\n");

    let output = echo(&[]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "\n");
}

#[test]
fn test_single_command_program_help() {
    let output = echo(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Print the given words"), "{text}");
    assert!(text.contains("--upper"), "{text}");
}

#[test]
fn test_entry_point_commands() {
    let output = calc(&["add", "2", "3"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "5\n");

    assert_eq!(stdout(&calc(&["mul", "-4", "5"])), "-20\n");
    assert_eq!(stdout(&calc(&["div", "7", "2"])), "3\n");
}

#[test]
fn test_entry_point_exit_statuses() {
    let output = calc(&["div", "1", "0"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stderr(&output), "result out of range\n");

    let output = calc(&["add", "1", "x"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("invalid int value"));

    let output = calc(&[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage: argmap-calc"));
}

#[test]
fn test_entry_point_version_and_about() {
    let output = calc(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(PKG_VERSION));

    let output = calc(&["--help"]);
    assert!(stdout(&output).contains("Integer arithmetic"));
}

#[test]
fn test_flat_commands_program() {
    assert_eq!(stdout(&case(&["upper", "MiXed"])), "MIXED\n");
    assert_eq!(stdout(&case(&["lower", "MiXed"])), "mixed\n");

    let output = case(&["title", "x"]);
    assert_eq!(output.status.code(), Some(2));
}
