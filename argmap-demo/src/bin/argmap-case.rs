//! Flat commands through `dispatch_commands`.

use anyhow::Result;
use argmap::{Command, Function, Output, dispatch_commands};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let upper = Function::new("upper", "text", |call| {
        Ok(Output::text(call.str("text")?.to_uppercase()))
    });
    let lower = Function::new("lower", "text", |call| {
        Ok(Output::text(call.str("text")?.to_lowercase()))
    });

    dispatch_commands([Command::new(upper), Command::new(lower)])
}
