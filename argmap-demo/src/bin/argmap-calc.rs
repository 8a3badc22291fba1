//! Arithmetic commands registered on an `EntryPoint`.

use anyhow::Result;
use argmap::{Command, CommandError, EntryPoint, Function, NameMappingPolicy, Output};
use std::process::ExitCode;

fn binary(name: &str, doc: &str, op: fn(i64, i64) -> Option<i64>) -> Command {
    let function = Function::new(name, "a: int, b: int", move |call| {
        match op(call.int("a")?, call.int("b")?) {
            Some(result) => Ok(Output::text(result.to_string())),
            None => Err(CommandError::new("result out of range").with_code(3).into()),
        }
    });
    Command::new(function.with_doc(doc))
}

fn main() -> Result<ExitCode> {
    EntryPoint::new("argmap-calc")
        .about("Integer arithmetic")
        .version(env!("CARGO_PKG_VERSION"))
        .policy(NameMappingPolicy::ByNameIfKwonly)
        .register(binary("add", "Add two integers", i64::checked_add))
        .register(binary("mul", "Multiply two integers", i64::checked_mul))
        .register(binary("div", "Divide, rounding toward zero", i64::checked_div))
        .run()
}
