//! A whole program made of one function, through `dispatch_command`.

use anyhow::Result;
use argmap::{Command, Function, Output, dispatch_command};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let echo = Function::new("echo", "*words, upper=False, sep=' '", |call| {
        let words: Vec<String> = call.rest().iter().map(ToString::to_string).collect();
        let text = words.join(call.str("sep")?);
        Ok(Output::text(if call.bool("upper")? { text.to_uppercase() } else { text }))
    })
    .with_doc("Print the given words");

    dispatch_command(Command::new(echo))
}
