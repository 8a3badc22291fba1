//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use argmap::{CallArgs, Captured, Command, CommandTree, DispatchOptions, Dispatcher, Function, Output};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// A command from a name, a textual signature and a body.
pub fn command<F>(name: &str, signature: &str, body: F) -> Command
where
    F: Fn(CallArgs) -> anyhow::Result<Output> + 'static,
{
    Command::new(Function::new(name, signature, body))
}

/// A command that prints its bound arguments, positionals then keywords.
pub fn echo(name: &str, signature: &str) -> Command {
    command(name, signature, |call| {
        let mut parts: Vec<String> = call.args().iter().map(ToString::to_string).collect();
        parts.extend(call.kwargs().iter().map(|(k, v)| format!("{k}={v}")));
        Ok(Output::text(parts.join(" ")))
    })
}

/// A tree with `commands` at the root.
pub fn tree_with(commands: Vec<Command>) -> CommandTree {
    let mut tree = CommandTree::new("app");
    tree.add(commands, &[]).unwrap();
    tree
}

/// Dispatch into memory with default options.
pub fn run(tree: &CommandTree, argv: &[&str]) -> Captured {
    Dispatcher::new(tree).dispatch_captured(argv.iter().copied()).unwrap()
}

/// Dispatch into memory with `options`.
pub fn run_with(tree: &CommandTree, options: DispatchOptions, argv: &[&str]) -> Captured {
    Dispatcher::new(tree)
        .with_options(options)
        .dispatch_captured(argv.iter().copied())
        .unwrap()
}

/// A writer that remembers every `write` call and can be read after the
/// dispatch that used it has failed.
#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<Vec<u8>>>>);

impl Recorder {
    pub fn writes(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    pub fn text(&self) -> String {
        self.writes().concat()
    }
}

impl Write for Recorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
