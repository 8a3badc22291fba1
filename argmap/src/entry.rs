//! Program entry points
//!
//! An [`EntryPoint`] collects commands and dispatches the process command
//! line against them as sub-commands, `prog NAME ARGS`. To run a single
//! function as the whole program, `prog ARGS`, use [`dispatch_command`].

use crate::command::Command;
use crate::config::DispatchOptions;
use crate::dispatch::Dispatcher;
use crate::error::AssemblyError;
use crate::policy::NameMappingPolicy;
use crate::tree::CommandTree;
use anyhow::Result;
use std::env;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::ExitCode;

/// A named collection of commands that can be run as a program.
#[derive(Debug)]
pub struct EntryPoint {
    name: String,
    about: Option<String>,
    version: Option<String>,
    policy: Option<NameMappingPolicy>,
    commands: Vec<Command>,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            version: None,
            policy: None,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: NameMappingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use]
    pub fn register(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Assemble the command tree.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::NoCommands`] when nothing was registered, or the
    /// first assembly error of a registered command.
    pub fn build(self) -> Result<CommandTree, AssemblyError> {
        if self.commands.is_empty() {
            return Err(AssemblyError::NoCommands {
                entry_point: self.name,
            });
        }

        let mut tree = CommandTree::new(self.name);
        if let Some(about) = self.about {
            tree = tree.about(about);
        }
        if let Some(version) = self.version {
            tree = tree.version(version);
        }
        if let Some(policy) = self.policy {
            tree = tree.with_policy(policy);
        }

        tree.add(self.commands, &[])?;
        Ok(tree)
    }

    /// Dispatch the process arguments and return the exit status.
    ///
    /// # Errors
    ///
    /// Assembly errors, and errors the dispatcher does not report itself.
    pub fn run(self) -> Result<ExitCode> {
        run_tree(&self.build()?)
    }
}

/// Dispatch the process arguments against `tree` with options from the
/// environment, writing to stdout and stderr.
///
/// # Errors
///
/// Errors the dispatcher does not report itself.
pub fn run_tree(tree: &CommandTree) -> Result<ExitCode> {
    let args: Vec<OsString> = env::args_os().skip(1).collect();
    let options = DispatchOptions::from_env();

    let stdout = io::stdout();
    let stderr = io::stderr();
    let status = Dispatcher::new(tree).with_options(options).dispatch(
        args,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )?;
    Ok(ExitCode::from(exit_status(status)))
}

/// Run one command as the whole program.
///
/// # Errors
///
/// See [`EntryPoint::run`].
pub fn dispatch_command(command: Command) -> Result<ExitCode> {
    let mut tree = CommandTree::new(program_name());
    tree.set_default_command(command, &[])?;
    run_tree(&tree)
}

/// Run several commands as sub-commands of the program.
///
/// # Errors
///
/// See [`EntryPoint::run`].
pub fn dispatch_commands<I>(commands: I) -> Result<ExitCode>
where
    I: IntoIterator<Item = Command>,
{
    commands
        .into_iter()
        .fold(EntryPoint::new(program_name()), EntryPoint::register)
        .run()
}

fn program_name() -> String {
    env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// The low byte of `status`, as a process exit keeps it.
fn exit_status(status: i32) -> u8 {
    u8::try_from(status & 0xff).unwrap_or(u8::MAX)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::Function;
    use crate::output::Output;
    use crate::tree::Node;

    fn cmd(name: &str) -> Command {
        Command::new(Function::new(name, "value", |call| {
            Ok(Output::text(call.str("value")?.to_string()))
        }))
    }

    #[test]
    fn test_empty_entry_point_fails() {
        let err = EntryPoint::new("tool").build().unwrap_err();
        assert!(matches!(err, AssemblyError::NoCommands { ref entry_point } if entry_point == "tool"));
        assert_eq!(err.to_string(), "no commands for entry point \"tool\"");
    }

    #[test]
    fn test_single_command_stays_a_sub_command() {
        let tree = EntryPoint::new("tool").register(cmd("echo")).build().unwrap();
        assert!(tree.root().default_command().is_none());

        let captured = Dispatcher::new(&tree).dispatch_captured(["echo", "hi"]).unwrap();
        assert_eq!(captured.out, "hi\n");
        assert_eq!(captured.status, 0);
    }

    #[test]
    fn test_exit_status_keeps_the_low_byte() {
        assert_eq!(exit_status(0), 0);
        assert_eq!(exit_status(3), 3);
        assert_eq!(exit_status(256), 0);
        assert_eq!(exit_status(258), 2);
        assert_eq!(exit_status(-1), 255);
    }

    #[test]
    fn test_several_commands_are_flat() {
        let tree = EntryPoint::new("tool")
            .about("Tools")
            .register(cmd("echo"))
            .register(cmd("shout"))
            .build()
            .unwrap();
        assert!(tree.root().default_command().is_none());
        assert!(matches!(tree.root().child("shout"), Some(Node::Command(_))));
        assert_eq!(tree.root().about(), Some("Tools"));
    }
}
