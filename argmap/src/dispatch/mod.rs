//! Parsing a command line and running the command it names
//!
//! One dispatch goes parse → resolve → bind → invoke → render. Usage errors
//! end it early with status 2; domain errors raised by the command are
//! reported on the error stream with their own status; anything else is
//! handed back to the caller after whatever output was already written.

mod bind;
mod render;

pub use bind::MissingArgument;
pub use render::{SafeWriter, encode};

use crate::config::DispatchOptions;
use crate::error::{CommandError, EXIT_FAILURE, EXIT_USAGE};
use crate::output::Output;
use crate::tree::{CommandNode, CommandTree, HELP_PATH, Node};
use anyhow::{Result, anyhow};
use clap::ArgMatches;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use std::ffi::OsString;
use std::io::Write;
use tracing::debug;

/// Output, error text and exit status of a dispatch into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub out: String,
    pub err: String,
    pub status: i32,
}

/// Runs command lines against an assembled tree.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'t> {
    tree: &'t CommandTree,
    options: DispatchOptions,
}

impl<'t> Dispatcher<'t> {
    #[must_use]
    pub fn new(tree: &'t CommandTree) -> Self {
        Self {
            tree,
            options: DispatchOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Dispatch `argv` (without the program name) and return the exit status.
    ///
    /// # Errors
    ///
    /// Returns errors raised by the command that are neither a
    /// [`CommandError`] nor of a type registered with `wrap_errors`, and I/O
    /// errors from the streams. Output written before the error stays written.
    pub fn dispatch<I, T>(&self, argv: I, out: &mut dyn Write, err: &mut dyn Write) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut out = SafeWriter::new(out, self.options.encoding, self.options.encoding_errors);
        let mut err = SafeWriter::new(err, self.options.encoding, self.options.encoding_errors);

        let mut parser = self.tree.build_parser();
        let args: Vec<OsString> = std::iter::once(OsString::from(self.tree.prog()))
            .chain(argv.into_iter().map(Into::into))
            .collect();

        let matches = match self.parse(&mut parser, args) {
            Ok(matches) => matches,
            Err(e) => {
                let text = e.render().to_string();
                if e.use_stderr() {
                    err.write_text(&text)?;
                    err.flush()?;
                    return Ok(EXIT_USAGE);
                }
                out.write_text(&text)?;
                out.flush()?;
                return Ok(0);
            }
        };

        let mut group = self.tree.root();
        let mut path: Vec<String> = Vec::new();
        let mut current = &matches;

        loop {
            let Some((name, sub)) = current.subcommand() else {
                if let Some(node) = group.default_command() {
                    return self.run(node, current, &mut out, &mut err);
                }
                parser.build();
                let usage = find_path(&mut parser, &path)
                    .map(|cmd| cmd.render_usage().to_string())
                    .unwrap_or_default();
                out.write_line(&usage)?;
                out.flush()?;
                return Ok(0);
            };

            match group.child(name) {
                Some(Node::Group(sub_group)) => {
                    path.push(name.to_string());
                    group = sub_group;
                    current = sub;
                }
                Some(Node::Command(node)) => return self.run(node, sub, &mut out, &mut err),
                Some(Node::Help) => return show_help(&mut parser, path, sub, &mut out, &mut err),
                None => return Err(anyhow!("parser produced unknown command `{name}`")),
            }
        }
    }

    /// Dispatch into memory.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`]; captured output is dropped on error.
    pub fn dispatch_captured<I, T>(&self, argv: I) -> Result<Captured>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let status = self.dispatch(argv, &mut out, &mut err)?;
        Ok(Captured {
            out: String::from_utf8_lossy(&out).into_owned(),
            err: String::from_utf8_lossy(&err).into_owned(),
            status,
        })
    }

    /// Parse `args`; with `skip_unknown_args`, unrecognised arguments are
    /// dropped one at a time and the parse retried. Every other error,
    /// including invalid values, is returned as is.
    fn parse(
        &self,
        parser: &mut clap::Command,
        mut args: Vec<OsString>,
    ) -> Result<ArgMatches, clap::Error> {
        let mut from = 1;
        loop {
            let e = match parser.try_get_matches_from_mut(args.clone()) {
                Ok(matches) => return Ok(matches),
                Err(e) => e,
            };
            if !self.options.skip_unknown_args || e.kind() != ErrorKind::UnknownArgument {
                return Err(e);
            }
            let Some(ContextValue::String(unknown)) = e.get(ContextKind::InvalidArg) else {
                return Err(e);
            };
            let Some(index) = unknown_position(&args, unknown, from) else {
                return Err(e);
            };
            debug!(argument = %unknown, "skipping unknown argument");
            args.remove(index);
            from = index;
        }
    }

    fn run(
        &self,
        node: &CommandNode,
        matches: &ArgMatches,
        out: &mut SafeWriter<'_>,
        err: &mut SafeWriter<'_>,
    ) -> Result<i32> {
        let call = match bind::bind(node, matches) {
            Ok(call) => call,
            Err(MissingArgument(name)) => {
                err.write_line(&format!(
                    "error: the following required arguments were not provided: {name}"
                ))?;
                err.flush()?;
                return Ok(EXIT_USAGE);
            }
        };

        debug!(command = node.name(), "invoking command");
        let output = match node.command().callable().call(call) {
            Ok(output) => output,
            Err(e) => return report(node, e, err),
        };

        match output {
            Output::Empty => {}
            Output::Text(text) => self.emit(&text, out)?,
            Output::Lines(stream) => {
                for line in stream {
                    match line {
                        Ok(line) => self.emit(&line, out)?,
                        Err(e) => {
                            out.flush()?;
                            return report(node, e, err);
                        }
                    }
                }
            }
        }
        out.flush()?;
        Ok(0)
    }

    fn emit(&self, text: &str, out: &mut SafeWriter<'_>) -> Result<()> {
        if self.options.raw_output {
            out.write_text(text)?;
        } else {
            out.write_line(text)?;
        }
        if self.options.always_flush {
            out.flush()?;
        }
        Ok(())
    }
}

/// Domain and wrapped errors become a message and a status; anything else
/// goes back to the caller.
fn report(node: &CommandNode, e: anyhow::Error, err: &mut SafeWriter<'_>) -> Result<i32> {
    let command = node.command();

    let (message, status) =
        if let Some(domain) = e.chain().find_map(|c| c.downcast_ref::<CommandError>()) {
            let message = command
                .process_error(&e)
                .unwrap_or_else(|| domain.message().to_string());
            (message, domain.code())
        } else if let Some(type_name) = command.wrapped_error_name(&e) {
            let message = command
                .process_error(&e)
                .unwrap_or_else(|| format!("{type_name}: {e}"));
            (message, EXIT_FAILURE)
        } else {
            debug!(command = node.name(), error = %e, "propagating error");
            return Err(e);
        };

    debug!(command = node.name(), status, "command failed");
    err.write_line(&message)?;
    err.flush()?;
    Ok(status)
}

/// Index of the token clap reported as unknown, searching from `from` (the
/// last removal) first so an earlier, legitimate token with the same text is
/// kept. `--name=value` matches the reported `--name`.
fn unknown_position(args: &[OsString], unknown: &str, from: usize) -> Option<usize> {
    let is_unknown = |arg: &OsString| {
        arg.to_str().is_some_and(|arg| {
            arg == unknown
                || (unknown.starts_with("--")
                    && arg.strip_prefix(unknown).is_some_and(|rest| rest.starts_with('=')))
        })
    };
    let from = from.clamp(1, args.len());
    (from..args.len())
        .chain(1..from)
        .find(|&i| is_unknown(&args[i]))
}

fn find_path<'c>(parser: &'c mut clap::Command, path: &[String]) -> Option<&'c mut clap::Command> {
    let mut cmd = parser;
    for segment in path {
        cmd = cmd.find_subcommand_mut(segment)?;
    }
    Some(cmd)
}

/// `help [path...]`, relative to the group it was invoked in.
fn show_help(
    parser: &mut clap::Command,
    mut path: Vec<String>,
    matches: &ArgMatches,
    out: &mut SafeWriter<'_>,
    err: &mut SafeWriter<'_>,
) -> Result<i32> {
    let requested: Vec<String> = matches
        .try_get_many::<String>(HELP_PATH)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    path.extend(requested.iter().cloned());

    parser.build();
    let Some(cmd) = find_path(parser, &path) else {
        err.write_line(&format!("error: unknown command: {}", requested.join(" ")))?;
        err.flush()?;
        return Ok(EXIT_USAGE);
    };
    let help = cmd.render_help().to_string();
    out.write_text(&help)?;
    out.flush()?;
    Ok(0)
}

/// Dispatch with default options.
///
/// # Errors
///
/// See [`Dispatcher::dispatch`].
pub fn dispatch<I, T>(
    tree: &CommandTree,
    argv: I,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Dispatcher::new(tree).dispatch(argv, out, err)
}
