//! # argmap
//!
//! Turn plain functions into command-line commands. A command's parameters
//! are read from its signature and mapped onto a clap parser: positional
//! parameters become positional arguments, keyword-only parameters become
//! options, booleans become flags. Parsed input is bound back into a call
//! and whatever the command returns is written to the output stream.
//!
//! ## Usage
//!
//! ```
//! use argmap::{Command, CommandTree, Dispatcher, Function, Output};
//!
//! let greet = Function::new("greet", "name, *, greeting='Hello'", |call| {
//!     Ok(Output::text(format!("{}, {}!", call.str("greeting")?, call.str("name")?)))
//! });
//!
//! let mut tree = CommandTree::new("app");
//! tree.add_command(Command::new(greet))?;
//!
//! let captured = Dispatcher::new(&tree).dispatch_captured(["greet", "world", "-g", "Hi"])?;
//! assert_eq!(captured.out, "Hi, world!\n");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Groups, aliases, explicit argument declarations and error wrapping are
//! configured on [`Command`] and [`CommandTree`]; see [`EntryPoint`] for
//! running a tree as a program.

pub mod call;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod interaction;
pub mod manifest;
pub mod output;
pub mod overlay;
pub mod policy;
pub mod signature;
pub mod tree;
pub mod value;

pub use call::CallArgs;
pub use command::{Callable, Command, Function, Wrapper};
pub use config::{DispatchOptions, EncodingErrors, OutputEncoding};
pub use dispatch::{Captured, Dispatcher, dispatch};
pub use entry::{EntryPoint, dispatch_command, dispatch_commands, run_tree};
pub use error::{AssemblyError, CommandError, EXIT_FAILURE, EXIT_USAGE};
pub use interaction::{confirm, confirm_with};
pub use manifest::Manifest;
pub use output::{LineStream, Output};
pub use overlay::ArgDecl;
pub use policy::{ArgumentSpec, Arity, NameMappingPolicy};
pub use signature::{ParamKind, Parameter, Signature, SignatureError, TypeHint};
pub use tree::CommandTree;
pub use value::{Value, ValueType};
