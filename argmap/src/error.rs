//! Error types for assembling and running commands.

use thiserror::Error;

/// Exit status used when a domain error does not carry its own code.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for command-line usage errors.
pub const EXIT_USAGE: i32 = 2;

/// Configuration errors raised while a command tree is being assembled.
///
/// These are never defaulted away: the first one aborts assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The callable's signature could not be determined or is malformed.
    #[error("{command}: cannot introspect signature: {reason}")]
    Introspection { command: String, reason: String },

    /// Defaulted positional parameters together with keyword-only ones.
    #[error(
        "{command}: positional parameters with defaults and keyword-only parameters \
         cannot be mapped unambiguously; choose a name mapping policy explicitly"
    )]
    AmbiguousMapping { command: String },

    /// A declared argument has no counterpart in the signature.
    #[error("{command}: argument {argument} does not fit function signature: {signature}")]
    UnsupportedSignature {
        command: String,
        argument: String,
        signature: String,
    },

    /// A declaration contradicts the inferred argument or another declaration.
    #[error("{command}: {message}")]
    ConflictingDeclaration { command: String, message: String },

    /// Two children of one group share a name or alias.
    #[error("command name \"{name}\" is already taken in {group}")]
    DuplicateCommand { name: String, group: String },

    /// A group already has a default command.
    #[error("{group} already has default command \"{existing}\"; cannot also use \"{new}\"")]
    ConflictingDefaultCommand {
        group: String,
        existing: String,
        new: String,
    },

    /// Dispatch was requested for an entry point with nothing registered.
    #[error("no commands for entry point \"{entry_point}\"")]
    NoCommands { entry_point: String },
}

/// An expected, user-facing failure raised by a command.
///
/// The dispatcher prints the message without any backtrace and exits with
/// [`CommandError::code`].
///
/// ```
/// use argmap::CommandError;
///
/// let err = CommandError::new("missing key").with_code(3);
/// assert_eq!(err.code(), 3);
/// assert_eq!(err.to_string(), "missing key");
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CommandError {
    message: String,
    code: Option<i32>,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Exit status for this failure; [`EXIT_FAILURE`] unless overridden.
    #[must_use]
    pub fn code(&self) -> i32 {
        self.code.unwrap_or(EXIT_FAILURE)
    }
}
