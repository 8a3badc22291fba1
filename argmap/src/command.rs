//! Callables and the commands built from them

use crate::call::CallArgs;
use crate::output::Output;
use crate::overlay::ArgDecl;
use crate::policy::NameMappingPolicy;
use crate::signature::Signature;
use std::fmt;

/// Something that can be exposed as a command.
///
/// Rust has no runtime reflection, so a callable carries its own signature.
/// Wrappers report the callable they wrap through [`Callable::wrapped`] and
/// become transparent to introspection.
pub trait Callable {
    fn name(&self) -> &str;

    /// `None` for callables whose parameters cannot be described.
    fn signature(&self) -> Option<&Signature>;

    fn doc(&self) -> Option<&str> {
        None
    }

    fn wrapped(&self) -> Option<&dyn Callable> {
        None
    }

    /// Run the body with bound arguments.
    ///
    /// # Errors
    ///
    /// Whatever the body fails with; see [`crate::CommandError`] for
    /// failures meant for the user.
    fn call(&self, args: CallArgs) -> anyhow::Result<Output>;
}

type Body = Box<dyn Fn(CallArgs) -> anyhow::Result<Output>>;
type Around = Box<dyn Fn(&dyn Callable, CallArgs) -> anyhow::Result<Output>>;

/// A named closure with a declared signature.
pub struct Function {
    name: String,
    signature: Option<Signature>,
    doc: Option<String>,
    body: Body,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, signature: impl Into<Signature>, body: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<Output> + 'static,
    {
        Self {
            name: name.into(),
            signature: Some(signature.into()),
            doc: None,
            body: Box::new(body),
        }
    }

    /// A function whose parameters are unknown; it cannot be assembled.
    pub fn opaque<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<Output> + 'static,
    {
        Self {
            name: name.into(),
            signature: None,
            doc: None,
            body: Box::new(body),
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl Callable for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn call(&self, args: CallArgs) -> anyhow::Result<Output> {
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A signature-preserving wrapper around another callable.
///
/// Name and doc are taken from the wrapped callable. The `around` closure
/// receives the inner callable and decides how to call it.
pub struct Wrapper {
    inner: Box<dyn Callable>,
    around: Around,
}

impl Wrapper {
    pub fn new<C, F>(inner: C, around: F) -> Self
    where
        C: Callable + 'static,
        F: Fn(&dyn Callable, CallArgs) -> anyhow::Result<Output> + 'static,
    {
        Self {
            inner: Box::new(inner),
            around: Box::new(around),
        }
    }
}

impl Callable for Wrapper {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn signature(&self) -> Option<&Signature> {
        None
    }

    fn doc(&self) -> Option<&str> {
        self.inner.doc()
    }

    fn wrapped(&self) -> Option<&dyn Callable> {
        Some(self.inner.as_ref())
    }

    fn call(&self, args: CallArgs) -> anyhow::Result<Output> {
        (self.around)(self.inner.as_ref(), args)
    }
}

/// Matches errors of one type registered with [`Command::wrap_errors`].
#[derive(Clone, Copy)]
pub(crate) struct ErrorMatcher {
    pub(crate) type_name: &'static str,
    pub(crate) matches: fn(&anyhow::Error) -> bool,
}

impl fmt::Debug for ErrorMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Last path segment of a type name, generics removed.
fn short_type_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

type Processor = Box<dyn Fn(&anyhow::Error) -> String>;

/// A callable plus everything that shapes how it appears on the command line.
pub struct Command {
    callable: Box<dyn Callable>,
    name: Option<String>,
    aliases: Vec<String>,
    decls: Vec<ArgDecl>,
    policy: Option<NameMappingPolicy>,
    wrapped_errors: Vec<ErrorMatcher>,
    processor: Option<Processor>,
}

impl Command {
    pub fn new(callable: impl Callable + 'static) -> Self {
        Self {
            callable: Box::new(callable),
            name: None,
            aliases: Vec::new(),
            decls: Vec::new(),
            policy: None,
            wrapped_errors: Vec::new(),
            processor: None,
        }
    }

    /// Use this name verbatim instead of the callable's.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn arg(mut self, decl: ArgDecl) -> Self {
        self.decls.push(decl);
        self
    }

    /// Override the tree-wide name mapping policy for this command.
    #[must_use]
    pub fn policy(mut self, policy: NameMappingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Report errors of type `E` like domain errors: `Type: message`, status 1.
    #[must_use]
    pub fn wrap_errors<E>(mut self) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.wrapped_errors.push(ErrorMatcher {
            type_name: short_type_name::<E>(),
            matches: |err| err.chain().any(|cause| cause.is::<E>()),
        });
        self
    }

    /// Format domain and wrapped errors with `processor` instead.
    #[must_use]
    pub fn error_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(&anyhow::Error) -> String + 'static,
    {
        self.processor = Some(Box::new(processor));
        self
    }

    /// The name on the command line: explicit, or the callable's with
    /// underscores turned into hyphens.
    #[must_use]
    pub fn cli_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.callable.name().replace('_', "-"))
    }

    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[must_use]
    pub fn callable(&self) -> &dyn Callable {
        self.callable.as_ref()
    }

    pub(crate) fn decls(&self) -> &[ArgDecl] {
        &self.decls
    }

    pub(crate) fn explicit_policy(&self) -> Option<NameMappingPolicy> {
        self.policy
    }

    /// The name of the registered type `err` belongs to, if any.
    pub(crate) fn wrapped_error_name(&self, err: &anyhow::Error) -> Option<&'static str> {
        self.wrapped_errors
            .iter()
            .find(|m| (m.matches)(err))
            .map(|m| m.type_name)
    }

    pub(crate) fn process_error(&self, err: &anyhow::Error) -> Option<String> {
        self.processor.as_ref().map(|p| p(err))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.cli_name())
            .field("aliases", &self.aliases)
            .field("decls", &self.decls)
            .field("policy", &self.policy)
            .field("wrapped_errors", &self.wrapped_errors)
            .finish_non_exhaustive()
    }
}
