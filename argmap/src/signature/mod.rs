//! Signature model and introspection
//!
//! A callable declares its parameters either structurally or as a textual
//! signature. [`introspect`] resolves either form into a validated list of
//! [`Parameter`] descriptors.

mod error;
mod parse;

pub use error::SignatureError;
pub use parse::{parse_signature, parse_type_hint};

use crate::command::Callable;
use crate::error::AssemblyError;
use crate::value::{Value, ValueType};
use serde::Serialize;
use std::collections::HashSet;

/// How a parameter receives its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Positional,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParamKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ParamKind::Positional => "positional",
            ParamKind::VarPositional => "variadic positional",
            ParamKind::KeywordOnly => "keyword-only",
            ParamKind::VarKeyword => "variadic keyword",
        }
    }

    #[must_use]
    pub fn is_variadic(self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

/// A type annotation, as far as it can be turned into parsing behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeHint {
    Scalar(ValueType),
    /// A homogeneous list; the element type when it is a known scalar.
    List(Option<ValueType>),
    Choice(Vec<String>),
    Optional(Box<TypeHint>),
    /// Anything else; no inference is drawn from it.
    Opaque(String),
}

impl TypeHint {
    /// Wrap in `Optional` unless already optional.
    #[must_use]
    pub fn optional(self) -> TypeHint {
        match self {
            TypeHint::Optional(_) => self,
            other => TypeHint::Optional(Box::new(other)),
        }
    }

    /// The hint with any `Optional` layer removed.
    #[must_use]
    pub fn inner(&self) -> &TypeHint {
        match self {
            TypeHint::Optional(inner) => inner.inner(),
            other => other,
        }
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeHint::Optional(_))
    }
}

/// An annotation as declared: already structured, or a type expression
/// that is parsed when the signature is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Hint(TypeHint),
    Expr(String),
}

impl From<TypeHint> for Annotation {
    fn from(hint: TypeHint) -> Self {
        Annotation::Hint(hint)
    }
}

impl From<ValueType> for Annotation {
    fn from(t: ValueType) -> Self {
        Annotation::Hint(TypeHint::Scalar(t))
    }
}

impl From<&str> for Annotation {
    fn from(expr: &str) -> Self {
        Annotation::Expr(expr.to_string())
    }
}

/// One parameter of a callable's signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
    annotation: Option<Annotation>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            annotation: None,
        }
    }

    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Positional)
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VarPositional)
    }

    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::KeywordOnly)
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VarKeyword)
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// The resolved type hint. Unparsed expressions yield `None`.
    #[must_use]
    pub fn hint(&self) -> Option<&TypeHint> {
        match &self.annotation {
            Some(Annotation::Hint(hint)) => Some(hint),
            _ => None,
        }
    }

    fn resolve_annotation(mut self) -> Result<Self, SignatureError> {
        if let Some(Annotation::Expr(expr)) = &self.annotation {
            let hint = parse_type_hint(expr).map_err(|e| {
                SignatureError::semantic(format!(
                    "parameter `{}`: bad annotation `{expr}`: {}",
                    self.name, e.message
                ))
            })?;
            self.annotation = Some(Annotation::Hint(hint));
        }
        Ok(self)
    }

    /// Rendered the way it would be written in a textual signature.
    #[must_use]
    pub fn display(&self) -> String {
        let mut out = match self.kind {
            ParamKind::VarPositional => format!("*{}", self.name),
            ParamKind::VarKeyword => format!("**{}", self.name),
            _ => self.name.clone(),
        };
        if let Some(default) = &self.default {
            match default {
                Value::Str(s) => out.push_str(&format!("='{s}'")),
                other => out.push_str(&format!("={other}")),
            }
        }
        out
    }
}

/// A declared signature.
#[derive(Debug, Clone, PartialEq)]
pub enum Signature {
    Params(Vec<Parameter>),
    Text(String),
}

impl Signature {
    /// An empty structured signature, to be extended with [`Signature::param`].
    #[must_use]
    pub fn new() -> Self {
        Signature::Params(Vec::new())
    }

    /// A textual signature such as `"a, b=1, *, verbose=False"`.
    pub fn parse(text: impl Into<String>) -> Self {
        Signature::Text(text.into())
    }

    /// Append a parameter. A textual signature is parsed first; if it does
    /// not parse, the error surfaces when the signature is resolved.
    #[must_use]
    pub fn param(self, param: Parameter) -> Self {
        match self {
            Signature::Params(mut params) => {
                params.push(param);
                Signature::Params(params)
            }
            Signature::Text(text) => match parse_signature(&text) {
                Ok(mut params) => {
                    params.push(param);
                    Signature::Params(params)
                }
                Err(_) => Signature::Text(text),
            },
        }
    }

    /// Parse, resolve annotations and validate.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] for syntax errors and for parameter
    /// lists no function could have.
    pub fn resolve(&self) -> Result<Vec<Parameter>, SignatureError> {
        let params = match self {
            Signature::Params(params) => params.clone(),
            Signature::Text(text) => parse_signature(text)?,
        };
        let params = params
            .into_iter()
            .map(Parameter::resolve_annotation)
            .collect::<Result<Vec<_>, _>>()?;
        validate(&params)?;
        Ok(params)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature::new()
    }
}

impl From<&str> for Signature {
    fn from(text: &str) -> Self {
        Signature::parse(text)
    }
}

impl From<Vec<Parameter>> for Signature {
    fn from(params: Vec<Parameter>) -> Self {
        Signature::Params(params)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate(params: &[Parameter]) -> Result<(), SignatureError> {
    let mut seen = HashSet::new();
    let mut previous = ParamKind::Positional;
    let mut var_positional = 0;
    let mut var_keyword = 0;
    let mut defaulted_positional: Option<&str> = None;

    for param in params {
        if !is_identifier(&param.name) {
            return Err(SignatureError::semantic(format!(
                "invalid parameter name `{}`",
                param.name
            )));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(SignatureError::semantic(format!(
                "duplicate parameter `{}`",
                param.name
            )));
        }
        if param.kind < previous {
            return Err(SignatureError::semantic(format!(
                "{} parameter `{}` cannot follow a {} parameter",
                param.kind.label(),
                param.name,
                previous.label()
            )));
        }
        previous = param.kind;

        match param.kind {
            ParamKind::VarPositional => var_positional += 1,
            ParamKind::VarKeyword => var_keyword += 1,
            _ => {}
        }
        if var_positional > 1 || var_keyword > 1 {
            return Err(SignatureError::semantic(format!(
                "more than one {} parameter",
                param.kind.label()
            )));
        }
        if param.kind.is_variadic() && param.has_default() {
            return Err(SignatureError::semantic(format!(
                "{} parameter `{}` cannot have a default",
                param.kind.label(),
                param.name
            )));
        }
        if param.kind == ParamKind::Positional {
            match (param.has_default(), defaulted_positional) {
                (true, None) => defaulted_positional = Some(param.name.as_str()),
                (false, Some(earlier)) => {
                    return Err(SignatureError::semantic(format!(
                        "non-default parameter `{}` follows default parameter `{earlier}`",
                        param.name
                    )));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Normalized parameter list of a callable.
///
/// Wrappers that report an inner callable are followed to the innermost one,
/// whose signature is used.
///
/// # Errors
///
/// Returns [`AssemblyError::Introspection`] when the signature is opaque,
/// does not parse, or is not a valid parameter list.
pub fn introspect(callable: &dyn Callable) -> Result<Vec<Parameter>, AssemblyError> {
    let mut target = callable;
    while let Some(inner) = target.wrapped() {
        target = inner;
    }

    let Some(signature) = target.signature() else {
        return Err(AssemblyError::Introspection {
            command: callable.name().to_string(),
            reason: "signature is not available".to_string(),
        });
    };

    signature
        .resolve()
        .map_err(|e| AssemblyError::Introspection {
            command: callable.name().to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resolve_err(signature: Signature) -> String {
        signature.resolve().unwrap_err().message
    }

    #[test]
    fn test_structured_and_textual_agree() {
        let structured = Signature::new()
            .param(Parameter::positional("path"))
            .param(Parameter::var_positional("files").annotated(ValueType::Str))
            .param(Parameter::keyword_only("dry_run").with_default(false))
            .param(Parameter::var_keyword("extra"));
        let textual = Signature::parse("path, *files: str, dry_run=False, **extra");
        assert_eq!(structured.resolve().unwrap(), textual.resolve().unwrap());
    }

    #[test]
    fn test_expression_annotations_are_resolved() {
        let params = Signature::new()
            .param(Parameter::positional("ids").annotated("list[int]"))
            .resolve()
            .unwrap();
        assert_eq!(params[0].hint(), Some(&TypeHint::List(Some(ValueType::Int))));

        let err = resolve_err(Signature::new().param(Parameter::positional("x").annotated("list[")));
        assert!(err.contains("bad annotation"), "{err}");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        assert!(resolve_err(Signature::parse("a, a")).contains("duplicate parameter `a`"));
    }

    #[test]
    fn test_kind_order_enforced() {
        let sig = Signature::new()
            .param(Parameter::keyword_only("k"))
            .param(Parameter::positional("p"));
        assert!(resolve_err(sig).contains("cannot follow"));
        assert!(resolve_err(Signature::parse("**kw, *args")).contains("cannot follow"));
    }

    #[test]
    fn test_single_variadic_of_each_kind() {
        let sig = Signature::new()
            .param(Parameter::var_positional("a"))
            .param(Parameter::var_positional("b"));
        assert!(resolve_err(sig).contains("more than one"));
        assert!(resolve_err(Signature::parse("*a, *b")).contains("more than one"));
    }

    #[test]
    fn test_variadic_default_rejected() {
        let sig = Signature::new().param(Parameter::var_positional("rest").with_default(1));
        assert!(resolve_err(sig).contains("cannot have a default"));
    }

    #[test]
    fn test_non_default_after_default_rejected() {
        assert!(resolve_err(Signature::parse("a=1, b")).contains("non-default parameter `b`"));
        // Keyword-only parameters are exempt.
        assert!(Signature::parse("a=1, *, b").resolve().is_ok());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let sig = Signature::new().param(Parameter::positional("two words"));
        assert!(resolve_err(sig).contains("invalid parameter name"));
    }

    #[test]
    fn test_display() {
        let params = Signature::parse("a, b='x', *rest, c=3, **kw").resolve().unwrap();
        let shown: Vec<String> = params.iter().map(Parameter::display).collect();
        assert_eq!(shown, vec!["a", "b='x'", "*rest", "c=3", "**kw"]);
    }

    #[test]
    fn test_optional_is_idempotent() {
        let hint = TypeHint::Scalar(ValueType::Int).optional().optional();
        assert_eq!(hint, TypeHint::Optional(Box::new(TypeHint::Scalar(ValueType::Int))));
        assert_eq!(hint.inner(), &TypeHint::Scalar(ValueType::Int));
    }
}
