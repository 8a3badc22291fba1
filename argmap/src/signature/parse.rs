//! Textual signatures parsed with pest
//!
//! Turns `"path, *files: str, dry_run=False, **extra"` into parameter
//! descriptors and `"list[int] | None"` into a [`TypeHint`].

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use super::error::SignatureError;
use super::{ParamKind, Parameter, TypeHint};
use crate::value::{Value, ValueType};

#[derive(Parser)]
#[grammar = "signature/grammar.pest"]
pub struct SignatureParser;

/// Parse a comma-separated parameter list.
///
/// Kinds are assigned from position: parameters after `*name` or a bare `*`
/// are keyword-only. Ordering rules beyond that are checked by the caller.
///
/// # Errors
///
/// Returns a [`SignatureError`] for syntax errors, a bare `*` with no
/// keyword-only parameter after it, a second `*` (bare or `*name`), and
/// out-of-range numeric literals.
pub fn parse_signature(text: &str) -> Result<Vec<Parameter>, SignatureError> {
    let mut pairs = SignatureParser::parse(Rule::signature, text)
        .map_err(|e| SignatureError::from_pest(&e, text))?;
    let Some(root) = pairs.next() else {
        return Ok(Vec::new());
    };

    let mut params = Vec::new();
    let mut keyword_only = false;
    let mut pending_star = false;
    let mut star_seen = false;

    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::regular_param => {
                let kind = if keyword_only {
                    ParamKind::KeywordOnly
                } else {
                    ParamKind::Positional
                };
                pending_star = false;
                params.push(parse_regular(pair, kind)?);
            }
            Rule::var_positional => {
                check_bare_star(pending_star)?;
                check_single_star(star_seen)?;
                star_seen = true;
                keyword_only = true;
                params.push(parse_variadic(pair, ParamKind::VarPositional));
            }
            Rule::kwonly_marker => {
                check_bare_star(pending_star)?;
                check_single_star(star_seen)?;
                star_seen = true;
                keyword_only = true;
                pending_star = true;
            }
            Rule::var_keyword => {
                check_bare_star(pending_star)?;
                keyword_only = true;
                params.push(parse_variadic(pair, ParamKind::VarKeyword));
            }
            _ => {}
        }
    }
    check_bare_star(pending_star)?;

    Ok(params)
}

/// Parse a standalone type expression such as `Optional[int]`.
///
/// # Errors
///
/// Returns a [`SignatureError`] when the text is not a type expression.
pub fn parse_type_hint(text: &str) -> Result<TypeHint, SignatureError> {
    let mut pairs = SignatureParser::parse(Rule::type_hint, text)
        .map_err(|e| SignatureError::from_pest(&e, text))?;

    pairs
        .next()
        .and_then(|root| root.into_inner().find(|p| p.as_rule() == Rule::type_expr))
        .map(type_expr)
        .ok_or_else(|| SignatureError::semantic(format!("empty type expression `{text}`")))
}

fn check_bare_star(pending: bool) -> Result<(), SignatureError> {
    if pending {
        return Err(SignatureError::semantic(
            "named arguments must follow bare `*`",
        ));
    }
    Ok(())
}

fn check_single_star(seen: bool) -> Result<(), SignatureError> {
    if seen {
        return Err(SignatureError::semantic("`*` may appear only once"));
    }
    Ok(())
}

fn parse_regular(pair: Pair<Rule>, kind: ParamKind) -> Result<Parameter, SignatureError> {
    let mut name = String::new();
    let mut default = None;
    let mut hint = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => name = inner.as_str().to_string(),
            Rule::annotation => hint = inner.into_inner().next().map(type_expr),
            Rule::param_default => {
                if let Some(lit) = inner.into_inner().next() {
                    default = Some(literal(lit)?);
                }
            }
            _ => {}
        }
    }

    let mut param = Parameter::new(name, kind);
    param.default = default;
    param.annotation = hint.map(Into::into);
    Ok(param)
}

fn parse_variadic(pair: Pair<Rule>, kind: ParamKind) -> Parameter {
    let mut inner = pair.into_inner();
    let name = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
    let mut param = Parameter::new(name, kind);
    param.annotation = inner.next().and_then(|a| a.into_inner().next()).map(|t| type_expr(t).into());
    param
}

fn literal(pair: Pair<Rule>) -> Result<Value, SignatureError> {
    // `literal` wraps exactly one concrete alternative.
    let pair = if pair.as_rule() == Rule::literal {
        match pair.into_inner().next() {
            Some(inner) => inner,
            None => return Ok(Value::None),
        }
    } else {
        pair
    };

    match pair.as_rule() {
        Rule::list_literal => pair
            .into_inner()
            .map(literal)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Rule::string => Ok(Value::Str(string_content(pair))),
        Rule::integer => pair
            .as_str()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| SignatureError::semantic(format!("integer out of range: {}", pair.as_str()))),
        Rule::float => pair
            .as_str()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| SignatureError::semantic(format!("invalid float: {}", pair.as_str()))),
        Rule::boolean => Ok(Value::Bool(pair.as_str().eq_ignore_ascii_case("true"))),
        _ => Ok(Value::None),
    }
}

fn string_content(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|inner| inner.as_str().to_string())
        .unwrap_or_default()
}

fn scalar(name: &str) -> Option<ValueType> {
    match name {
        "str" | "String" | "string" => Some(ValueType::Str),
        "int" | "integer" => Some(ValueType::Int),
        "float" => Some(ValueType::Float),
        "bool" | "boolean" => Some(ValueType::Bool),
        _ => None,
    }
}

/// Strip a `typing.` style module prefix.
fn base_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Union: the first non-None member wins; a `None` member makes it optional.
fn type_expr(pair: Pair<Rule>) -> TypeHint {
    let mut members = Vec::new();
    let mut optional = false;

    for term in pair.into_inner() {
        match type_term(term) {
            Some(hint) => members.push(hint),
            None => optional = true,
        }
    }

    match members.into_iter().next() {
        Some(hint) if optional => hint.optional(),
        Some(hint) => hint,
        None => TypeHint::Opaque("None".to_string()),
    }
}

/// `None` for the `None` type itself.
fn type_term(pair: Pair<Rule>) -> Option<TypeHint> {
    let mut inner = pair.into_inner();
    let name = inner.next().map(|p| p.as_str()).unwrap_or_default();
    let args: Vec<Pair<Rule>> = inner
        .next()
        .map(|args| args.into_inner().collect())
        .unwrap_or_default();

    let hint = match base_name(name) {
        "None" | "NoneType" | "none" => return None,
        "list" | "List" | "Sequence" | "Vec" => {
            let element = args.into_iter().next().map(arg_hint);
            TypeHint::List(match element {
                Some(TypeHint::Scalar(t)) => Some(t),
                _ => None,
            })
        }
        "Optional" => match args.into_iter().next() {
            Some(arg) => arg_hint(arg).optional(),
            None => TypeHint::Opaque(name.to_string()),
        },
        "Literal" | "choice" | "Choice" => {
            TypeHint::Choice(args.into_iter().map(choice_text).collect())
        }
        other => match scalar(other) {
            Some(t) => TypeHint::Scalar(t),
            None => TypeHint::Opaque(name.to_string()),
        },
    };
    Some(hint)
}

fn arg_hint(pair: Pair<Rule>) -> TypeHint {
    match pair.as_rule() {
        Rule::type_expr => type_expr(pair),
        _ => TypeHint::Opaque(pair.as_str().to_string()),
    }
}

fn choice_text(pair: Pair<Rule>) -> String {
    match pair.as_rule() {
        Rule::string => string_content(pair),
        _ => pair.as_str().trim().to_string(),
    }
}
