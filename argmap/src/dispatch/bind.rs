//! Turning parsed matches into call arguments

use crate::call::CallArgs;
use crate::policy::{Arity, ArgumentSpec, SpecSource};
use crate::signature::ParamKind;
use crate::tree::CommandNode;
use crate::value::Value;
use clap::ArgMatches;
use clap::parser::ValueSource;
use std::collections::HashMap;

/// A required argument that has no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingArgument(pub String);

fn given(matches: &ArgMatches, spec: &ArgumentSpec) -> bool {
    matches!(matches.value_source(&spec.dest), Some(ValueSource::CommandLine))
}

/// The value for one spec: parsed, else its default.
fn extract(matches: &ArgMatches, spec: &ArgumentSpec) -> Result<Value, MissingArgument> {
    if spec.is_flag {
        let parsed = matches.try_get_one::<bool>(&spec.dest).ok().flatten();
        return Ok(match (parsed, &spec.default) {
            (Some(b), _) => Value::Bool(*b),
            (None, Some(default)) => default.clone(),
            (None, None) => Value::Bool(false),
        });
    }

    if spec.arity.is_multiple() {
        if let Ok(Some(values)) = matches.try_get_many::<Value>(&spec.dest) {
            return Ok(Value::List(values.cloned().collect()));
        }
        if given(matches, spec) {
            return Ok(Value::List(Vec::new()));
        }
    } else {
        if let Ok(Some(value)) = matches.try_get_one::<Value>(&spec.dest) {
            return Ok(value.clone());
        }
        if given(matches, spec) {
            return Ok(Value::None);
        }
    }

    match &spec.default {
        Some(default) => Ok(default.clone()),
        None if spec.required && spec.arity != Arity::ZeroOrMore => {
            Err(MissingArgument(spec.label()))
        }
        None if spec.arity.is_multiple() => Ok(Value::List(Vec::new())),
        None => Ok(Value::None),
    }
}

/// Bind parsed values by parameter kind.
///
/// Positional parameters are passed positionally even when they were
/// mapped to options, the variadic positional extends the positional list,
/// keyword-only parameters go by name and the variadic keyword parameter
/// receives every overlay-only argument.
///
/// # Errors
///
/// Returns the first required argument that has no value. clap reports
/// these itself, so this only guards matches built some other way.
pub fn bind(node: &CommandNode, matches: &ArgMatches) -> Result<CallArgs, MissingArgument> {
    let mut values: HashMap<&str, Value> = HashMap::new();
    for spec in node.specs() {
        values.insert(spec.dest.as_str(), extract(matches, spec)?);
    }

    let names = node
        .parameters()
        .iter()
        .filter(|p| p.kind() == ParamKind::Positional)
        .map(|p| p.name().to_string())
        .collect();
    let mut call = CallArgs::new(names);

    for param in node.parameters() {
        match param.kind() {
            ParamKind::Positional => {
                call.push(values.remove(param.name()).unwrap_or_default());
            }
            ParamKind::VarPositional => match values.remove(param.name()) {
                Some(Value::List(items)) => call.extend(items),
                Some(other) => call.push(other),
                None => {}
            },
            ParamKind::KeywordOnly => {
                let value = values.remove(param.name()).unwrap_or_default();
                call.insert(param.name(), value);
            }
            ParamKind::VarKeyword => {
                for spec in node.specs().iter().filter(|s| s.source == SpecSource::Overlay) {
                    if let Some(value) = values.remove(spec.dest.as_str()) {
                        call.insert(spec.dest.clone(), value);
                    }
                }
            }
        }
    }
    Ok(call)
}
