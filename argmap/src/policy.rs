//! Mapping parameters onto command-line arguments
//!
//! The decision table that turns a parameter list into argument specs:
//! which parameters become positionals and which become options, with what
//! arity, value type and flag behavior.

use crate::error::AssemblyError;
use crate::signature::{ParamKind, Parameter, TypeHint};
use crate::value::{Value, ValueType};
use serde::Serialize;
use std::collections::HashMap;

/// How parameters are split between positionals and options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMappingPolicy {
    /// Keyword-only parameters become options; everything else stays
    /// positional, defaulted positionals becoming optional positionals.
    #[default]
    ByNameIfKwonly,
    /// Legacy: any parameter with a default becomes an option, every other
    /// parameter (keyword-only ones included) a required positional.
    ByNameIfHasDefault,
}

/// How many values an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    ExactlyOne,
    OptionalOne,
    ZeroOrMore,
    OneOrMore,
}

impl Arity {
    #[must_use]
    pub fn is_multiple(self) -> bool {
        matches!(self, Arity::ZeroOrMore | Arity::OneOrMore)
    }

    /// The arity that also accepts no value at all.
    #[must_use]
    pub fn relaxed(self) -> Arity {
        match self {
            Arity::ExactlyOne | Arity::OptionalOne => Arity::OptionalOne,
            Arity::ZeroOrMore | Arity::OneOrMore => Arity::ZeroOrMore,
        }
    }
}

/// Where an argument spec came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecSource {
    Parameter(ParamKind),
    Overlay,
}

/// One command-line argument of a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentSpec {
    /// Parameter (or keyword) name the parsed value is bound to.
    pub dest: String,
    /// Display name: the value name of a positional, the long name of an option.
    pub cli_name: String,
    /// Option strings such as `-v`, `--verbose`; empty for positionals.
    pub flags: Vec<String>,
    pub positional: bool,
    pub arity: Arity,
    pub value_type: Option<ValueType>,
    pub is_flag: bool,
    pub required: bool,
    pub default: Option<Value>,
    pub choices: Option<Vec<String>>,
    pub help: Option<String>,
    pub source: SpecSource,
}

impl ArgumentSpec {
    /// A bare spec; the overlay and the policy fill in the rest.
    pub fn new(dest: impl Into<String>, positional: bool, source: SpecSource) -> Self {
        let dest = dest.into();
        Self {
            cli_name: if positional { dest.clone() } else { dest.replace('_', "-") },
            dest,
            flags: Vec::new(),
            positional,
            arity: Arity::ExactlyOne,
            value_type: None,
            is_flag: false,
            required: true,
            default: None,
            choices: None,
            help: None,
            source,
        }
    }

    /// The first long option string, or the first short one.
    #[must_use]
    pub fn long_flag(&self) -> Option<&str> {
        self.flags
            .iter()
            .find(|f| f.starts_with("--"))
            .or_else(|| self.flags.first())
            .map(String::as_str)
    }

    /// `flags` joined with `/`, or the value name for positionals.
    #[must_use]
    pub fn label(&self) -> String {
        if self.positional {
            self.cli_name.clone()
        } else {
            self.flags.join("/")
        }
    }
}

/// Decide the policy for one command.
///
/// An explicit policy is used as is. Otherwise: defaulted positionals plus
/// keyword-only parameters are ambiguous; defaulted positionals alone fall
/// back to the legacy policy with a warning; anything else maps by
/// keyword-only-ness.
///
/// # Errors
///
/// Returns [`AssemblyError::AmbiguousMapping`] for the ambiguous case.
pub fn resolve_policy(
    command: &str,
    params: &[Parameter],
    explicit: Option<NameMappingPolicy>,
) -> Result<(NameMappingPolicy, Option<String>), AssemblyError> {
    if let Some(policy) = explicit {
        return Ok((policy, None));
    }

    let defaulted = params
        .iter()
        .find(|p| p.kind() == ParamKind::Positional && p.has_default());
    let has_kwonly = params.iter().any(|p| p.kind() == ParamKind::KeywordOnly);

    match (defaulted, has_kwonly) {
        (Some(_), true) => Err(AssemblyError::AmbiguousMapping {
            command: command.to_string(),
        }),
        (Some(param), false) => {
            let warning = format!(
                "{command}: positional parameter `{}` has a default value and is mapped \
                 to an option by the legacy name mapping policy; make it keyword-only \
                 or choose a policy explicitly",
                param.name()
            );
            Ok((NameMappingPolicy::ByNameIfHasDefault, Some(warning)))
        }
        (None, _) => Ok((NameMappingPolicy::ByNameIfKwonly, None)),
    }
}

fn maps_to_option(policy: NameMappingPolicy, param: &Parameter) -> bool {
    match (policy, param.kind()) {
        (_, ParamKind::VarPositional | ParamKind::VarKeyword) => false,
        (NameMappingPolicy::ByNameIfKwonly, kind) => kind == ParamKind::KeywordOnly,
        (NameMappingPolicy::ByNameIfHasDefault, _) => param.has_default(),
    }
}

/// Derive one spec per parameter; the variadic positional comes last and
/// the variadic keyword parameter gets none.
///
/// # Errors
///
/// Returns [`AssemblyError::ConflictingDeclaration`] for a parameter named
/// `help`.
pub fn derive_specs(
    command: &str,
    params: &[Parameter],
    policy: NameMappingPolicy,
) -> Result<Vec<ArgumentSpec>, AssemblyError> {
    let mut first_letters: HashMap<char, usize> = HashMap::new();
    for param in params.iter().filter(|p| maps_to_option(policy, p)) {
        if let Some(c) = param.name().chars().next() {
            *first_letters.entry(c).or_default() += 1;
        }
    }

    let mut specs = Vec::new();
    let mut variadic = None;

    for param in params {
        if param.kind() == ParamKind::VarKeyword {
            continue;
        }
        if param.name() == "help" {
            return Err(AssemblyError::ConflictingDeclaration {
                command: command.to_string(),
                message: "parameter \"help\" clashes with the built-in help".to_string(),
            });
        }
        if param.kind() == ParamKind::VarPositional {
            variadic = Some(variadic_spec(param));
            continue;
        }

        let spec = if maps_to_option(policy, param) {
            option_spec(param, &first_letters)
        } else {
            positional_spec(param)
        };
        specs.push(spec);
    }

    specs.extend(variadic);
    Ok(specs)
}

fn option_spec(param: &Parameter, first_letters: &HashMap<char, usize>) -> ArgumentSpec {
    let mut spec = ArgumentSpec::new(param.name(), false, SpecSource::Parameter(param.kind()));

    let long = format!("--{}", spec.cli_name);
    spec.flags = match param.name().chars().next() {
        Some(c) if c != 'h' && first_letters.get(&c).copied().unwrap_or_default() < 2 => {
            vec![format!("-{c}"), long]
        }
        _ => vec![long],
    };

    spec.required = !param.has_default();
    if let Some(default) = param.default() {
        if let Value::Bool(_) = default {
            spec.is_flag = true;
        } else {
            infer_from_default(&mut spec, default);
        }
        spec.default = Some(default.clone());
    }

    apply_hint(&mut spec, param);
    spec
}

fn positional_spec(param: &Parameter) -> ArgumentSpec {
    let mut spec = ArgumentSpec::new(param.name(), true, SpecSource::Parameter(param.kind()));

    if let Some(default) = param.default() {
        infer_from_default(&mut spec, default);
        spec.default = Some(default.clone());
        spec.required = false;
        spec.arity = spec.arity.relaxed();
    }

    apply_hint(&mut spec, param);
    spec
}

fn variadic_spec(param: &Parameter) -> ArgumentSpec {
    let mut spec = ArgumentSpec::new(param.name(), true, SpecSource::Parameter(param.kind()));
    spec.arity = Arity::ZeroOrMore;
    spec.required = false;

    match param.hint().map(TypeHint::inner) {
        Some(TypeHint::Scalar(t)) => spec.value_type = Some(*t),
        Some(TypeHint::List(element)) => spec.value_type = *element,
        Some(TypeHint::Choice(choices)) => spec.choices = Some(choices.clone()),
        _ => {}
    }
    spec
}

fn infer_from_default(spec: &mut ArgumentSpec, default: &Value) {
    match default {
        Value::List(items) => {
            spec.arity = Arity::ZeroOrMore;
            spec.value_type = items.first().and_then(ValueType::of);
        }
        other => spec.value_type = ValueType::of(other),
    }
}

/// Annotations take precedence over what the default suggested.
fn apply_hint(spec: &mut ArgumentSpec, param: &Parameter) {
    let Some(hint) = param.hint() else {
        return;
    };

    match hint.inner() {
        TypeHint::Scalar(t) => {
            spec.value_type = Some(*t);
            if *t != ValueType::Bool {
                spec.is_flag = false;
            }
        }
        TypeHint::List(element) => {
            spec.is_flag = false;
            spec.arity = if matches!(param.default(), Some(Value::List(_))) {
                Arity::ZeroOrMore
            } else {
                Arity::OneOrMore
            };
            if element.is_some() {
                spec.value_type = *element;
            }
        }
        TypeHint::Choice(choices) => spec.choices = Some(choices.clone()),
        TypeHint::Optional(_) | TypeHint::Opaque(_) => {}
    }

    if hint.is_optional() {
        spec.required = false;
        if spec.positional {
            spec.arity = spec.arity.relaxed();
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::signature::Signature;

    fn params(text: &str) -> Vec<Parameter> {
        Signature::parse(text).resolve().unwrap()
    }

    fn specs(text: &str, policy: NameMappingPolicy) -> Vec<ArgumentSpec> {
        derive_specs("cmd", &params(text), policy).unwrap()
    }

    fn find<'a>(specs: &'a [ArgumentSpec], dest: &str) -> &'a ArgumentSpec {
        specs.iter().find(|s| s.dest == dest).unwrap()
    }

    #[test]
    fn test_resolve_unspecified_policy() {
        let err = resolve_policy("cmd", &params("a, b=1, *, c=2"), None).unwrap_err();
        assert!(matches!(err, AssemblyError::AmbiguousMapping { .. }));

        let (policy, warning) = resolve_policy("cmd", &params("a, b=1"), None).unwrap();
        assert_eq!(policy, NameMappingPolicy::ByNameIfHasDefault);
        assert!(warning.unwrap().contains("`b`"));

        let (policy, warning) = resolve_policy("cmd", &params("a, *, c=2"), None).unwrap();
        assert_eq!(policy, NameMappingPolicy::ByNameIfKwonly);
        assert!(warning.is_none());
    }

    #[test]
    fn test_explicit_policy_wins() {
        let (policy, warning) = resolve_policy(
            "cmd",
            &params("a, b=1, *, c=2"),
            Some(NameMappingPolicy::ByNameIfKwonly),
        )
        .unwrap();
        assert_eq!(policy, NameMappingPolicy::ByNameIfKwonly);
        assert!(warning.is_none());
    }

    #[test]
    fn test_kwonly_policy_keeps_defaults_positional() {
        let specs = specs("a, b=1, *, c=2", NameMappingPolicy::ByNameIfKwonly);
        let b = find(&specs, "b");
        assert!(b.positional);
        assert_eq!(b.arity, Arity::OptionalOne);
        assert_eq!(b.value_type, Some(ValueType::Int));
        assert!(!b.required);

        let c = find(&specs, "c");
        assert!(!c.positional);
        assert_eq!(c.flags, vec!["-c", "--c"]);
        assert!(!c.required);
    }

    #[test]
    fn test_legacy_policy_maps_by_default() {
        let specs = specs("a, b=1, *, c", NameMappingPolicy::ByNameIfHasDefault);
        assert!(find(&specs, "a").positional);
        assert!(!find(&specs, "b").positional);
        let c = find(&specs, "c");
        assert!(c.positional);
        assert!(c.required);
    }

    #[test]
    fn test_short_flags_dropped_on_conflict_and_for_h() {
        let specs = specs(
            "*, verbose=False, version='1', host='x', port=80",
            NameMappingPolicy::ByNameIfKwonly,
        );
        assert_eq!(find(&specs, "verbose").flags, vec!["--verbose"]);
        assert_eq!(find(&specs, "version").flags, vec!["--version"]);
        assert_eq!(find(&specs, "host").flags, vec!["--host"]);
        assert_eq!(find(&specs, "port").flags, vec!["-p", "--port"]);
    }

    #[test]
    fn test_underscores_become_hyphens_in_flags() {
        let specs = specs("*, dry_run=False", NameMappingPolicy::ByNameIfKwonly);
        let spec = find(&specs, "dry_run");
        assert_eq!(spec.flags, vec!["-d", "--dry-run"]);
        assert_eq!(spec.cli_name, "dry-run");
    }

    #[test]
    fn test_bool_defaults_become_flags() {
        let specs = specs("*, quiet=False, color=True", NameMappingPolicy::ByNameIfKwonly);
        assert!(find(&specs, "quiet").is_flag);
        assert!(find(&specs, "color").is_flag);
    }

    #[test]
    fn test_variadic_goes_last() {
        let specs = specs("first, *rest: int, flag=False", NameMappingPolicy::ByNameIfKwonly);
        let last = specs.last().unwrap();
        assert_eq!(last.dest, "rest");
        assert_eq!(last.arity, Arity::ZeroOrMore);
        assert_eq!(last.value_type, Some(ValueType::Int));
    }

    #[test]
    fn test_var_keyword_has_no_spec() {
        let specs = specs("a, **extra", NameMappingPolicy::ByNameIfKwonly);
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn test_list_default_and_hint() {
        let specs = specs(
            "*, tags=['a'], ids: list[int], names: list[str] = []",
            NameMappingPolicy::ByNameIfKwonly,
        );
        let tags = find(&specs, "tags");
        assert_eq!(tags.arity, Arity::ZeroOrMore);
        assert_eq!(tags.value_type, Some(ValueType::Str));

        let ids = find(&specs, "ids");
        assert_eq!(ids.arity, Arity::OneOrMore);
        assert_eq!(ids.value_type, Some(ValueType::Int));
        assert!(ids.required);

        assert_eq!(find(&specs, "names").arity, Arity::ZeroOrMore);
    }

    #[test]
    fn test_optional_hint_relaxes() {
        let specs = specs(
            "path: str | None, items: Optional[list[int]], *, limit: int | None",
            NameMappingPolicy::ByNameIfKwonly,
        );
        let path = find(&specs, "path");
        assert_eq!(path.arity, Arity::OptionalOne);
        assert!(!path.required);

        assert_eq!(find(&specs, "items").arity, Arity::ZeroOrMore);

        let limit = find(&specs, "limit");
        assert!(!limit.required);
        assert_eq!(limit.value_type, Some(ValueType::Int));
    }

    #[test]
    fn test_scalar_hint_cancels_flag() {
        let specs = specs("*, level: int = False", NameMappingPolicy::ByNameIfKwonly);
        let level = find(&specs, "level");
        assert!(!level.is_flag);
        assert_eq!(level.value_type, Some(ValueType::Int));
    }

    #[test]
    fn test_choice_hint() {
        let specs = specs("mode: Literal['fast', 'slow']", NameMappingPolicy::ByNameIfKwonly);
        assert_eq!(
            find(&specs, "mode").choices,
            Some(vec!["fast".to_string(), "slow".to_string()])
        );
    }

    #[test]
    fn test_opaque_hint_infers_nothing() {
        let specs = specs("*, opts: dict = 'x'", NameMappingPolicy::ByNameIfKwonly);
        assert_eq!(find(&specs, "opts").value_type, Some(ValueType::Str));
    }

    #[test]
    fn test_help_option_rejected() {
        let err = derive_specs(
            "cmd",
            &params("*, help=False"),
            NameMappingPolicy::ByNameIfKwonly,
        )
        .unwrap_err();
        assert!(matches!(err, AssemblyError::ConflictingDeclaration { .. }));
        assert!(derive_specs("cmd", &params("help"), NameMappingPolicy::ByNameIfKwonly).is_err());
    }
}
