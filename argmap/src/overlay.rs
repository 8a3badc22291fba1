//! Explicit argument declarations layered over inferred specs

use crate::error::AssemblyError;
use crate::policy::{Arity, ArgumentSpec, SpecSource};
use crate::signature::{ParamKind, Parameter};
use crate::value::{Value, ValueType};
use std::collections::HashMap;

/// An explicit declaration for one argument.
///
/// Names are either a single positional name (`"path"`) or option strings
/// (`"-v", "--verbosity"`). Every other field is optional and, when set,
/// overrides what was inferred from the signature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgDecl {
    names: Vec<String>,
    help: Option<String>,
    value_type: Option<ValueType>,
    choices: Option<Vec<String>>,
    arity: Option<Arity>,
    default: Option<Value>,
    required: Option<bool>,
}

impl ArgDecl {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..<Self as Default>::default()
        }
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    #[must_use]
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = Some(arity);
        self
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.names.first().is_some_and(|n| !n.starts_with('-'))
    }

    /// The parameter this declaration refers to.
    ///
    /// A positional name as is, otherwise the first long option (else the
    /// first short one) without dashes; hyphens become underscores.
    #[must_use]
    pub fn dest(&self) -> String {
        let name = if self.is_positional() {
            self.names.first()
        } else {
            self.names
                .iter()
                .find(|n| n.starts_with("--"))
                .or_else(|| self.names.first())
        };
        name.map(|n| n.trim_start_matches('-').replace('-', "_"))
            .unwrap_or_default()
    }

    fn check_names(&self, command: &str) -> Result<(), AssemblyError> {
        let conflict = |message: String| AssemblyError::ConflictingDeclaration {
            command: command.to_string(),
            message,
        };

        if self.names.is_empty() || self.names.iter().any(|n| n.trim_start_matches('-').is_empty()) {
            return Err(conflict(format!(
                "invalid argument names: {:?}",
                self.names
            )));
        }
        let options = self.names.iter().filter(|n| n.starts_with('-')).count();
        if options != 0 && options != self.names.len() {
            return Err(conflict(format!(
                "argument {} mixes positional and option names",
                self.names.join(", ")
            )));
        }
        if options == 0 && self.names.len() > 1 {
            return Err(conflict(format!(
                "positional argument has more than one name: {}",
                self.names.join(", ")
            )));
        }
        Ok(())
    }

    fn merge_into(&self, spec: &mut ArgumentSpec, command: &str) -> Result<(), AssemblyError> {
        let dest = spec.dest.clone();
        let conflict = |message: String| AssemblyError::ConflictingDeclaration {
            command: command.to_string(),
            message,
        };

        if self.is_positional() != spec.positional {
            let kind = |positional: bool| if positional { "positional" } else { "optional" };
            return Err(conflict(format!(
                "argument \"{dest}\" declared as {} (in function signature) and {} (via declaration)",
                kind(spec.positional),
                kind(self.is_positional())
            )));
        }

        if !spec.positional {
            spec.flags.clone_from(&self.names);
        }
        if let Some(help) = &self.help {
            spec.help = Some(help.clone());
        }
        if let Some(t) = self.value_type {
            spec.value_type = Some(t);
            if t != ValueType::Bool {
                spec.is_flag = false;
            }
        }
        if let Some(choices) = &self.choices {
            spec.choices = Some(choices.clone());
        }
        if let Some(arity) = self.arity {
            if spec.is_flag {
                return Err(conflict(format!(
                    "argument \"{dest}\" is a boolean flag and cannot take values"
                )));
            }
            spec.arity = arity;
        }
        if let Some(default) = &self.default {
            spec.default = Some(default.clone());
            spec.required = false;
            if spec.positional && spec.arity == Arity::ExactlyOne {
                spec.arity = Arity::OptionalOne;
            }
        }
        if let Some(required) = self.required {
            spec.required = required;
            if spec.positional && !required {
                spec.arity = spec.arity.relaxed();
            }
        }
        Ok(())
    }

    /// A spec made from this declaration alone.
    fn to_spec(&self) -> ArgumentSpec {
        let positional = self.is_positional();
        let mut spec = ArgumentSpec::new(self.dest(), positional, SpecSource::Overlay);
        if !positional {
            spec.flags.clone_from(&self.names);
        }
        spec.help.clone_from(&self.help);
        spec.choices.clone_from(&self.choices);
        spec.default.clone_from(&self.default);

        let flag_default = matches!(self.default, Some(Value::Bool(_)));
        spec.is_flag = !positional
            && flag_default
            && self.arity.is_none()
            && self.value_type.is_none_or(|t| t == ValueType::Bool);
        spec.value_type = self
            .value_type
            .or_else(|| self.default.as_ref().and_then(ValueType::of));
        spec.arity = self.arity.unwrap_or(Arity::ExactlyOne);
        spec.required = self.required.unwrap_or(self.default.is_none() && positional);
        if positional && !spec.required {
            spec.arity = spec.arity.relaxed();
        }
        spec
    }
}

/// Merge declarations into the inferred specs and check the result.
///
/// # Errors
///
/// Returns [`AssemblyError::UnsupportedSignature`] for a declaration with no
/// matching parameter when the signature has no variadic keyword parameter,
/// and [`AssemblyError::ConflictingDeclaration`] for contradicting
/// declarations, clashing option strings or an unparseable positional layout.
pub fn apply(
    command: &str,
    mut specs: Vec<ArgumentSpec>,
    decls: &[ArgDecl],
    params: &[Parameter],
) -> Result<Vec<ArgumentSpec>, AssemblyError> {
    let has_var_keyword = params.iter().any(|p| p.kind() == ParamKind::VarKeyword);

    for decl in decls {
        decl.check_names(command)?;
        let dest = decl.dest();

        if let Some(spec) = specs.iter_mut().find(|s| s.dest == dest) {
            decl.merge_into(spec, command)?;
        } else if has_var_keyword {
            specs.push(decl.to_spec());
        } else {
            let signature = specs
                .iter()
                .map(ArgumentSpec::label)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AssemblyError::UnsupportedSignature {
                command: command.to_string(),
                argument: decl.names().join(", "),
                signature,
            });
        }
    }

    // Overlay-only positionals go before the variadic one.
    specs.sort_by_key(|s| s.source == SpecSource::Parameter(ParamKind::VarPositional));

    check_option_strings(command, &specs)?;
    check_positional_layout(command, &specs)?;
    Ok(specs)
}

fn check_option_strings(command: &str, specs: &[ArgumentSpec]) -> Result<(), AssemblyError> {
    let mut owners: HashMap<&str, &str> = HashMap::from([("-h", "help"), ("--help", "help")]);

    for spec in specs {
        if spec.dest == "help" {
            return Err(AssemblyError::ConflictingDeclaration {
                command: command.to_string(),
                message: "argument \"help\" clashes with the built-in help".to_string(),
            });
        }
        for flag in &spec.flags {
            if !flag.starts_with("--") && flag.chars().count() != 2 {
                return Err(AssemblyError::ConflictingDeclaration {
                    command: command.to_string(),
                    message: format!("option string {flag} must be one dash and one character"),
                });
            }
            if let Some(owner) = owners.insert(flag.as_str(), spec.dest.as_str()) {
                return Err(AssemblyError::ConflictingDeclaration {
                    command: command.to_string(),
                    message: format!(
                        "option string {flag} is used by both \"{owner}\" and \"{}\"",
                        spec.dest
                    ),
                });
            }
        }
    }
    Ok(())
}

fn check_positional_layout(command: &str, specs: &[ArgumentSpec]) -> Result<(), AssemblyError> {
    let positionals: Vec<&ArgumentSpec> = specs.iter().filter(|s| s.positional).collect();
    let conflict = |message: String| AssemblyError::ConflictingDeclaration {
        command: command.to_string(),
        message,
    };

    let mut optional_seen: Option<&str> = None;
    for (i, spec) in positionals.iter().enumerate() {
        if spec.arity.is_multiple() && i + 1 != positionals.len() {
            return Err(conflict(format!(
                "positional argument \"{}\" takes multiple values and must be last",
                spec.dest
            )));
        }
        let takes_required = spec.required && spec.arity != Arity::ZeroOrMore;
        match optional_seen {
            Some(earlier) if takes_required => {
                return Err(conflict(format!(
                    "required positional argument \"{}\" follows optional \"{earlier}\"",
                    spec.dest
                )));
            }
            None if !takes_required => optional_seen = Some(spec.dest.as_str()),
            _ => {}
        }
    }
    Ok(())
}
