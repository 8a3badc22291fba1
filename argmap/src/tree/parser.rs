//! Building the clap parser from an assembled tree

use super::{CommandNode, CommandTree, Group, HELP_COMMAND, Node};
use crate::policy::{Arity, ArgumentSpec};
use crate::value::{Value, ValueType};
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Arg, ArgAction, ColorChoice};

/// Id of the path argument of the `help` leaf.
pub(crate) const HELP_PATH: &str = "command";

impl CommandTree {
    /// The clap command for this tree.
    #[must_use]
    pub fn build_parser(&self) -> clap::Command {
        let mut cmd = build_group(&self.root)
            .color(ColorChoice::Never)
            .bin_name(self.root.name.clone());

        if let Some(version) = &self.version {
            let taken = self.root.default.as_ref().is_some_and(|node| {
                node.specs.iter().any(|s| {
                    s.dest == "version" || s.flags.iter().any(|f| f == "--version" || f == "-V")
                })
            });
            if !taken {
                cmd = cmd.version(version.clone());
            }
        }
        cmd
    }
}

fn with_doc(cmd: clap::Command, doc: Option<&str>) -> clap::Command {
    let Some(doc) = doc.map(str::trim).filter(|d| !d.is_empty()) else {
        return cmd;
    };
    let summary = doc.lines().next().unwrap_or(doc).to_string();
    if summary == doc {
        cmd.about(summary)
    } else {
        cmd.about(summary).long_about(doc.to_string())
    }
}

fn build_group(group: &Group) -> clap::Command {
    let mut cmd = clap::Command::new(group.name.clone()).disable_help_subcommand(true);

    let doc = group
        .about
        .as_deref()
        .or_else(|| group.default.as_ref().and_then(CommandNode::doc));
    cmd = with_doc(cmd, doc);

    if let Some(default) = &group.default {
        cmd = cmd
            .args(default.specs.iter().map(build_arg))
            .args_conflicts_with_subcommands(true)
            .subcommand_negates_reqs(true);
    }

    for child in &group.children {
        match child {
            Node::Command(node) => cmd = cmd.subcommand(build_leaf(node)),
            Node::Group(sub) => cmd = cmd.subcommand(build_group(sub)),
            Node::Help => {}
        }
    }
    cmd.subcommand(help_leaf())
}

fn build_leaf(node: &CommandNode) -> clap::Command {
    let cmd = clap::Command::new(node.name.clone())
        .visible_aliases(node.command.aliases().to_vec())
        .args(node.specs.iter().map(build_arg));
    with_doc(cmd, node.doc())
}

fn help_leaf() -> clap::Command {
    clap::Command::new(HELP_COMMAND)
        .about("Print help for a command")
        .arg(
            Arg::new(HELP_PATH)
                .value_name("COMMAND")
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Help text plus the default, if there is one worth showing.
fn help_text(spec: &ArgumentSpec) -> Option<String> {
    let default = match &spec.default {
        Some(Value::None) | None => None,
        Some(value) => Some(format!("[default: {value}]")),
    };
    match (&spec.help, default) {
        (Some(help), Some(default)) => Some(format!("{help} {default}")),
        (Some(help), None) => Some(help.clone()),
        (None, default) => default,
    }
}

fn build_arg(spec: &ArgumentSpec) -> Arg {
    let mut arg = Arg::new(spec.dest.clone());
    if let Some(help) = help_text(spec) {
        arg = arg.help(help);
    }

    if spec.positional {
        arg = arg.value_name(spec.cli_name.clone());
    } else {
        let mut longs = spec.flags.iter().filter_map(|f| f.strip_prefix("--"));
        let mut shorts = spec
            .flags
            .iter()
            .filter(|f| !f.starts_with("--"))
            .filter_map(|f| f.strip_prefix('-'))
            .filter_map(|s| s.chars().next());
        if let Some(long) = longs.next() {
            arg = arg.long(long.to_string());
        }
        for alias in longs {
            arg = arg.visible_alias(alias.to_string());
        }
        if let Some(short) = shorts.next() {
            arg = arg.short(short);
        }
        for alias in shorts {
            arg = arg.visible_short_alias(alias);
        }
        if !spec.is_flag {
            arg = arg.value_name(spec.dest.to_uppercase());
        }
    }

    if spec.is_flag {
        let action = if spec.default == Some(Value::Bool(true)) {
            ArgAction::SetFalse
        } else {
            ArgAction::SetTrue
        };
        return arg.action(action);
    }

    arg = match spec.arity {
        Arity::ExactlyOne => arg.num_args(1).action(ArgAction::Set),
        Arity::OptionalOne if spec.positional => arg.num_args(1).action(ArgAction::Set),
        Arity::OptionalOne => arg.num_args(0..=1).action(ArgAction::Set),
        Arity::ZeroOrMore => arg.num_args(0..).action(ArgAction::Append),
        Arity::OneOrMore => arg.num_args(1..).action(ArgAction::Append),
    };
    let required = spec.required && spec.arity != Arity::ZeroOrMore;
    arg = arg.required(required);

    let value_type = spec.value_type.unwrap_or(ValueType::Str);
    if matches!(value_type, ValueType::Int | ValueType::Float) {
        arg = arg.allow_negative_numbers(true);
    }

    match &spec.choices {
        Some(choices) => arg.value_parser(
            PossibleValuesParser::new(choices.clone())
                .try_map(move |raw: String| value_type.coerce(&raw)),
        ),
        None => arg.value_parser(move |raw: &str| value_type.coerce(raw)),
    }
}
