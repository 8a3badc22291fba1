//! Machine-readable description of a command tree
//!
//! `CommandTree::manifest` walks the assembled tree and produces plain
//! serializable structs, so tooling can inspect a program's command-line
//! surface without parsing help text.

use crate::policy::{Arity, ArgumentSpec, NameMappingPolicy};
use crate::tree::{CommandNode, CommandTree, Group, Node};
use crate::value::{Value, ValueType};
use serde::Serialize;

/// One argument of a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentManifest {
    pub name: String,
    /// `positional`, `option` or `flag`.
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    pub arity: Arity,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// One command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandManifest {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub policy: NameMappingPolicy,
    pub arguments: Vec<ArgumentManifest>,
}

/// A group with its commands and sub-groups, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupManifest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_command: Option<CommandManifest>,
    pub commands: Vec<CommandManifest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupManifest>,
}

/// Root structure of the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub root: GroupManifest,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Manifest {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails only if serialization does, which plain data does not.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&ArgumentSpec> for ArgumentManifest {
    fn from(spec: &ArgumentSpec) -> Self {
        let kind = if spec.positional {
            "positional"
        } else if spec.is_flag {
            "flag"
        } else {
            "option"
        };
        Self {
            name: spec.dest.clone(),
            kind,
            flags: spec.flags.clone(),
            arity: spec.arity,
            value_type: spec.value_type,
            required: spec.required,
            default: spec.default.clone(),
            choices: spec.choices.clone(),
            help: spec.help.clone(),
        }
    }
}

impl From<&CommandNode> for CommandManifest {
    fn from(node: &CommandNode) -> Self {
        Self {
            name: node.name().to_string(),
            aliases: node.command().aliases().to_vec(),
            description: node.doc().map(str::to_string),
            policy: node.policy(),
            arguments: node.specs().iter().map(ArgumentManifest::from).collect(),
        }
    }
}

impl From<&Group> for GroupManifest {
    fn from(group: &Group) -> Self {
        let mut commands = Vec::new();
        let mut groups = Vec::new();
        for child in group.children() {
            match child {
                Node::Command(node) => commands.push(CommandManifest::from(node)),
                Node::Group(sub) => groups.push(GroupManifest::from(sub)),
                Node::Help => {}
            }
        }
        Self {
            name: group.name().to_string(),
            description: group.about().map(str::to_string),
            default_command: group.default_command().map(CommandManifest::from),
            commands,
            groups,
        }
    }
}

impl CommandTree {
    /// Describe every command, group and argument of the tree.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        Manifest {
            version: self.version_string().map(str::to_string),
            root: GroupManifest::from(self.root()),
            warnings: self.warnings().to_vec(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::{Command, Function};
    use crate::output::Output;

    fn tree() -> CommandTree {
        let mut tree = CommandTree::new("app").version("1.0");
        tree.add(
            [Command::new(
                Function::new("greet", "name, *, loud=False, times: int = 1", |_| Ok(Output::Empty))
                    .with_doc("Say hello"),
            )
            .alias("hi")],
            &[],
        )
        .unwrap();
        tree.add(
            [Command::new(Function::new("get", "key", |_| Ok(Output::Empty)))],
            &["db"],
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_manifest_structure() {
        let manifest = tree().manifest();
        assert_eq!(manifest.root.name, "app");
        assert_eq!(manifest.version.as_deref(), Some("1.0"));
        assert_eq!(manifest.root.commands.len(), 1);
        assert_eq!(manifest.root.groups[0].name, "db");
        assert_eq!(manifest.root.groups[0].commands[0].name, "get");

        let greet = &manifest.root.commands[0];
        assert_eq!(greet.aliases, vec!["hi".to_string()]);
        assert_eq!(greet.description.as_deref(), Some("Say hello"));
        let kinds: Vec<_> = greet.arguments.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec!["positional", "flag", "option"]);
    }

    #[test]
    fn test_manifest_json() {
        let json = tree().manifest().to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["name"], "app");
        assert_eq!(parsed["version"], "1.0");
        let times = &parsed["commands"][0]["arguments"][2];
        assert_eq!(times["name"], "times");
        assert_eq!(times["type"], "int");
        assert_eq!(times["default"], 1);
        assert_eq!(times["flags"][0], "-t");
        assert_eq!(times["arity"], "exactly_one");
        assert_eq!(times["required"], false);
        assert!(parsed.get("warnings").is_none());
    }
}
