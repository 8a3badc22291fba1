//! The assembled command tree
//!
//! Groups hold commands and sub-groups in registration order, plus a
//! synthetic `help` leaf and an optional default command. Every command is
//! assembled once, when it is added; dispatch only reads the tree.

mod parser;

pub(crate) use parser::HELP_PATH;

use crate::command::Command;
use crate::error::AssemblyError;
use crate::overlay;
use crate::policy::{ArgumentSpec, NameMappingPolicy, derive_specs, resolve_policy};
use crate::signature::{Parameter, introspect};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Name of the synthetic help leaf present in every group.
pub const HELP_COMMAND: &str = "help";

/// A command with its derived argument specs.
#[derive(Debug)]
pub struct CommandNode {
    name: String,
    command: Command,
    parameters: Vec<Parameter>,
    specs: Vec<ArgumentSpec>,
    policy: NameMappingPolicy,
}

impl CommandNode {
    fn assemble(
        command: Command,
        tree_policy: Option<NameMappingPolicy>,
    ) -> Result<(Self, Option<String>), AssemblyError> {
        let name = command.cli_name();
        let function = command.callable().name().to_string();

        let parameters = introspect(command.callable())?;
        let explicit = command.explicit_policy().or(tree_policy);
        let (policy, warning) = resolve_policy(&function, &parameters, explicit)?;
        let specs = derive_specs(&function, &parameters, policy)?;
        let specs = overlay::apply(&function, specs, command.decls(), &parameters)?;

        debug!(
            command = %name,
            ?policy,
            arguments = specs.len(),
            "assembled command"
        );

        Ok((
            CommandNode {
                name,
                command,
                parameters,
                specs,
                policy,
            },
            warning,
        ))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    #[must_use]
    pub fn policy(&self) -> NameMappingPolicy {
        self.policy
    }

    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.command.callable().doc()
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.command.aliases().iter().map(String::as_str))
    }
}

/// A child of a group.
#[derive(Debug)]
pub enum Node {
    Command(CommandNode),
    Group(Group),
    /// The synthetic `help` leaf.
    Help,
}

impl Node {
    fn names(&self) -> Vec<&str> {
        match self {
            Node::Command(node) => node.names().collect(),
            Node::Group(group) => vec![group.name.as_str()],
            Node::Help => vec![HELP_COMMAND],
        }
    }
}

/// A named node containing commands and sub-groups.
#[derive(Debug)]
pub struct Group {
    name: String,
    about: Option<String>,
    children: Vec<Node>,
    default: Option<CommandNode>,
}

impl Group {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            children: vec![Node::Help],
            default: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    /// Children in registration order; the `help` leaf is among them.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    #[must_use]
    pub fn default_command(&self) -> Option<&CommandNode> {
        self.default.as_ref()
    }

    /// Look a child up by name or alias.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.names().contains(&name))
    }

    fn taken(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.children.iter_mut().find_map(|c| match c {
            Node::Group(g) if g.name == name => Some(g),
            _ => None,
        })
    }

    fn has_commands(&self) -> bool {
        self.default.is_some()
            || self.children.iter().any(|c| match c {
                Node::Command(_) => true,
                Node::Group(g) => g.has_commands(),
                Node::Help => false,
            })
    }
}

/// The whole command-line surface of a program.
#[derive(Debug)]
pub struct CommandTree {
    root: Group,
    version: Option<String>,
    policy: Option<NameMappingPolicy>,
    warnings: Vec<String>,
}

impl CommandTree {
    /// An empty tree; `prog` names the program in usage and help output.
    pub fn new(prog: impl Into<String>) -> Self {
        Self {
            root: Group::new(prog),
            version: None,
            policy: None,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.root.about = Some(about.into());
        self
    }

    /// Enable `--version` on the root.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Tree-wide name mapping policy; commands may still override it.
    #[must_use]
    pub fn with_policy(mut self, policy: NameMappingPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use]
    pub fn prog(&self) -> &str {
        &self.root.name
    }

    #[must_use]
    pub fn root(&self) -> &Group {
        &self.root
    }

    #[must_use]
    pub fn version_string(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Non-fatal notices collected while assembling, such as legacy policy
    /// fallbacks.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// True when nothing can be dispatched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.root.has_commands()
    }

    /// Add commands to the group at `group_path`, creating groups as needed.
    /// An empty path adds to the root.
    ///
    /// # Errors
    ///
    /// Fails on the first command that cannot be assembled or whose name or
    /// alias is already taken in the group. The batch is checked as a whole:
    /// on error nothing is added and no warnings are recorded.
    pub fn add<I>(&mut self, commands: I, group_path: &[&str]) -> Result<(), AssemblyError>
    where
        I: IntoIterator<Item = Command>,
    {
        let label = self.group_label(group_path);
        let tree_policy = self.policy;

        let mut nodes = Vec::new();
        let mut warnings = Vec::new();
        for command in commands {
            let (node, warning) = CommandNode::assemble(command, tree_policy)?;
            warnings.extend(warning);
            nodes.push(node);
        }

        let mut batch: HashSet<String> = HashSet::new();
        for node in &nodes {
            if let Some(name) = node.names().find(|n| !batch.insert((*n).to_string())) {
                return Err(AssemblyError::DuplicateCommand {
                    name: name.to_string(),
                    group: label,
                });
            }
        }

        let group = self.group_at(group_path)?;
        if let Some(name) = nodes.iter().flat_map(CommandNode::names).find(|n| group.taken(n)) {
            return Err(AssemblyError::DuplicateCommand {
                name: name.to_string(),
                group: label,
            });
        }
        for node in nodes {
            debug!(command = %node.name, group = %label, "registered command");
            group.children.push(Node::Command(node));
        }

        self.record(warnings);
        Ok(())
    }

    /// Shorthand for adding one command to the root.
    ///
    /// # Errors
    ///
    /// See [`CommandTree::add`].
    pub fn add_command(&mut self, command: Command) -> Result<(), AssemblyError> {
        self.add([command], &[])
    }

    /// Run `command` when the group at `group_path` is invoked without a
    /// sub-command.
    ///
    /// # Errors
    ///
    /// Fails when the command cannot be assembled or the group already has
    /// a default command.
    pub fn set_default_command(
        &mut self,
        command: Command,
        group_path: &[&str],
    ) -> Result<(), AssemblyError> {
        let label = self.group_label(group_path);
        let tree_policy = self.policy;
        let group = self.group_at(group_path)?;

        if let Some(existing) = &group.default {
            return Err(AssemblyError::ConflictingDefaultCommand {
                group: label,
                existing: existing.name.clone(),
                new: command.cli_name(),
            });
        }

        let (node, warning) = CommandNode::assemble(command, tree_policy)?;
        debug!(command = %node.name, group = %label, "registered default command");
        group.default = Some(node);
        self.record(warning);
        Ok(())
    }

    /// Set the help text of the group at `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Fails when a command already uses one of the path's names.
    pub fn describe_group(&mut self, path: &[&str], about: &str) -> Result<(), AssemblyError> {
        let group = self.group_at(path)?;
        group.about = Some(about.to_string());
        Ok(())
    }

    fn record(&mut self, warnings: impl IntoIterator<Item = String>) {
        for warning in warnings {
            warn!("{warning}");
            self.warnings.push(warning);
        }
    }

    fn group_label(&self, path: &[&str]) -> String {
        if path.is_empty() {
            format!("group \"{}\"", self.root.name)
        } else {
            format!("group \"{}\"", path.join(" "))
        }
    }

    fn group_at(&mut self, path: &[&str]) -> Result<&mut Group, AssemblyError> {
        let mut group = &mut self.root;
        let mut walked: Vec<&str> = Vec::new();

        for &segment in path {
            let parent_label = if walked.is_empty() {
                format!("group \"{}\"", group.name)
            } else {
                format!("group \"{}\"", walked.join(" "))
            };
            walked.push(segment);

            if group.group_mut(segment).is_none() {
                if group.taken(segment) {
                    return Err(AssemblyError::DuplicateCommand {
                        name: segment.to_string(),
                        group: parent_label,
                    });
                }
                group.children.push(Node::Group(Group::new(segment)));
                debug!(group = segment, "created group");
            }
            group = group
                .group_mut(segment)
                .ok_or_else(|| AssemblyError::DuplicateCommand {
                    name: segment.to_string(),
                    group: parent_label,
                })?;
        }
        Ok(group)
    }
}
