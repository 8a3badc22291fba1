//! Assembling command trees: introspection, declarations and naming rules

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use argmap::tree::Node;
use argmap::{
    ArgDecl, Arity, AssemblyError, Command, CommandTree, Function, Output, ParamKind, Parameter,
    Signature, ValueType, Wrapper,
};
use common::*;

#[test]
fn test_duplicate_names_in_one_group_fail() {
    let mut tree = CommandTree::new("app");
    tree.add([echo("get", "key")], &["db"]).unwrap();

    let err = tree.add([echo("get", "key")], &["db"]).unwrap_err();
    assert!(matches!(err, AssemblyError::DuplicateCommand { ref name, .. } if name == "get"));
    assert_eq!(err.to_string(), "command name \"get\" is already taken in group \"db\"");
}

#[test]
fn test_same_name_in_different_groups_succeeds() {
    let mut tree = CommandTree::new("app");
    tree.add([echo("get", "key")], &["db"]).unwrap();
    tree.add([echo("get", "key")], &["cache"]).unwrap();
    tree.add([echo("get", "key")], &[]).unwrap();

    assert_eq!(run(&tree, &["cache", "get", "k"]).out, "k\n");
}

#[test]
fn test_alias_clash_is_a_duplicate() {
    let mut tree = CommandTree::new("app");
    tree.add([echo("greet", "name").alias("hi")], &[]).unwrap();
    let err = tree.add([echo("hi", "name")], &[]).unwrap_err();
    assert!(matches!(err, AssemblyError::DuplicateCommand { ref name, .. } if name == "hi"));
}

#[test]
fn test_help_name_is_reserved() {
    let mut tree = CommandTree::new("app");
    let err = tree.add([echo("help", "")], &[]).unwrap_err();
    assert!(matches!(err, AssemblyError::DuplicateCommand { .. }));
}

#[test]
fn test_group_and_command_names_clash() {
    let mut tree = CommandTree::new("app");
    tree.add([echo("db", "")], &[]).unwrap();
    let err = tree.add([echo("get", "key")], &["db"]).unwrap_err();
    assert!(matches!(err, AssemblyError::DuplicateCommand { ref name, .. } if name == "db"));
}

#[test]
fn test_second_default_command_conflicts() {
    let mut tree = CommandTree::new("app");
    tree.set_default_command(echo("main", ""), &[]).unwrap();
    let err = tree.set_default_command(echo("other", ""), &[]).unwrap_err();
    assert!(matches!(err, AssemblyError::ConflictingDefaultCommand { .. }));
}

#[test]
fn test_registration_order_is_kept() {
    let mut tree = CommandTree::new("app");
    tree.add([echo("zeta", ""), echo("alpha", "")], &[]).unwrap();
    tree.add([echo("get", "key")], &["db"]).unwrap();
    tree.add([echo("beta", "")], &[]).unwrap();

    let names: Vec<&str> = tree
        .root()
        .children()
        .iter()
        .filter_map(|child| match child {
            Node::Command(node) => Some(node.name()),
            Node::Group(group) => Some(group.name()),
            Node::Help => None,
        })
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "db", "beta"]);
}

#[test]
fn test_opaque_callable_cannot_be_assembled() {
    let mut tree = CommandTree::new("app");
    let opaque = Command::new(Function::opaque("mystery", |_| Ok(Output::Empty)));
    let err = tree.add([opaque], &[]).unwrap_err();
    assert_eq!(err.to_string(), "mystery: cannot introspect signature: signature is not available");
}

#[test]
fn test_malformed_signature_is_reported() {
    let mut tree = CommandTree::new("app");
    let err = tree.add([echo("f", "a, a")], &[]).unwrap_err();
    assert!(matches!(err, AssemblyError::Introspection { ref command, .. } if command == "f"));

    let err = tree.add([echo("g", "a b")], &[]).unwrap_err();
    assert!(matches!(err, AssemblyError::Introspection { .. }));
}

#[test]
fn test_wrapper_is_transparent_to_introspection() {
    let inner = Function::new("greet", "name, *, loud=False", |call| {
        Ok(Output::text(call.str("name")?.to_string()))
    })
    .with_doc("Say hello");
    let wrapped = Wrapper::new(inner, |inner, call| {
        let output = inner.call(call)?;
        match output {
            Output::Text(text) => Ok(Output::text(format!("[{text}]"))),
            other => Ok(other),
        }
    });

    let tree = tree_with(vec![Command::new(wrapped)]);
    let Some(Node::Command(node)) = tree.root().child("greet") else {
        panic!("wrapped command missing");
    };
    assert_eq!(node.parameters().len(), 2);
    assert_eq!(node.doc(), Some("Say hello"));
    assert_eq!(run(&tree, &["greet", "bob", "-l"]).out, "[bob]\n");
}

#[test]
fn test_structured_signature() {
    let signature = Signature::new()
        .param(Parameter::positional("path"))
        .param(Parameter::keyword_only("depth").with_default(2).annotated(ValueType::Int));
    let tree = tree_with(vec![Command::new(Function::new("walk", signature, |call| {
        Ok(Output::text(format!("{} {}", call.str("path")?, call.int("depth")?)))
    }))]);

    assert_eq!(run(&tree, &["walk", "/tmp"]).out, "/tmp 2\n");
    assert_eq!(run(&tree, &["walk", "/tmp", "--depth", "5"]).out, "/tmp 5\n");

    let Some(Node::Command(node)) = tree.root().child("walk") else {
        panic!("command walk missing");
    };
    assert_eq!(node.parameters()[1].kind(), ParamKind::KeywordOnly);
}

#[test]
fn test_declaration_overrides_inferred_spec() {
    let tree = tree_with(vec![
        echo("fetch", "url, *, retries=3")
            .arg(ArgDecl::new(["-n", "--retries"]).help("how many times to retry"))
            .arg(ArgDecl::new(["url"]).arity(Arity::OneOrMore)),
    ]);
    let Some(Node::Command(node)) = tree.root().child("fetch") else {
        panic!("command fetch missing");
    };
    let retries = node.specs().iter().find(|s| s.dest == "retries").unwrap();
    assert_eq!(retries.flags, vec!["-n".to_string(), "--retries".to_string()]);
    assert_eq!(retries.value_type, Some(ValueType::Int));
    assert_eq!(retries.help.as_deref(), Some("how many times to retry"));

    assert_eq!(run(&tree, &["fetch", "a", "b", "-n", "1"]).out, "[a, b] retries=1\n");
}

#[test]
fn test_declaration_for_unknown_parameter_fails() {
    let mut tree = CommandTree::new("app");
    let err = tree
        .add([echo("f", "a, *, b=1").arg(ArgDecl::new(["--nope"]))], &[])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "f: argument --nope does not fit function signature: a, -b/--b"
    );
}

#[test]
fn test_declaration_kind_mismatch_fails() {
    let mut tree = CommandTree::new("app");
    let err = tree
        .add([echo("f", "a").arg(ArgDecl::new(["--a"]))], &[])
        .unwrap_err();
    assert!(err.to_string().contains(
        "argument \"a\" declared as positional (in function signature) and optional (via declaration)"
    ));
}

#[test]
fn test_clashing_option_strings_fail() {
    let mut tree = CommandTree::new("app");
    let err = tree
        .add(
            [echo("f", "*, alpha=1, beta=2").arg(ArgDecl::new(["-a", "--beta"]))],
            &[],
        )
        .unwrap_err();
    assert!(matches!(err, AssemblyError::ConflictingDeclaration { .. }));
}

#[test]
fn test_help_parameter_is_rejected() {
    let mut tree = CommandTree::new("app");
    let err = tree.add([echo("f", "*, help=False")], &[]).unwrap_err();
    assert!(err.to_string().contains("clashes with the built-in help"));
}

#[test]
fn test_explicit_name_is_used_verbatim() {
    let tree = tree_with(vec![echo("list_items", "").named("ls")]);
    assert!(tree.root().child("ls").is_some());
    assert!(tree.root().child("list-items").is_none());
}

#[test]
fn test_manifest_lists_groups_and_arguments() {
    let mut tree = CommandTree::new("app").about("Example");
    tree.add([echo("greet", "name, *, loud=False")], &[]).unwrap();
    tree.add([echo("get", "key")], &["db"]).unwrap();
    tree.describe_group(&["db"], "Storage").unwrap();

    let manifest = tree.manifest();
    assert_eq!(manifest.root.description.as_deref(), Some("Example"));
    assert_eq!(manifest.root.groups[0].description.as_deref(), Some("Storage"));

    let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
    assert_eq!(json["commands"][0]["name"], "greet");
    assert_eq!(json["commands"][0]["arguments"][1]["kind"], "flag");
    assert_eq!(json["groups"][0]["commands"][0]["arguments"][0]["kind"], "positional");
}
