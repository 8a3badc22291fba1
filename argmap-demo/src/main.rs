//! # argmap-demo
//!
//! A small program assembled with argmap. It exercises the common shapes of
//! command: positionals with options, variadics, list options, streamed
//! output, domain errors, a command group and an interactive confirmation.
//!
//! Set `ARGMAP_LOG=debug` to see how commands are assembled and dispatched.

use anyhow::{Result, bail};
use argmap::{
    Command, CommandError, CommandTree, Function, Output, Value, Wrapper, confirm, run_tree,
};
use std::io;
use std::num::ParseIntError;
use std::process::ExitCode;
use tracing::debug;

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

const KEYS: [(&str, &str); 3] = [("alpha", "1"), ("beta", "2"), ("gamma", "3")];

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("ARGMAP_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn greet() -> Command {
    let body = Function::new("greet", "name, *, greeting='Hello', loud=False", |call| {
        let text = format!("{}, {}!", call.str("greeting")?, call.str("name")?);
        Ok(Output::text(if call.bool("loud")? { text.to_uppercase() } else { text }))
    })
    .with_doc("Greet someone by name");

    let traced = Wrapper::new(body, |inner, call| {
        debug!(command = inner.name(), "calling through wrapper");
        inner.call(call)
    });
    Command::new(traced).alias("hi")
}

fn sum() -> Command {
    Command::new(
        Function::new("sum", "*numbers: int", |call| {
            let total: i64 = call.rest().iter().filter_map(Value::as_int).sum();
            Ok(Output::text(total.to_string()))
        })
        .with_doc("Add integers"),
    )
}

fn count() -> Command {
    Command::new(
        Function::new("count", "limit: int, *, fail_at: Optional[int] = None", |call| {
            let limit = call.int("limit")?;
            let fail_at = call.get("fail_at").and_then(Value::as_int);
            Ok(Output::stream((1..=limit).map(move |n| {
                if Some(n) == fail_at {
                    return Err(CommandError::new(format!("stopped at {n}")).with_code(4).into());
                }
                Ok(n.to_string())
            })))
        })
        .with_doc("Count up to a limit, one line at a time"),
    )
}

fn tags() -> Command {
    Command::new(
        Function::new("tags", "*, tag: list[str] = []", |call| {
            Ok(Output::lines(call.list("tag")?.to_vec()))
        })
        .with_doc("Print each tag on its own line"),
    )
}

fn fail() -> Command {
    Command::new(
        Function::new("fail", "message, *, code: int = 3", |call| {
            let code = i32::try_from(call.int("code")?)?;
            Err(CommandError::new(call.str("message")?).with_code(code).into())
        })
        .with_doc("Fail with a message and an exit status"),
    )
}

fn crash() -> Command {
    Command::new(
        Function::new("crash", "", |_| bail!("unexpected failure"))
            .with_doc("Fail with an unexpected error"),
    )
}

fn accent() -> Command {
    Command::new(
        Function::new("accent", "", |_| Ok(Output::text("café ☃")))
            .with_doc("Print text outside of ASCII"),
    )
}

fn parse_port() -> Command {
    Command::new(
        Function::new("parse_port", "value", |call| {
            let port: u16 = call.str("value")?.parse()?;
            Ok(Output::text(format!("port {port}")))
        })
        .with_doc("Parse a TCP port number"),
    )
    .wrap_errors::<ParseIntError>()
}

fn manifest() -> Command {
    Command::new(
        Function::new("manifest", "", |_| Ok(Output::text(build_tree()?.manifest().to_json()?)))
            .with_doc("Describe every command as JSON"),
    )
}

fn db_get() -> Command {
    Command::new(
        Function::new("get", "key", |call| {
            let key = call.str("key")?;
            match KEYS.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => Ok(Output::text(*value)),
                None => Err(CommandError::new(format!("missing key: {key}")).with_code(3).into()),
            }
        })
        .with_doc("Look a key up"),
    )
}

fn db_put() -> Command {
    Command::new(
        Function::new("put", "key, value", |call| {
            Ok(Output::text(format!("set {}={}", call.str("key")?, call.str("value")?)))
        })
        .with_doc("Store a value"),
    )
}

fn db_purge() -> Command {
    Command::new(
        Function::new("purge", "*, force=False", |call| {
            let action = format!("Purge {} keys", KEYS.len());
            let force = call.bool("force")?;
            let text = match confirm(&action, Some(force), force) {
                Some(true) => format!("purged {} keys", KEYS.len()),
                _ => "cancelled".to_string(),
            };
            Ok(Output::text(text))
        })
        .with_doc("Delete every key"),
    )
}

fn build_tree() -> Result<CommandTree> {
    let mut tree = CommandTree::new("argmap-demo")
        .about("Example commands assembled with argmap")
        .version(PKG_VERSION);

    tree.add(
        [greet(), sum(), count(), tags(), fail(), crash(), accent(), parse_port(), manifest()],
        &[],
    )?;
    tree.add([db_get(), db_put(), db_purge()], &["db"])?;
    tree.describe_group(&["db"], "A read-only key-value store")?;
    Ok(tree)
}

fn main() -> Result<ExitCode> {
    init_tracing();
    run_tree(&build_tree()?)
}
