//! Graph commands.

use super::{emit, open_graph, CommandResult};
use crate::OutputFormat;
use graphdoc_core::{Action, QueryOptions, Thing};
use serde_json::Value;
use std::path::Path;

/// Runs the things command.
pub fn things(
    path: &Path,
    thing_type: Option<&str>,
    limit: Option<u64>,
    format: OutputFormat,
) -> CommandResult {
    let graph = open_graph(path)?;
    let options = QueryOptions {
        limit,
        ..QueryOptions::default()
    };
    let things = graph.things().find(thing_type, &Value::Null, &options)?;
    emit(format, &things, |things| print_things(things))
}

/// Runs the traverse command.
pub fn traverse(
    path: &Path,
    id: &str,
    verb: &str,
    back: bool,
    format: OutputFormat,
) -> CommandResult {
    let graph = open_graph(path)?;
    let things = if back {
        graph.traverse_back(id, verb)?
    } else {
        graph.traverse(id, verb)?
    };
    emit(format, &things, |things| print_things(things))
}

/// Runs the history command.
pub fn history(path: &Path, id: &str, format: OutputFormat) -> CommandResult {
    let graph = open_graph(path)?;
    let actions = graph.actions().for_thing(id)?;
    emit(format, &actions, |actions| {
        for action in actions {
            println!("{}", describe(action));
        }
    })
}

fn print_things(things: &[Thing]) {
    for thing in things {
        println!(
            "{:<32} {:<16} v{:<4} {}",
            thing.id,
            thing.thing_type,
            thing.version,
            Value::Object(thing.data.clone())
        );
    }
}

fn describe(action: &Action) -> String {
    let mut line = format!("{} {}", action.at, action.verb);
    if let Some(from) = &action.from {
        line.push_str(&format!(" from={from}"));
    }
    if let Some(to) = &action.to {
        line.push_str(&format!(" to={to}"));
    }
    if let Some(by) = &action.by {
        line.push_str(&format!(" by={by}"));
    }
    if let Some(data) = &action.data {
        line.push_str(&format!(" {data}"));
    }
    line
}
