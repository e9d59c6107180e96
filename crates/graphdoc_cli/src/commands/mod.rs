//! CLI command implementations.

pub mod docs;
pub mod graph;
pub mod inspect;

use crate::OutputFormat;
use graphdoc_core::{Graph, Store};
use serde::Serialize;
use std::path::Path;

/// Result type shared by the commands.
pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Opens the store at `path`, refusing to create a new file.
pub fn open_store(path: &Path) -> CommandResult<Store> {
    if !path.exists() {
        return Err(format!("No store found at {}", path.display()).into());
    }
    tracing::debug!(path = %path.display(), "opening store");
    Ok(Store::open_path(path)?)
}

/// Opens the store at `path` as a graph.
pub fn open_graph(path: &Path) -> CommandResult<Graph> {
    Ok(Graph::new(open_store(path)?))
}

/// Prints `value` as pretty JSON, or as text via `text`.
pub fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> CommandResult
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}
