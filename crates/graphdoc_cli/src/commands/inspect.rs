//! Stats and collection listing.

use super::{emit, open_graph, open_store, CommandResult};
use crate::OutputFormat;
use graphdoc_core::GraphStats;
use serde::Serialize;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct StatsResult {
    /// Store path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Graph record counts.
    pub graph: GraphStats,
    /// Per-collection document counts.
    pub collections: Vec<CollectionStats>,
}

/// Statistics for a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of documents.
    pub documents: u64,
}

/// Runs the stats command.
pub fn stats(path: &Path, format: OutputFormat) -> CommandResult {
    let graph = open_graph(path)?;
    let result = StatsResult {
        path: path.display().to_string(),
        file_size: std::fs::metadata(path)?.len(),
        graph: graph.stats()?,
        collections: collection_stats(graph.store())?,
    };

    emit(format, &result, print_stats)
}

/// Runs the collections command.
pub fn collections(path: &Path, format: OutputFormat) -> CommandResult {
    let store = open_store(path)?;
    let names = store.collections()?;
    emit(format, &names, |names| {
        for name in names {
            println!("{name}");
        }
    })
}

fn collection_stats(store: &graphdoc_core::Store) -> CommandResult<Vec<CollectionStats>> {
    let mut stats = Vec::new();
    for name in store.collections()? {
        let documents = store.collection(&name).count(&serde_json::Value::Null)?;
        stats.push(CollectionStats { name, documents });
    }
    Ok(stats)
}

fn print_stats(result: &StatsResult) {
    println!("GraphDoc Store: {}", result.path);
    println!("================");
    println!();
    println!("File size: {}", format_bytes(result.file_size));
    println!();
    println!("Graph:");
    println!("  Nouns:         {}", result.graph.nouns);
    println!("  Verbs:         {}", result.graph.verbs);
    println!("  Things:        {}", result.graph.things);
    println!("  Actions:       {}", result.graph.actions);
    println!("  Relationships: {}", result.graph.relationships);

    if !result.collections.is_empty() {
        println!();
        println!("Collections:");
        for c in &result.collections {
            println!("  {:<24} {} documents", c.name, c.documents);
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
