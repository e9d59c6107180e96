//! GraphDoc CLI
//!
//! Command-line tools for inspecting and editing a GraphDoc store file.
//!
//! # Commands
//!
//! - `stats` - Display graph counts and collection sizes
//! - `collections` - List collections
//! - `keys`, `get`, `put`, `delete`, `find` - Work with documents
//! - `things`, `traverse`, `history` - Read the graph

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// GraphDoc command-line tools.
#[derive(Parser)]
#[command(name = "graphdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Output format
    #[arg(global = true, short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display graph counts and collection sizes
    Stats,

    /// List collections holding documents
    Collections,

    /// List document ids in a collection
    Keys {
        /// Collection name
        collection: String,
    },

    /// Print a document
    Get {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },

    /// Insert or replace a document
    Put {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
        /// Document body (a JSON object)
        json: String,
    },

    /// Delete a document
    Delete {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },

    /// Query a collection
    Find {
        /// Collection name
        collection: String,

        /// Filter expression (JSON)
        #[arg(long)]
        filter: Option<String>,

        /// Sort field, `-` prefixed for descending
        #[arg(long)]
        sort: Option<String>,

        /// Maximum number of documents
        #[arg(short, long)]
        limit: Option<u64>,

        /// Documents to skip (requires --limit)
        #[arg(short, long)]
        offset: Option<u64>,
    },

    /// List things
    Things {
        /// Only things of this type
        #[arg(short = 't', long = "type")]
        thing_type: Option<String>,

        /// Maximum number of things
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Follow relationships from a thing
    Traverse {
        /// Starting thing id
        from: String,
        /// Relationship verb
        verb: String,
        /// Follow edges backwards (treat the id as the target)
        #[arg(short, long)]
        back: bool,
    },

    /// Show the audit history of a thing
    History {
        /// Thing id
        id: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let format = cli.format;
    let path = || cli.path.as_deref().ok_or("Store path required (--path)");

    match &cli.command {
        Commands::Stats => commands::inspect::stats(path()?, format)?,
        Commands::Collections => commands::inspect::collections(path()?, format)?,
        Commands::Keys { collection } => commands::docs::keys(path()?, collection, format)?,
        Commands::Get { collection, id } => commands::docs::get(path()?, collection, id, format)?,
        Commands::Put {
            collection,
            id,
            json,
        } => commands::docs::put(path()?, collection, id, json)?,
        Commands::Delete { collection, id } => commands::docs::delete(path()?, collection, id)?,
        Commands::Find {
            collection,
            filter,
            sort,
            limit,
            offset,
        } => {
            let query = commands::docs::FindArgs {
                filter: filter.as_deref(),
                sort: sort.clone(),
                limit: *limit,
                offset: *offset,
            };
            commands::docs::find(path()?, collection, query, format)?;
        }
        Commands::Things { thing_type, limit } => {
            commands::graph::things(path()?, thing_type.as_deref(), *limit, format)?;
        }
        Commands::Traverse { from, verb, back } => {
            commands::graph::traverse(path()?, from, verb, *back, format)?;
        }
        Commands::History { id } => commands::graph::history(path()?, id, format)?,
        Commands::Version => {
            println!("GraphDoc CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("GraphDoc Core v{}", graphdoc_core::VERSION);
        }
    }

    Ok(())
}
