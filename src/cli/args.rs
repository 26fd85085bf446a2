//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for compliance commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
    /// Single JSON response object
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// Compliance CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "compliance")]
#[command(about = "Check documents for compliance against rulebases")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to compliance.toml
    #[arg(long, global = true, default_value = "compliance.toml")]
    pub config: PathBuf,

    /// Output coloring (overrides [output].color)
    #[arg(long, global = true)]
    pub color: Option<ColorChoice>,
}

/// Available compliance subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a document against a rulebase
    Check {
        /// Rulebase ID
        rulebase: String,

        /// Candidate document as a JSON file
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        document: Option<PathBuf>,

        /// ID of a stored document to check
        #[arg(long)]
        id: Option<String>,

        /// Maximum number of evidence documents to return
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Index of the first evidence document to return
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Output format (overrides [output].format)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Print a stored document
    Get {
        /// Document ID
        id: String,
    },

    /// Create a document from a JSON file
    Post {
        /// Document JSON file
        file: PathBuf,
    },

    /// Update a document; the file must carry its `_id` and current `_rev`
    Put {
        /// Document JSON file
        file: PathBuf,
    },

    /// Delete a stored document
    Delete {
        /// Document ID
        id: String,
    },

    /// Create a new document with another document's statements
    Copy {
        /// ID of the document whose statements are copied
        id: String,

        /// Template JSON file supplying name and tags
        file: PathBuf,
    },

    /// Seed the store from a test-data file
    LoadTestdata {
        /// JSON file of the form {"documents": [...]}
        file: PathBuf,
    },

    /// List registered rulebases
    Rulebases {
        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },
}
