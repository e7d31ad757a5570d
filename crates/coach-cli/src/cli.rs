//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Coach - Turn call transcripts into coach cards
#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Scan transcript CSVs for sales triggers and suggest rep responses", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Rule table file (defaults to $COACH_RULES, then the data dir override, then built-in rules)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a transcript CSV into coach cards
    Classify {
        /// Transcript CSV file (needs a `content` column)
        #[arg(short, long)]
        file: PathBuf,

        /// Response language; repeat to render the same file in several languages
        #[arg(short, long = "language", default_value = "en")]
        languages: Vec<String>,

        /// Only show cards of this category
        #[arg(short, long)]
        category: Option<String>,

        /// CSV column holding the customer's message
        #[arg(long, default_value = "content")]
        content_column: String,

        /// Output format: text, csv, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Quote CSV fields containing commas, quotes or newlines
        ///
        /// Without this flag the CSV uses the legacy layout, which joins
        /// fields with bare commas.
        #[arg(long)]
        quoted: bool,

        /// Emit a card for every matching category instead of the first one
        #[arg(long)]
        every_category: bool,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or test the trigger rule table
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// List response languages
    Languages,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List rules in match order
    List,

    /// Show which rule and trigger a piece of text would hit
    Test {
        /// Customer text to check
        text: String,

        /// Response language
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Validate a rule table file
    Check {
        /// Rule table TOML file
        path: PathBuf,
    },

    /// Print the path of the rule table override
    Path,
}
