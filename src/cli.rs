//! Command-line interface for the palisade security layer
//!
//! Operator tooling over the same code paths the API uses:
//! - Clean a piece of text, a URL, or an uploaded filename the way the
//!   sanitization middleware would
//! - Dry-run a SQL statement through the full query guard (pattern and
//!   placeholder validation, no database)
//! - Print the Content-Security-Policy value for a given relaxation
//!
//! Results are emitted as JSON so they can be piped into other tools.

use clap::{Parser, Subcommand};

/// Main command-line interface structure
#[derive(Parser)]
#[command(
    name = "palisade",
    about = "Query-safety and input-sanitization layer for a classifieds marketplace API",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Clean a piece of user text the way the API middleware would
    Sanitize {
        /// Text to sanitize
        text: String,

        /// Permit the allow-listed HTML tag set instead of encoding everything
        #[arg(long)]
        allow_html: bool,

        /// Keep line breaks when normalizing whitespace
        #[arg(long)]
        preserve_line_breaks: bool,

        /// Maximum output length in characters
        #[arg(long, default_value = "1000")]
        max_length: usize,
    },

    /// Dry-run a statement through the query guard without a database
    ///
    /// Validates dangerous patterns and placeholder sequencing, then
    /// executes against a null driver. Exit code is non-zero when the
    /// guard rejects the statement.
    CheckQuery {
        /// SQL text with $1..$N placeholders
        sql: String,

        /// Positional parameter values, one per placeholder
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Validate a URL against the http/https allow-list
    Url {
        /// URL to validate
        url: String,
    },

    /// Normalize an uploaded filename to the safe character set
    Filename {
        /// Filename to normalize
        name: String,
    },

    /// Print a Content-Security-Policy header value
    Csp {
        /// Add 'unsafe-inline' to style-src
        #[arg(long)]
        inline_styles: bool,

        /// Add 'unsafe-inline' to script-src
        #[arg(long)]
        inline_scripts: bool,

        /// Add 'unsafe-eval' to script-src
        #[arg(long)]
        allow_eval: bool,
    },
}
