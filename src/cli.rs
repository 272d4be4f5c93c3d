use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "peephole")]
#[command(author, version, about = "Watch a forum as a continuously running media channel")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show what is on air
    Now {
        /// Instant to tune in at (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every item in the current window
    Programme {
        /// Instant to centre the window on (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Classify the media links in a text without touching the database
    Scan {
        /// File to read (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Manage posts in the store
    Post {
        #[command(subcommand)]
        command: PostCommands,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum PostCommands {
    /// Add a post from a file or stdin
    Add {
        /// File to read (stdin if omitted)
        file: Option<PathBuf>,

        /// Last-update time (RFC 3339), defaults to now
        #[arg(long)]
        updated_at: Option<String>,
    },

    /// List the posts in the window, oldest update first
    List {
        /// Instant to centre the window on (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Replace a post's text from a file or stdin
    Edit {
        /// Post ID
        id: String,

        /// File to read (stdin if omitted)
        file: Option<PathBuf>,

        /// New last-update time (RFC 3339), defaults to now
        #[arg(long)]
        updated_at: Option<String>,
    },

    /// Delete a post
    Rm {
        /// Post ID
        id: String,
    },
}
