use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::book::Testament;

#[derive(Debug, Parser)]
#[command(
    name = "versefind",
    about = "Instant full-text search across the English and Amharic Bible"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search verse text and book names
    Search(SearchArgs),
    /// Print a passage by reference (e.g. "John 3:16", "Psalms 23")
    Get(GetArgs),
    /// List the books of the catalog
    Books(BooksArgs),
    /// Load and index the corpus, reporting counts and timing
    Check(CheckArgs),
    /// Start MCP server for AI agent integration
    Mcp,
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query, matched case-insensitively as a substring
    pub query: String,

    /// Maximum number of results (book and verse matches combined)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Maximum verse matches listed per book
    #[arg(long)]
    pub per_book: Option<usize>,

    /// Search only one testament
    #[arg(short, long, value_enum)]
    pub testament: Option<Testament>,

    /// Search only this book (number, name or slug)
    #[arg(short, long)]
    pub book: Option<String>,

    /// Use the larger limits of the full results page
    #[arg(long)]
    pub page: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Get --

#[derive(Debug, Parser)]
pub struct GetArgs {
    /// Passage reference: "<book> <chapter>[:<verse>]"
    pub reference: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Books --

#[derive(Debug, Parser)]
pub struct BooksArgs {
    /// List only one testament
    #[arg(short, long, value_enum)]
    pub testament: Option<Testament>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Check --

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "versefind",
            &mut std::io::stdout(),
        );
    }
}
