//! Shelf CLI
//!
//! Command-line interface for Shelf - personal book bookmarks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use shelf_core::{BookForm, Config, ShelfError, Store};

mod commands;
mod logging;
mod output;
mod platform;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - Keep track of your books and open them again")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book
    #[command(alias = "create")]
    Add {
        /// Book title
        #[arg(short = 'T', long, default_value = "")]
        title: String,
        /// Author name
        #[arg(short, long, default_value = "")]
        author: String,
        /// Web URL or local file path
        #[arg(short, long, default_value = "")]
        link: String,
        /// Brief description or your thoughts about the book
        #[arg(short, long, default_value = "")]
        description: String,
        /// Comma-separated tags, e.g. "fiction, sci-fi, favorite"
        #[arg(short, long, default_value = "")]
        tags: String,
    },
    /// List books
    #[command(alias = "ls")]
    List {
        /// Only show books matching this title, author or tag
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Search books by title, author, or tags
    Search {
        /// Search term (case-insensitive)
        term: String,
    },
    /// Show book details
    Show {
        /// Book ID (full or prefix)
        id: String,
    },
    /// Delete a book
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Open a book (browser for web links, clipboard for local paths)
    Open {
        /// Book ID (full or prefix)
        id: String,
    },
    /// List all tags
    Tags,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage location and counts
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let result = run(Cli::parse());
    if let Err(e) = &result {
        if let Some(hint) = recovery_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }
    result
}

/// Suggestion for errors the user can act on
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .downcast_ref::<ShelfError>()
        .and_then(ShelfError::recovery_suggestion)
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init_logging(&config);

    let mut store = Store::open(&config, output.sink());

    // No command lists the shelf
    let command = cli.command.unwrap_or(Commands::List { search: None });

    match command {
        Commands::Add {
            title,
            author,
            link,
            description,
            tags,
        } => {
            let form = BookForm {
                title,
                author,
                description,
                link,
                tags,
            };
            commands::book::add(&mut store, form, &output)
        }
        Commands::List { search } => commands::book::list(&mut store, search, &output),
        Commands::Search { term } => commands::book::search(&mut store, term, &output),
        Commands::Show { id } => commands::book::show(&store, id, &output),
        Commands::Delete { id, yes } => commands::book::delete(&mut store, id, yes, &output),
        Commands::Open { id } => commands::book::open(&mut store, id),
        Commands::Tags => commands::tag::list(&store, &output),
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
