//! Status command handler

use anyhow::Result;
use serde_json::json;

use shelf_core::{Book, Config};

use crate::commands::CliStore;
use crate::output::{Output, OutputFormat};

/// Counts shown by `status`
#[derive(Debug, Default, PartialEq, Eq)]
struct Counts {
    books: usize,
    local: usize,
    online: usize,
    tags: usize,
}

impl Counts {
    fn of(books: &[Book], tags: usize) -> Self {
        let local = books.iter().filter(|b| b.link_kind().is_local()).count();
        Self {
            books: books.len(),
            local,
            online: books.len() - local,
            tags,
        }
    }
}

/// Show status information
pub fn show(store: &CliStore, config: &Config, output: &Output) -> Result<()> {
    let persistence = store.persistence();
    let counts = Counts::of(store.books(), store.tags_with_counts().len());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                json!({
                    "storage": {
                        "path": persistence.path(),
                        "exists": persistence.exists(),
                        "size": persistence.size(),
                    },
                    "counts": {
                        "books": counts.books,
                        "local": counts.local,
                        "online": counts.online,
                        "tags": counts.tags,
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", counts.books);
        }
        OutputFormat::Human => {
            println!("Shelf Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  File:     {}", persistence.path().display());
            println!("  Size:     {}", human_size(persistence.size()));
            println!();
            println!("Contents:");
            println!("  Books:      {}", counts.books);
            println!("  Local File: {}", counts.local);
            println!("  Online:     {}", counts.online);
            println!("  Tags:       {}", counts.tags);
        }
    }

    Ok(())
}

/// Format a byte count for display
fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
