//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! Notifications from the store are printed through `TerminalSink`.

use anyhow::Result;
use serde_json::{json, Value};

use shelf_core::{Book, Notification, NotificationSink};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Sink printing store notifications in this format
    pub fn sink(&self) -> TerminalSink {
        TerminalSink {
            format: self.format,
        }
    }

    /// Print a single book
    pub fn print_book(&self, book: &Book) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", book.id);
                println!("Title:       {}", book.title);
                println!("Author:      {}", book.author);
                println!("Link:        {} ({})", book.link, book.link_kind());
                if !book.description.is_empty() {
                    println!("Description: {}", book.description);
                }
                if !book.tags.is_empty() {
                    println!("Tags:        {}", book.tags.join(", "));
                }
                println!("Added:       {}", book.date_added.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&book_json(book)?)?);
            }
            OutputFormat::Quiet => {
                println!("{}", book.id);
            }
        }
        Ok(())
    }

    /// Print a (possibly filtered) list of books
    ///
    /// `total` is the size of the whole collection, used to tell an empty
    /// shelf apart from a search with no hits.
    pub fn print_books(&self, books: &[&Book], total: usize) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    for line in empty_state(total) {
                        println!("{}", line);
                    }
                    return Ok(());
                }
                for book in books {
                    println!(
                        "{} | {} | {} | {:<10} | {}",
                        book.id,
                        truncate(&book.title, 35),
                        truncate(&book.author, 20),
                        book.link_kind().label(),
                        book.date_added.format("%Y-%m-%d")
                    );
                    if !book.tags.is_empty() {
                        println!("    [{}]", book.tags.join("] ["));
                    }
                }
                println!("\n{}", list_footer(books.len(), total));
            }
            OutputFormat::Json => {
                let items = books
                    .iter()
                    .map(|b| book_json(b))
                    .collect::<Result<Vec<_>>>()?;
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
        Ok(())
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[(String, usize)]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return Ok(());
                }
                for (name, count) in tags {
                    println!("{} ({})", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| json!({"name": name, "count": count}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json_tags)?);
            }
            OutputFormat::Quiet => {
                for (name, _) in tags {
                    println!("{}", name);
                }
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!("{}", json!({"status": "success", "message": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

/// Lines shown when a list has nothing to display
///
/// An empty shelf and a search with no hits read differently.
fn empty_state(total: usize) -> &'static [&'static str] {
    if total == 0 {
        &[
            "No books yet.",
            "Start building your book collection by adding your first book:",
            "  shelf add --title <TITLE> --author <AUTHOR> --link <LINK>",
        ]
    } else {
        &["No books found.", "Try adjusting your search terms."]
    }
}

fn list_footer(shown: usize, total: usize) -> String {
    if shown == total {
        format!("{} book(s)", total)
    } else {
        format!("{} of {} book(s)", shown, total)
    }
}

/// Prints store notifications to the terminal
///
/// Display duration is ignored: a terminal line stays until scrolled away.
pub struct TerminalSink {
    format: OutputFormat,
}

impl TerminalSink {
    /// Destructive notifications, and every notification in JSON mode,
    /// go to stderr so stdout stays a single document
    fn uses_stderr(&self, notification: &Notification) -> bool {
        match self.format {
            OutputFormat::Human => notification.is_destructive(),
            OutputFormat::Json => true,
            OutputFormat::Quiet => false,
        }
    }

    /// Rendered notification, or `None` when nothing should be printed
    fn render(&self, notification: &Notification) -> Option<String> {
        match self.format {
            OutputFormat::Human => Some(format_notification(notification)),
            OutputFormat::Json => Some(
                json!({
                    "notification": {
                        "title": notification.title,
                        "description": notification.description,
                        "variant": notification.variant,
                    }
                })
                .to_string(),
            ),
            OutputFormat::Quiet => None,
        }
    }
}

impl NotificationSink for TerminalSink {
    fn notify(&mut self, notification: Notification) {
        let Some(line) = self.render(&notification) else {
            return;
        };
        if self.uses_stderr(&notification) {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// One-line human rendering of a notification
fn format_notification(notification: &Notification) -> String {
    let marker = if notification.is_destructive() { "✗" } else { "✓" };
    format!(
        "{} {}: {}",
        marker, notification.title, notification.description
    )
}

/// Book as JSON with its derived link kind
fn book_json(book: &Book) -> Result<Value> {
    let mut value = serde_json::to_value(book)?;
    value["kind"] = json!(book.link_kind());
    Ok(value)
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
