//! Tag command handlers

use anyhow::Result;

use crate::commands::CliStore;
use crate::output::Output;

/// List all tags with usage counts
pub fn list(store: &CliStore, output: &Output) -> Result<()> {
    output.print_tags(&store.tags_with_counts())
}
