//! Command handlers

pub mod book;
pub mod config;
pub mod status;
pub mod tag;

use shelf_core::{JsonFilePersistence, Store};

use crate::output::TerminalSink;

/// The store as the CLI opens it
pub type CliStore = Store<JsonFilePersistence, TerminalSink>;
