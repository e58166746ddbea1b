//! Shelf Core Library
//!
//! This crate provides the core functionality for Shelf, a personal
//! book-bookmark manager: record books with a link (web URL or local path)
//! and tags, search them, and open them.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = Store::open(&config, RecordingSink::new());
//!
//! // Add a book
//! let mut form = BookForm { title: "Dune".into(), author: "Frank Herbert".into(),
//!     link: "~/Books/dune.epub".into(), tags: "sci-fi, classic".into(),
//!     ..Default::default() };
//! store.add(&mut form)?;
//!
//! // Query books
//! let hits = store.search("sci-fi");
//! ```
//!
//! # Modules
//!
//! - `store`: The book collection controller (main entry point)
//! - `models`: Book record and form buffer
//! - `classify`: Local/remote link classification
//! - `search`: Search and tag counting
//! - `storage`: Persistence port and backends
//! - `notify`: Notification events and sinks
//! - `opener`: Platform open-resource port
//! - `config`: Application configuration

pub mod classify;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod opener;
pub mod search;
pub mod storage;
pub mod store;

pub use classify::{classify_link, LinkKind};
pub use config::Config;
pub use error::ShelfError;
pub use models::{parse_tags, Book, BookForm};
pub use notify::{Notification, NotificationSink, RecordingSink, Variant};
pub use opener::{OpenError, ResourceOpener};
pub use storage::{JsonFilePersistence, MemoryPersistence, Persistence, StorageError};
pub use store::Store;
