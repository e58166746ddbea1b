//! Storage layer
//!
//! Persists the book collection as a single JSON value.
//!
//! ## Backends
//!
//! - **JsonFilePersistence**: `bookmarks.json` in the data directory
//! - **MemoryPersistence**: in-process, nothing touches disk

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{JsonFilePersistence, MemoryPersistence, Persistence, STORAGE_KEY};
