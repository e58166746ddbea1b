//! Data models for Shelf
//!
//! Defines the book record and the form buffer it is created from.
//! Records are immutable once created; the collection is replaced on change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{classify_link, LinkKind};

/// A bookmarked book
///
/// Serialized with camelCase keys so the persisted array reads
/// `{"id", "title", "author", "description", "link", "tags", "dateAdded"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique, opaque identifier
    pub id: String,
    /// Book title
    pub title: String,
    /// Author name(s), free text
    pub author: String,
    /// Free-text description, may be empty
    #[serde(default)]
    pub description: String,
    /// Web URL or local path
    pub link: String,
    /// Tags in input order, duplicates kept
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the book was added
    pub date_added: DateTime<Utc>,
}

impl Book {
    /// Build a record from a completed form
    pub fn from_form(id: impl Into<String>, form: &BookForm, date_added: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: form.title.clone(),
            author: form.author.clone(),
            description: form.description.clone(),
            link: form.link.clone(),
            tags: parse_tags(&form.tags),
            date_added,
        }
    }

    /// Classification of this book's link
    pub fn link_kind(&self) -> LinkKind {
        classify_link(&self.link)
    }
}

/// Transient input for a new book
///
/// All fields are plain text, as typed. `tags` is the raw comma-separated
/// string; it is split when the book is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub link: String,
    pub tags: String,
}

impl BookForm {
    /// Names of required fields that are empty
    ///
    /// Only the empty string counts as missing; whitespace is accepted.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_empty() {
            missing.push("title");
        }
        if self.author.is_empty() {
            missing.push("author");
        }
        if self.link.is_empty() {
            missing.push("link");
        }
        missing
    }

    /// Reset every field
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Split a comma-separated tag string
///
/// Each segment is trimmed and empty segments are dropped.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
