//! Bookmark store
//!
//! The `Store` owns the in-memory book collection and keeps it in sync with
//! a `Persistence` backend. Every change builds a new collection, writes
//! it, and only then adopts it, so memory and storage never diverge.
//!
//! User-facing outcomes are reported as `Notification`s to the sink the
//! store was built with.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open(&config, RecordingSink::new());
//!
//! let mut form = BookForm { title: "Dune".into(), author: "Frank Herbert".into(),
//!     link: "https://example.com/dune.pdf".into(), ..Default::default() };
//! store.add(&mut form)?;
//!
//! let hits = store.search("dune");
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::classify::{classify_link, LinkKind};
use crate::config::Config;
use crate::error::ShelfError;
use crate::models::{Book, BookForm};
use crate::notify::{Notification, NotificationSink};
use crate::opener::ResourceOpener;
use crate::search::{filter_books, tag_counts};
use crate::storage::{JsonFilePersistence, Persistence};

/// How long the local-path instructions stay visible
pub const LOCAL_FILE_NOTICE: Duration = Duration::from_secs(10);

/// The book collection and its persistence
pub struct Store<P, N> {
    /// Newest first
    books: Vec<Book>,
    /// Current search box text
    search_term: String,
    persistence: P,
    sink: N,
    /// Highest id issued by this store
    last_id: u64,
}

impl<N: NotificationSink> Store<JsonFilePersistence, N> {
    /// Open the file-backed store described by `config`
    pub fn open(config: &Config, sink: N) -> Self {
        Self::new(JsonFilePersistence::new(config), sink)
    }
}

impl<P: Persistence, N: NotificationSink> Store<P, N> {
    /// Create a store, loading whatever `persistence` holds
    ///
    /// Missing or unreadable data yields an empty collection.
    pub fn new(persistence: P, sink: N) -> Self {
        let books = match persistence.load() {
            Ok(Some(books)) => books,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Starting with an empty collection: {}", e);
                if let Some(hint) = e.recovery_suggestion() {
                    warn!("{}", hint);
                }
                Vec::new()
            }
        };
        debug!("Store opened with {} book(s)", books.len());

        Self {
            books,
            search_term: String::new(),
            persistence,
            sink,
            last_id: 0,
        }
    }

    // ==================== Queries ====================

    /// All books, newest first
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Get a book by exact id
    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve(&self, id: &str) -> Result<&Book, ShelfError> {
        if let Some(book) = self.get(id) {
            return Ok(book);
        }

        let matches: Vec<&Book> = self.books.iter().filter(|b| b.id.starts_with(id)).collect();
        match matches.as_slice() {
            [] => Err(ShelfError::NotFound(id.to_string())),
            [book] => Ok(*book),
            _ => Err(ShelfError::AmbiguousId {
                prefix: id.to_string(),
                matches: matches.iter().map(|b| b.id.clone()).collect(),
            }),
        }
    }

    /// Books matching `term` on title, author or tags
    pub fn search(&self, term: &str) -> Vec<&Book> {
        filter_books(&self.books, term)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Books matching the current search term
    pub fn visible(&self) -> Vec<&Book> {
        self.search(&self.search_term)
    }

    /// Tags with the number of books carrying each
    pub fn tags_with_counts(&self) -> Vec<(String, usize)> {
        tag_counts(&self.books)
    }

    // ==================== Commands ====================

    /// Add a book from the form
    ///
    /// Title, author and link must be non-empty. On success the form is
    /// cleared and the new book is first in the collection.
    pub fn add(&mut self, form: &mut BookForm) -> Result<Book, ShelfError> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            self.sink.notify(Notification::destructive(
                "Missing Information",
                "Please fill in at least the title, author, and link fields.",
            ));
            return Err(ShelfError::MissingFields(missing));
        }

        let now = Utc::now();
        let book = Book::from_form(self.next_id(now), form, now);

        let mut books = Vec::with_capacity(self.books.len() + 1);
        books.push(book.clone());
        books.extend(self.books.iter().cloned());
        self.commit(books)?;

        form.clear();
        info!("Added book {} ({})", book.id, book.title);
        self.sink.notify(Notification::new(
            "Book Added",
            format!("\"{}\" has been added to your bookmarks.", book.title),
        ));

        Ok(book)
    }

    /// Delete a book by id
    ///
    /// Returns the removed book, or `None` if no book has this id, in
    /// which case nothing is written or reported.
    pub fn delete(&mut self, id: &str) -> Result<Option<Book>, ShelfError> {
        let Some(removed) = self.get(id).cloned() else {
            debug!("Delete of unknown id {} ignored", id);
            return Ok(None);
        };

        let books: Vec<Book> = self.books.iter().filter(|b| b.id != id).cloned().collect();
        self.commit(books)?;

        info!("Removed book {} ({})", removed.id, removed.title);
        self.sink.notify(Notification::new(
            "Book Removed",
            format!("\"{}\" has been removed from your bookmarks.", removed.title),
        ));

        Ok(Some(removed))
    }

    /// Open a book's link
    ///
    /// Local paths are never opened: the user is told to open the path
    /// themselves and it is copied to the clipboard if possible. Remote
    /// links go to the opener. Failures become a notification; nothing is
    /// returned to the caller but the classification used.
    pub fn open_book<O: ResourceOpener>(&mut self, opener: &O, link: &str, title: &str) -> LinkKind {
        let kind = classify_link(link);
        debug!("Opening \"{}\" as {:?}", title, kind);

        let result = match kind {
            LinkKind::Local => {
                self.sink.notify(
                    Notification::new(
                        "Local File",
                        format!("Copy this path and open it in your file manager: {}", link),
                    )
                    .with_duration(LOCAL_FILE_NOTICE),
                );

                match opener.write_clipboard(link) {
                    Ok(()) => self.sink.notify(Notification::new(
                        "Path Copied",
                        "File path has been copied to your clipboard.",
                    )),
                    Err(e) => debug!("Clipboard copy skipped: {}", e),
                }
                Ok(())
            }
            LinkKind::Remote => opener.open_remote(link),
        };

        if let Err(e) = result {
            warn!("Failed to open \"{}\": {}", title, e);
            self.sink.notify(Notification::destructive(
                "Error",
                "Unable to open the book link.",
            ));
        }

        kind
    }

    // ==================== Advanced ====================

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// Write `books` and adopt them as the collection
    fn commit(&mut self, books: Vec<Book>) -> Result<(), ShelfError> {
        if let Err(e) = self.persistence.save(&books) {
            warn!("Failed to save bookmarks: {}", e);
            self.sink.notify(Notification::destructive(
                "Error",
                "Unable to save your bookmarks.",
            ));
            return Err(e.into());
        }
        self.books = books;
        Ok(())
    }

    /// Millisecond timestamp id, strictly above anything issued or stored
    ///
    /// If that bound has reached `u64::MAX`, the first free id from the
    /// current timestamp is used instead. Ids are unique either way.
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let stored_max = self
            .books
            .iter()
            .filter_map(|b| b.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        let above = self
            .last_id
            .checked_add(1)
            .zip(stored_max.checked_add(1))
            .map(|(issued, stored)| now_ms.max(issued).max(stored));

        let id = match above {
            Some(id) => id,
            None => {
                warn!("Id space above stored ids is exhausted, reusing gaps");
                let mut id = now_ms;
                while self.get(&id.to_string()).is_some() {
                    id = id.wrapping_add(1);
                }
                id
            }
        };
        self.last_id = self.last_id.max(id);
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{RecordingSink, Variant};
    use crate::opener::OpenError;
    use crate::storage::MemoryPersistence;
    use std::cell::RefCell;
    use tempfile::TempDir;

    type TestStore = Store<MemoryPersistence, RecordingSink>;

    fn store() -> TestStore {
        Store::new(MemoryPersistence::new(), RecordingSink::new())
    }

    fn form(title: &str, tags: &str) -> BookForm {
        BookForm {
            title: title.to_string(),
            author: "Author".to_string(),
            description: String::new(),
            link: format!("https://example.com/{}.pdf", title.to_lowercase()),
            tags: tags.to_string(),
        }
    }

    fn titles<P: Persistence, N: NotificationSink>(store: &Store<P, N>) -> Vec<String> {
        store.books().iter().map(|b| b.title.clone()).collect()
    }

    /// Opener that records calls and can be told to fail
    #[derive(Default)]
    struct FakeOpener {
        opened: RefCell<Vec<String>>,
        copied: RefCell<Vec<String>>,
        fail_open: bool,
        fail_clipboard: bool,
    }

    impl ResourceOpener for FakeOpener {
        fn open_remote(&self, url: &str) -> Result<(), OpenError> {
            if self.fail_open {
                return Err(OpenError::Launch {
                    target: url.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"),
                });
            }
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }

        fn write_clipboard(&self, text: &str) -> Result<(), OpenError> {
            if self.fail_clipboard {
                return Err(OpenError::ClipboardUnavailable);
            }
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_add_prepends_and_clears_form() {
        let mut store = store();
        let mut f = form("Dune", "fiction, sci-fi, , favorite");

        let book = store.add(&mut f).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.books()[0], book);
        assert_eq!(book.tags, vec!["fiction", "sci-fi", "favorite"]);
        assert_eq!(f, BookForm::default());

        let n = store.sink().last().unwrap();
        assert_eq!(n.title, "Book Added");
        assert_eq!(n.description, "\"Dune\" has been added to your bookmarks.");
    }

    #[test]
    fn test_add_missing_fields_rejected() {
        let mut store = store();
        store.add(&mut form("Existing", "")).unwrap();

        for field in ["title", "author", "link"] {
            let mut f = form("New", "");
            match field {
                "title" => f.title.clear(),
                "author" => f.author.clear(),
                _ => f.link.clear(),
            }
            let before = f.clone();

            let err = store.add(&mut f).unwrap_err();
            assert!(matches!(err, ShelfError::MissingFields(ref m) if m == &vec![field]));
            assert_eq!(store.len(), 1);
            // Form is kept so the user can fix it
            assert_eq!(f, before);

            let n = store.sink().last().unwrap();
            assert_eq!(n.title, "Missing Information");
            assert_eq!(n.variant, Variant::Destructive);
        }
    }

    #[test]
    fn test_order_add_add_delete() {
        let mut store = store();
        let a = store.add(&mut form("A", "")).unwrap();
        store.add(&mut form("B", "")).unwrap();
        assert_eq!(titles(&store), vec!["B", "A"]);

        store.delete(&a.id).unwrap();
        assert_eq!(titles(&store), vec!["B"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = store();
        let book = store.add(&mut form("Gone", "")).unwrap();
        store.add(&mut form("Kept", "")).unwrap();

        let removed = store.delete(&book.id).unwrap().unwrap();
        assert_eq!(removed.id, book.id);
        assert_eq!(store.len(), 1);
        assert!(store.get(&book.id).is_none());
        assert_eq!(
            store.sink().last().unwrap().description,
            "\"Gone\" has been removed from your bookmarks."
        );

        let notified = store.sink().notifications().len();
        assert!(store.delete(&book.id).unwrap().is_none());
        assert_eq!(store.len(), 1);
        // Unknown ids are silent
        assert_eq!(store.sink().notifications().len(), notified);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut store = store();
        let mut last = 0u64;
        for i in 0..20 {
            let book = store.add(&mut form(&format!("Book {}", i), "")).unwrap();
            let id: u64 = book.id.parse().unwrap();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn test_id_never_reuses_deleted_id() {
        let mut store = store();
        let first = store.add(&mut form("First", "")).unwrap();
        store.delete(&first.id).unwrap();
        let second = store.add(&mut form("Second", "")).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_id_above_stored_ids() {
        let far_future = "99999999999999";
        let raw = format!(
            r#"[{{"id":"{}","title":"T","author":"A","description":"","link":"/x","tags":[],"dateAdded":"2024-01-01T00:00:00Z"}}]"#,
            far_future
        );
        let mut store = Store::new(MemoryPersistence::with_raw(raw), RecordingSink::new());
        let book = store.add(&mut form("Next", "")).unwrap();
        assert_eq!(book.id, "100000000000000");
    }

    #[test]
    fn test_id_unique_when_stored_id_is_max() {
        let raw = format!(
            r#"[{{"id":"{}","title":"Old","author":"A","description":"","link":"/x","tags":[],"dateAdded":"2024-01-01T00:00:00Z"}}]"#,
            u64::MAX
        );
        let mut store = Store::new(MemoryPersistence::with_raw(raw), RecordingSink::new());

        let first = store.add(&mut form("First", "")).unwrap();
        let second = store.add(&mut form("Second", "")).unwrap();
        assert_ne!(first.id, u64::MAX.to_string());
        assert_ne!(second.id, u64::MAX.to_string());
        assert_ne!(first.id, second.id);

        store.delete(&first.id).unwrap();
        assert_eq!(titles(&store), vec!["Second", "Old"]);
    }

    #[test]
    fn test_search_and_visible() {
        let mut store = store();
        store.add(&mut form("Neuromancer", "sci-fi")).unwrap();
        store.add(&mut form("Emma", "classic")).unwrap();

        assert_eq!(store.search("sci-fi").len(), 1);
        assert_eq!(store.search("SCI-FI")[0].title, "Neuromancer");

        assert_eq!(store.visible().len(), 2);
        store.set_search_term("emma");
        assert_eq!(store.search_term(), "emma");
        let visible = store.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Emma");
        // Searching never touches the collection
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_resolve_prefix() {
        let mut store = store();
        let book = store.add(&mut form("Only", "")).unwrap();

        assert_eq!(store.resolve(&book.id).unwrap().id, book.id);
        assert_eq!(store.resolve(&book.id[..6]).unwrap().id, book.id);
        assert!(matches!(store.resolve("nope"), Err(ShelfError::NotFound(_))));

        store.add(&mut form("Other", "")).unwrap();
        assert!(matches!(
            store.resolve(""),
            Err(ShelfError::AmbiguousId { .. })
        ));
    }

    #[test]
    fn test_tags_with_counts() {
        let mut store = store();
        store.add(&mut form("A", "sci-fi, favorite")).unwrap();
        store.add(&mut form("B", "sci-fi")).unwrap();

        let tags = store.tags_with_counts();
        assert_eq!(
            tags,
            vec![("favorite".to_string(), 1), ("sci-fi".to_string(), 2)]
        );
    }

    #[test]
    fn test_persists_every_change() {
        let mut store = store();
        let a = store.add(&mut form("A", "x")).unwrap();
        store.add(&mut form("B", "")).unwrap();

        let saved: Vec<Book> =
            serde_json::from_str(&store.persistence().raw().unwrap()).unwrap();
        assert_eq!(saved, store.books());

        store.delete(&a.id).unwrap();
        let saved: Vec<Book> =
            serde_json::from_str(&store.persistence().raw().unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "B");
    }

    #[test]
    fn test_reopen_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
        };

        let expected = {
            let mut store = Store::open(&config, RecordingSink::new());
            store.add(&mut form("A", "one, two")).unwrap();
            store.add(&mut form("B", "")).unwrap();
            store.books().to_vec()
        };

        let store = Store::open(&config, RecordingSink::new());
        assert_eq!(store.books(), expected.as_slice());
        assert_eq!(titles(&store), vec!["B", "A"]);
    }

    #[test]
    fn test_corrupt_storage_recovers_empty() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
        };
        std::fs::write(config.storage_path(), "[{broken").unwrap();

        let mut store = Store::open(&config, RecordingSink::new());
        assert!(store.is_empty());

        // The corrupt data survives the next write
        store.add(&mut form("Fresh", "")).unwrap();
        let backup = store.persistence().backup_path();
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "[{broken");
    }

    #[test]
    fn test_non_utf8_storage_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
        };
        let bytes = [0x5b, 0xff, 0xfe, 0x5d];
        std::fs::write(config.storage_path(), bytes).unwrap();

        let mut store = Store::open(&config, RecordingSink::new());
        assert!(store.is_empty());
        store.add(&mut form("Fresh", "")).unwrap();

        let backup = store.persistence().backup_path();
        assert_eq!(std::fs::read(backup).unwrap(), bytes);
    }

    #[test]
    fn test_failed_save_keeps_collection() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let persistence = JsonFilePersistence::at(blocker.join("bookmarks.json"));
        let mut store = Store::new(persistence, RecordingSink::new());
        let mut f = form("Unsaved", "");

        let err = store.add(&mut f).unwrap_err();
        assert!(matches!(err, ShelfError::Storage(_)));
        assert!(store.is_empty());
        assert_eq!(f.title, "Unsaved");
        assert_eq!(store.sink().last().unwrap().title, "Error");
    }

    #[test]
    fn test_open_remote_link() {
        let mut store = store();
        let opener = FakeOpener::default();

        let kind = store.open_book(&opener, "https://example.com/b.pdf", "B");

        assert_eq!(kind, LinkKind::Remote);
        assert_eq!(*opener.opened.borrow(), vec!["https://example.com/b.pdf"]);
        assert!(opener.copied.borrow().is_empty());
        assert!(store.sink().notifications().is_empty());
    }

    #[test]
    fn test_open_local_path_copies() {
        let mut store = store();
        let opener = FakeOpener::default();

        let kind = store.open_book(&opener, "C:\\Books\\b.pdf", "B");

        assert_eq!(kind, LinkKind::Local);
        assert!(opener.opened.borrow().is_empty());
        assert_eq!(*opener.copied.borrow(), vec!["C:\\Books\\b.pdf"]);

        let notes = store.sink().notifications();
        assert_eq!(store.sink().titles(), vec!["Local File", "Path Copied"]);
        assert_eq!(notes[0].duration, Some(LOCAL_FILE_NOTICE));
        assert!(notes[0].description.ends_with("C:\\Books\\b.pdf"));
    }

    #[test]
    fn test_open_local_clipboard_failure_is_silent() {
        let mut store = store();
        let opener = FakeOpener {
            fail_clipboard: true,
            ..Default::default()
        };

        store.open_book(&opener, "relative/path.pdf", "B");
        assert_eq!(store.sink().titles(), vec!["Local File"]);
    }

    #[test]
    fn test_open_failure_is_reported() {
        let mut store = store();
        let opener = FakeOpener {
            fail_open: true,
            ..Default::default()
        };

        let kind = store.open_book(&opener, "https://example.com", "B");
        assert_eq!(kind, LinkKind::Remote);
        let n = store.sink().last().unwrap();
        assert_eq!(n.title, "Error");
        assert_eq!(n.description, "Unable to open the book link.");
        assert!(n.is_destructive());
    }
}
