//! Bookmark persistence
//!
//! The whole collection is stored as one JSON array under a single fixed
//! key. `Persistence` is the port the store depends on; the file backend
//! maps the key to `<data_dir>/bookmarks.json` and writes atomically
//! (write to temp file, then rename) to prevent corruption.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::config::Config;
use crate::models::Book;

/// Key the collection is stored under
pub const STORAGE_KEY: &str = "bookmarks";

/// Load/save port for the book collection
pub trait Persistence {
    /// Read the stored collection
    ///
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> StorageResult<Option<Vec<Book>>>;

    /// Replace the stored collection
    fn save(&self, books: &[Book]) -> StorageResult<()>;
}

/// File-backed persistence
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Persistence at the configured storage path
    pub fn new(config: &Config) -> Self {
        Self::at(config.storage_path())
    }

    /// Persistence at an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the storage file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Size of the storage file in bytes (0 if missing)
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Where a corrupt file is copied before it can be overwritten
    pub fn backup_path(&self) -> PathBuf {
        self.numbered_backup_path(0)
    }

    /// `bookmarks.json.corrupt.backup`, then `bookmarks.json.corrupt.1.backup`, ...
    fn numbered_backup_path(&self, n: u32) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        if n == 0 {
            name.push(".corrupt.backup");
        } else {
            name.push(format!(".corrupt.{}.backup", n));
        }
        PathBuf::from(name)
    }

    /// Copy the current file aside, never replacing an earlier backup
    fn backup_corrupt(&self) -> StorageResult<PathBuf> {
        let mut n = 0;
        let mut backup = self.numbered_backup_path(n);
        while backup.exists() {
            n += 1;
            backup = self.numbered_backup_path(n);
        }
        fs::copy(&self.path, &backup).map_err(|e| StorageError::from_io(e, backup.clone()))?;
        warn!("Corrupt bookmarks file copied to {:?}", backup);
        Ok(backup)
    }

    /// Back up the file and describe it as corrupt
    fn corrupt(&self, details: String) -> StorageError {
        match self.backup_corrupt() {
            Ok(backup_path) => StorageError::CorruptDocument {
                path: self.path.clone(),
                backup_path,
                details,
            },
            Err(e) => e,
        }
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&self) -> StorageResult<Option<Vec<Book>>> {
        if !self.path.exists() {
            debug!("No bookmarks file at {:?}", self.path);
            return Ok(None);
        }

        let bytes =
            fs::read(&self.path).map_err(|e| StorageError::from_read(e, self.path.clone()))?;
        let content = String::from_utf8(bytes).map_err(|e| self.corrupt(e.to_string()))?;

        let books = decode(&content).map_err(|e| self.corrupt(e.to_string()))?;
        debug!(
            "Loaded {} book(s) from {:?}",
            books.as_ref().map_or(0, Vec::len),
            self.path
        );
        Ok(books)
    }

    fn save(&self, books: &[Book]) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(books)?;
        atomic_write(&self.path, json.as_bytes())?;
        debug!("Saved {} book(s) to {:?}", books.len(), self.path);
        Ok(())
    }
}

/// In-memory persistence holding the serialized value
///
/// Behaves like the file backend without touching disk.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    value: RefCell<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw stored value (may be invalid JSON)
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            value: RefCell::new(Some(raw.into())),
        }
    }

    /// The stored value as written
    pub fn raw(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> StorageResult<Option<Vec<Book>>> {
        match self.value.borrow().as_deref() {
            None => Ok(None),
            Some(raw) => decode(raw).map_err(|e| StorageError::InvalidFormat {
                path: PathBuf::from(STORAGE_KEY),
                details: e.to_string(),
            }),
        }
    }

    fn save(&self, books: &[Book]) -> StorageResult<()> {
        let json = serde_json::to_string(books)?;
        *self.value.borrow_mut() = Some(json);
        Ok(())
    }
}

/// Parse a stored value; blank content counts as nothing stored
fn decode(raw: &str) -> Result<Option<Vec<Book>>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw).map(Some)
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookForm;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_books() -> Vec<Book> {
        let form = |title: &str, link: &str, tags: &str| BookForm {
            title: title.to_string(),
            author: "Someone".to_string(),
            description: String::new(),
            link: link.to_string(),
            tags: tags.to_string(),
        };
        vec![
            Book::from_form("2", &form("Second", "/books/two.pdf", "a, b"), Utc::now()),
            Book::from_form("1", &form("First", "https://example.com", ""), Utc::now()),
        ]
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonFilePersistence::at(temp_dir.path().join("bookmarks.json"));

        assert!(!persistence.exists());
        assert!(persistence.load().unwrap().is_none());

        let books = sample_books();
        persistence.save(&books).unwrap();
        assert!(persistence.exists());
        assert!(persistence.size() > 0);

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded, books);
    }

    #[test]
    fn test_storage_path_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
        };
        let persistence = JsonFilePersistence::new(&config);
        assert!(persistence.path().ends_with("bookmarks.json"));
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookmarks.json");
        fs::write(&path, "{not json").unwrap();

        let persistence = JsonFilePersistence::at(&path);
        let err = persistence.load().unwrap_err();
        assert!(matches!(err, StorageError::CorruptDocument { .. }));

        let backup = persistence.backup_path();
        assert!(backup.ends_with("bookmarks.json.corrupt.backup"));
        assert_eq!(fs::read_to_string(backup).unwrap(), "{not json");
    }

    #[test]
    fn test_invalid_utf8_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookmarks.json");
        let bytes = [0x5b, 0xff, 0xfe, 0x5d];
        fs::write(&path, bytes).unwrap();

        let persistence = JsonFilePersistence::at(&path);
        let err = persistence.load().unwrap_err();
        assert!(matches!(err, StorageError::CorruptDocument { .. }));
        assert_eq!(fs::read(persistence.backup_path()).unwrap(), bytes);
    }

    #[test]
    fn test_second_corruption_keeps_first_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookmarks.json");
        let persistence = JsonFilePersistence::at(&path);

        fs::write(&path, "first").unwrap();
        assert!(persistence.load().is_err());
        fs::write(&path, "second").unwrap();
        let err = persistence.load().unwrap_err();

        assert_eq!(fs::read_to_string(persistence.backup_path()).unwrap(), "first");
        let second = temp_dir.path().join("bookmarks.json.corrupt.1.backup");
        assert_eq!(fs::read_to_string(&second).unwrap(), "second");
        assert!(matches!(
            err,
            StorageError::CorruptDocument { ref backup_path, .. } if *backup_path == second
        ));
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookmarks.json");
        fs::write(&path, r#"{"id": "1"}"#).unwrap();

        let persistence = JsonFilePersistence::at(&path);
        assert!(persistence.load().is_err());
    }

    #[test]
    fn test_blank_file_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookmarks.json");
        fs::write(&path, "  \n").unwrap();

        let persistence = JsonFilePersistence::at(&path);
        assert!(persistence.load().unwrap().is_none());
    }

    #[test]
    fn test_save_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonFilePersistence::at(temp_dir.path().join("bookmarks.json"));

        persistence.save(&[]).unwrap();
        assert_eq!(persistence.load().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_save_fails_when_parent_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let persistence = JsonFilePersistence::at(blocker.join("bookmarks.json"));
        assert!(persistence.save(&sample_books()).is_err());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert!(nested_path.exists());
        assert!(!nested_path.with_extension("tmp").exists());
        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "[]");
    }

    #[test]
    fn test_memory_round_trip() {
        let persistence = MemoryPersistence::new();
        assert!(persistence.load().unwrap().is_none());

        let books = sample_books();
        persistence.save(&books).unwrap();
        assert!(persistence.raw().unwrap().starts_with('['));
        assert_eq!(persistence.load().unwrap().unwrap(), books);
    }

    #[test]
    fn test_memory_invalid_raw() {
        let persistence = MemoryPersistence::with_raw("garbage");
        let err = persistence.load().unwrap_err();
        assert!(matches!(err, StorageError::InvalidFormat { .. }));
    }
}
