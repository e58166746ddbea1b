//! Platform capability for opening a book's link
//!
//! Remote links go to the system browser; local paths can only be copied
//! to the clipboard.

use thiserror::Error;

/// Errors raised by a `ResourceOpener`
#[derive(Error, Debug)]
pub enum OpenError {
    /// The browser or launcher could not be started
    #[error("Failed to open '{target}': {source}")]
    Launch {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// No clipboard mechanism is available on this platform
    #[error("No clipboard available")]
    ClipboardUnavailable,

    /// The clipboard exists but the write failed
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
}

/// Opens remote resources and writes to the clipboard
pub trait ResourceOpener {
    /// Open `url` in a new, detached browsing context
    fn open_remote(&self, url: &str) -> Result<(), OpenError>;

    /// Put `text` on the system clipboard
    fn write_clipboard(&self, text: &str) -> Result<(), OpenError>;
}

impl<T: ResourceOpener + ?Sized> ResourceOpener for &T {
    fn open_remote(&self, url: &str) -> Result<(), OpenError> {
        (**self).open_remote(url)
    }

    fn write_clipboard(&self, text: &str) -> Result<(), OpenError> {
        (**self).write_clipboard(text)
    }
}
