//! Link classification
//!
//! A link is either a local path or a remote URL. Anything that does not
//! start with `http://`, `https://` or `ftp://` is treated as local, so a
//! scheme-less `example.com/book` is a path, not an error.

use serde::Serialize;

/// Where a book's link points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Filesystem-style path (never opened, only copied)
    Local,
    /// Network resource opened in the browser
    Remote,
}

impl LinkKind {
    /// Badge label shown next to a book
    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::Local => "Local File",
            LinkKind::Remote => "Online",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, LinkKind::Local)
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

const LOCAL_PREFIXES: &[&str] = &["/", "~/", "./", "../", "file://"];
const REMOTE_SCHEMES: &[&str] = &["http://", "https://", "ftp://"];

/// Classify a link as local or remote
pub fn classify_link(link: &str) -> LinkKind {
    if is_drive_path(link) || LOCAL_PREFIXES.iter().any(|p| link.starts_with(p)) {
        return LinkKind::Local;
    }

    if REMOTE_SCHEMES.iter().any(|s| link.starts_with(s)) {
        LinkKind::Remote
    } else {
        LinkKind::Local
    }
}

/// `C:\...` style drive-letter path
fn is_drive_path(link: &str) -> bool {
    let bytes = link.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}
