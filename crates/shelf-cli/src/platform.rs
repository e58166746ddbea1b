//! Platform open-resource support
//!
//! Remote links are handed to the system browser; the clipboard is
//! written through whichever copy command the platform provides.

use std::io::Write;
use std::process::{Command, Stdio};

use shelf_core::{OpenError, ResourceOpener};

/// Opens links with the desktop's default handlers
pub struct SystemOpener;

impl ResourceOpener for SystemOpener {
    fn open_remote(&self, url: &str) -> Result<(), OpenError> {
        // Detached: the browser gets no handle back to this process
        open::that_detached(url).map_err(|source| OpenError::Launch {
            target: url.to_string(),
            source,
        })
    }

    fn write_clipboard(&self, text: &str) -> Result<(), OpenError> {
        let (program, args) = find_clipboard_command().ok_or(OpenError::ClipboardUnavailable)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| OpenError::Clipboard(format!("{}: {}", program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| OpenError::Clipboard(format!("{}: {}", program, e)))?;
        }

        let status = child
            .wait()
            .map_err(|e| OpenError::Clipboard(format!("{}: {}", program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(OpenError::Clipboard(format!(
                "{} exited with {}",
                program, status
            )))
        }
    }
}

/// Program and arguments that copy stdin to the clipboard
type ClipboardCommand = (&'static str, &'static [&'static str]);

const PBCOPY: ClipboardCommand = ("pbcopy", &[]);
const CLIP: ClipboardCommand = ("clip", &[]);
const WL_COPY: ClipboardCommand = ("wl-copy", &[]);
const XCLIP: ClipboardCommand = ("xclip", &["-selection", "clipboard"]);
const XSEL: ClipboardCommand = ("xsel", &["--clipboard", "--input"]);

/// Clipboard command candidates for this platform, in preference order
fn clipboard_candidates() -> Vec<ClipboardCommand> {
    if cfg!(target_os = "macos") {
        vec![PBCOPY]
    } else if cfg!(windows) {
        vec![CLIP]
    } else {
        let mut candidates = Vec::new();
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            candidates.push(WL_COPY);
        }
        candidates.push(XCLIP);
        candidates.push(XSEL);
        candidates
    }
}

/// First available clipboard command
fn find_clipboard_command() -> Option<ClipboardCommand> {
    clipboard_candidates().into_iter().find(|(program, _)| {
        // `clip` ships with Windows and `which` does not
        cfg!(windows) || command_exists(program)
    })
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        #[cfg(unix)]
        assert!(command_exists("ls"));

        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }

    #[test]
    fn test_clipboard_candidates_not_empty() {
        let candidates = clipboard_candidates();
        assert!(!candidates.is_empty());
        #[cfg(target_os = "linux")]
        assert!(candidates.iter().any(|(program, _)| *program == "xclip"));
    }
}
