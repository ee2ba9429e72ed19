//! System clipboard output.
//!
//! On Linux the selection is owned by the process that set it, so the text is
//! handed to a detached copy of this binary that keeps serving it after we exit.

use arboard::Clipboard;
use thiserror::Error;

/// Hidden flag that turns the binary into a clipboard server reading stdin
pub const DAEMON_FLAG: &str = "clipboard-daemon";

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("failed to access system clipboard: {0}")]
    Unavailable(#[source] arboard::Error),
    #[error("failed to copy text to clipboard: {0}")]
    WriteFailed(#[source] arboard::Error),
    #[error("failed to start clipboard helper: {0}")]
    HelperFailed(#[source] std::io::Error),
}

/// Copy text to the system clipboard so it stays pasteable after this process exits.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    #[cfg(target_os = "linux")]
    {
        // Fail here, not silently in the helper, when there is no display
        Clipboard::new().map_err(ClipboardError::Unavailable)?;
        spawn_helper(text)
    }

    #[cfg(not(target_os = "linux"))]
    {
        serve_clipboard(text)
    }
}

/// Set the clipboard from this process.
///
/// On Linux this blocks until another program takes ownership of the clipboard.
pub fn serve_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(ClipboardError::Unavailable)?;

    #[cfg(target_os = "linux")]
    {
        use arboard::SetExtLinux;
        clipboard
            .set()
            .wait()
            .text(text)
            .map_err(ClipboardError::WriteFailed)?;
    }

    #[cfg(not(target_os = "linux"))]
    clipboard
        .set_text(text)
        .map_err(ClipboardError::WriteFailed)?;

    tracing::debug!("copied {} characters to clipboard", text.len());
    Ok(())
}

#[cfg(target_os = "linux")]
fn spawn_helper(text: &str) -> Result<(), ClipboardError> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let exe = std::env::current_exe().map_err(ClipboardError::HelperFailed)?;
    let mut child = Command::new(exe)
        .arg(format!("--{}", DAEMON_FLAG))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(ClipboardError::HelperFailed)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(ClipboardError::HelperFailed)?;
    }
    tracing::debug!("clipboard helper started (pid {})", child.id());
    Ok(())
}
