//! Clipboard access for copying the authoritative query.
//!
//! The system implementation pipes text into the platform clipboard tool,
//! trying each candidate in turn until one accepts it.

use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Clipboard write errors
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("No clipboard tool available (tried: {0})")]
    Unavailable(String),

    #[error("Clipboard tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for copied text
pub trait Clipboard {
    /// Replace the clipboard contents with `text`
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Platform clipboard through external commands
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    candidates: Vec<(&'static str, &'static [&'static str])>,
}

impl SystemClipboard {
    /// Clipboard using the tools usual for the current platform
    pub fn new() -> Self {
        Self {
            candidates: platform_candidates(),
        }
    }

    fn pipe_to(program: &str, args: &[&str], text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ClipboardError::ToolFailed {
                tool: program.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut last_error = None;

        for (program, args) in &self.candidates {
            match Self::pipe_to(program, args, text) {
                Ok(()) => {
                    tracing::debug!("Copied {} bytes with {}", text.len(), program);
                    return Ok(());
                }
                Err(ClipboardError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    continue;
                }
                Err(e) => {
                    tracing::debug!("Clipboard tool {} failed: {}", program, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ClipboardError::Unavailable(
                self.candidates
                    .iter()
                    .map(|(program, _)| *program)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        }))
    }
}

const NO_ARGS: &[&str] = &[];

#[cfg(target_os = "macos")]
fn platform_candidates() -> Vec<(&'static str, &'static [&'static str])> {
    vec![("pbcopy", NO_ARGS)]
}

#[cfg(windows)]
fn platform_candidates() -> Vec<(&'static str, &'static [&'static str])> {
    vec![("clip", NO_ARGS)]
}

#[cfg(not(any(target_os = "macos", windows)))]
const XCLIP_ARGS: &[&str] = &["-selection", "clipboard"];

#[cfg(not(any(target_os = "macos", windows)))]
const XSEL_ARGS: &[&str] = &["--clipboard", "--input"];

#[cfg(not(any(target_os = "macos", windows)))]
fn platform_candidates() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("wl-copy", NO_ARGS),
        ("xclip", XCLIP_ARGS),
        ("xsel", XSEL_ARGS),
    ]
}

/// In-memory clipboard, useful for tests and headless sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    writes: usize,
}

impl MemoryClipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Last text written
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        self.writes += 1;
        Ok(())
    }
}
