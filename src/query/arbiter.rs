//! Edit-mode state machine deciding which query string is authoritative.
//!
//! ```text
//!              begin (seed buffer)
//!   Structured ───────────────────▶ Manual { buffer }
//!   { committed }◀─────────────────
//!              save (commit buffer)
//! ```
//!
//! A committed manual text is a one-shot override: the next structured edit
//! discards it and the compiled query is authoritative again.

use serde::{Deserialize, Serialize};

/// Current edit mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum EditMode {
    /// Output follows the compiler, unless a saved manual text is still in effect
    Structured { committed: Option<String> },

    /// Output is the free-text buffer
    Manual { buffer: String },
}

impl Default for EditMode {
    fn default() -> Self {
        EditMode::Structured { committed: None }
    }
}

/// Owns the edit mode and applies the reconciliation rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditArbiter {
    mode: EditMode,
}

impl EditArbiter {
    /// Start in structured mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    /// Whether the free-text buffer is authoritative
    pub fn is_manual(&self) -> bool {
        matches!(self.mode, EditMode::Manual { .. })
    }

    /// Buffer text while in manual mode
    pub fn buffer(&self) -> Option<&str> {
        match &self.mode {
            EditMode::Manual { buffer } => Some(buffer),
            EditMode::Structured { .. } => None,
        }
    }

    /// Structured-side query: the committed manual text if any, else `compiled`
    pub fn serialized<'a>(&'a self, compiled: &'a str) -> &'a str {
        match &self.mode {
            EditMode::Structured {
                committed: Some(text),
            } => text,
            _ => compiled,
        }
    }

    /// Query that downstream actions should use
    pub fn authoritative<'a>(&'a self, compiled: &'a str) -> &'a str {
        match &self.mode {
            EditMode::Manual { buffer } => buffer,
            EditMode::Structured { .. } => self.serialized(compiled),
        }
    }

    /// Enter manual mode, seeding the buffer with the current serialized query
    ///
    /// Returns `false` if already in manual mode.
    pub fn begin(&mut self, compiled: &str) -> bool {
        match &mut self.mode {
            EditMode::Manual { .. } => false,
            EditMode::Structured { committed } => {
                let buffer = committed.take().unwrap_or_else(|| compiled.to_string());
                tracing::debug!("Entering manual edit with {} chars", buffer.len());
                self.mode = EditMode::Manual { buffer };
                true
            }
        }
    }

    /// Replace the buffer text; ignored outside manual mode
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match &mut self.mode {
            EditMode::Manual { buffer } => {
                *buffer = text.into();
                true
            }
            EditMode::Structured { .. } => false,
        }
    }

    /// Leave manual mode, committing the buffer verbatim
    ///
    /// Returns `false` if not in manual mode.
    pub fn save(&mut self) -> bool {
        match std::mem::take(&mut self.mode) {
            EditMode::Manual { buffer } => {
                tracing::debug!("Committing manual query ({} chars)", buffer.len());
                self.mode = EditMode::Structured {
                    committed: Some(buffer),
                };
                true
            }
            structured => {
                self.mode = structured;
                false
            }
        }
    }

    /// Begin or save, whichever applies
    pub fn toggle(&mut self, compiled: &str) -> bool {
        if self.is_manual() {
            self.save()
        } else {
            self.begin(compiled)
        }
    }

    /// React to a structured edit: a committed override is superseded
    pub fn on_structured_edit(&mut self) {
        if let EditMode::Structured { committed } = &mut self.mode {
            if committed.take().is_some() {
                tracing::debug!("Structured edit superseded committed manual query");
            }
        }
    }
}
