//! Operation context passed to every lifecycle call
//!
//! The context carries the preview flag and collects diagnostics that are
//! sent back to the orchestrator alongside the operation result.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic reported during an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Warning,
}

/// A message reported back to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Context passed to resource lifecycle operations
#[derive(Debug, Default)]
pub struct OperationContext {
    /// Whether this is a preview (no filesystem mutation allowed)
    pub dry_run: bool,
    diagnostics: Vec<Diagnostic>,
}

impl OperationContext {
    /// Create a new context
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            diagnostics: Vec::new(),
        }
    }

    /// Context for an applying (non-preview) operation
    pub fn apply() -> Self {
        Self::new(false)
    }

    /// Context for a preview operation
    pub fn preview() -> Self {
        Self::new(true)
    }

    /// Whether the operation must suppress its mutating effect
    pub fn is_preview(&self) -> bool {
        self.dry_run
    }

    /// Record a debug diagnostic
    pub fn debug(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}", message);
        self.push(Severity::Debug, message);
    }

    /// Record a warning diagnostic
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.push(Severity::Warning, message);
    }

    /// Diagnostics recorded so far, in order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, returning its diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Whether any warning was recorded
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning)
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.diagnostics.push(Diagnostic { severity, message });
    }
}
