//! Diagnostic accumulation while an element is being built.
//!
//! The lexer and parser collect diagnostics for the element under
//! construction in a bag, then hand the contents to the element's
//! constructor. Nothing outlives the element it describes.

use crate::{Diagnostic, ErrorCode, Severity};

/// Collects the diagnostics for a single syntax element.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        DiagnosticBag::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Shorthand for `push(Diagnostic::new(code, offset, width))`.
    pub fn report(&mut self, code: ErrorCode, offset: u32, width: u32) -> &mut Diagnostic {
        self.items.push(Diagnostic::new(code, offset, width));
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Drain the bag, leaving it empty for the next element.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.items)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
