//! Ordered diagnostics sink.
//!
//! Every error and warning found during a translation is appended here in
//! the order it was found. The sink is append-only; a compile has failed if
//! it holds at least one error.

use std::fmt;

use crate::{CompileError, CompileWarning, DiagnosticKind, Span};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Fails the compile.
    Error,
    /// Reported, does not fail the compile.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Rendered message, including the position.
    pub message: String,
    /// Position within the file, when known.
    pub span: Option<Span>,
    /// Source file, when known.
    pub file: Option<String>,
}

impl Diagnostic {
    /// Diagnostic for an error found in `file`.
    pub fn error(error: &CompileError, file: Option<&str>) -> Self {
        Self {
            severity: Severity::Error,
            kind: error.kind(),
            message: error.to_string(),
            span: Some(error.span()),
            file: file.map(str::to_string),
        }
    }

    /// Diagnostic for a warning found in `file`.
    pub fn warning(warning: &CompileWarning, file: Option<&str>) -> Self {
        Self {
            severity: Severity::Warning,
            kind: warning.kind(),
            message: warning.to_string(),
            span: Some(warning.span()),
            file: file.map(str::to_string),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}: ")?;
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Ordered, append-only collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    error_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.items.push(diagnostic);
    }

    /// Append an error.
    pub fn error(&mut self, error: &CompileError, file: Option<&str>) {
        self.push(Diagnostic::error(error, file));
    }

    /// Append a warning.
    pub fn warning(&mut self, warning: &CompileWarning, file: Option<&str>) {
        self.push(Diagnostic::warning(warning, file));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether any error was recorded (warnings alone do not count).
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.items.len() - self.error_count
    }

    /// All diagnostics in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    /// Diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}
