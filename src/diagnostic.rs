//! Diagnostic collection for the compiler front end.
//!
//! Syntax and lexical errors are accumulated here instead of aborting the
//! parse, so a single run can surface several errors. The engine is created
//! fresh per compilation; nothing is shared between runs.

use std::fmt;

/// A single diagnostic, anchored to a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({}): {}", self.line, self.message)
    }
}

/// Collects diagnostics and tracks the error count for one compilation.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        DiagnosticEngine {
            diagnostics: Vec::new(),
        }
    }

    /// Record an error at the given source line.
    pub fn report(&mut self, line: u32, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            line,
            message: message.into(),
        });
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print every collected diagnostic to stderr, one line each.
    pub fn print_all(&self) {
        for diag in &self.diagnostics {
            eprintln!("{}", diag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_renders_line_prefix() {
        let diag = Diagnostic {
            line: 7,
            message: "missing ';' after return statement".to_string(),
        };
        assert_eq!(diag.to_string(), "Line(7): missing ';' after return statement");
    }

    #[test]
    fn engine_counts_reports() {
        let mut diag = DiagnosticEngine::new();
        assert!(!diag.has_errors());
        diag.report(1, "first");
        diag.report(3, "second");
        assert_eq!(diag.error_count(), 2);
        assert_eq!(diag.diagnostics()[1].line, 3);
    }
}
