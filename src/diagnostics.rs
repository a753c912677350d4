//! Source locations and the diagnostic sink.
//!
//! Components never print on their own. Anything user-facing is pushed into a
//! [`Diagnostics`] value owned by the caller, which keeps every record for
//! later inspection and can echo them to stderr as they arrive.

use crate::theme::DEFAULT_THEME;
use crossterm::style::Stylize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Implemented by every error type that is anchored to a source location.
pub trait Located {
    fn location(&self) -> SourceLocation;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single reported message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{} at line {}, column {}: {}",
            label, self.location.line, self.location.column, self.message
        )
    }
}

/// Collects diagnostics, optionally echoing them to stderr.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    file: Option<String>,
    echo: bool,
}

impl Diagnostics {
    /// A silent sink; entries are only recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that also prints every entry to stderr with colors.
    pub fn stderr() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Name of the source file shown in rendered diagnostics.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn error(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            location,
        });
    }

    pub fn warning(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            location,
        });
    }

    /// Records an error value using its own message and location.
    pub fn report<E: fmt::Display + Located>(&mut self, err: &E) {
        self.error(err.location(), err.to_string());
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.echo {
            eprintln!("{}", self.render(&diagnostic));
        }
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Messages only, in report order
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.message.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Terminal rendering: `file:line:column: error: message`
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let theme = &DEFAULT_THEME;
        let origin = match &self.file {
            Some(file) => format!("{}:{}:", file, diagnostic.location),
            None => format!("{}:", diagnostic.location),
        };
        let label = match diagnostic.severity {
            Severity::Error => "error:".with(theme.error).bold(),
            Severity::Warning => "warning:".with(theme.warning).bold(),
        };
        format!(
            "{} {} {}",
            origin.with(theme.location),
            label,
            diagnostic.message.as_str().with(theme.message)
        )
    }
}
