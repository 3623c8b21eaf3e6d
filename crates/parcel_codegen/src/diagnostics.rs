//! Where the generator reports problems found in the scanned sources.
//!
//! Diagnostics never abort a run by themselves. Hosts with errors are left
//! out of the generated code, warnings only drop the offending field.

use core::fmt;
use std::io::{self, Write};

// -----------------------------------------------------------------------------
// Diagnostic

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One reported problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// The declaration the problem was found on, as described by
    /// [`Program::describe`](crate::program::Program::describe).
    pub location: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at {location})")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Diagnostics

/// A sink for [`Diagnostic`]s.
pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);

    fn error(&mut self, message: String, location: Option<String>) {
        self.report(Diagnostic {
            severity: Severity::Error,
            message,
            location,
        });
    }

    fn warning(&mut self, message: String, location: Option<String>) {
        self.report(Diagnostic {
            severity: Severity::Warning,
            message,
            location,
        });
    }
}

/// Forwards every diagnostic to the [`log`] facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Error => log::error!("{diagnostic}"),
        }
    }
}

/// Prints diagnostics as `cargo:warning=` lines from a build script.
///
/// Cargo has no way to surface an error from a build script other than
/// failing it, so errors are printed as warnings too and counted. The
/// build script decides whether [`has_errors`](Self::has_errors) fails the
/// build.
#[derive(Debug)]
pub struct CargoDiagnostics<W: Write = io::Stdout> {
    out: W,
    errors: usize,
    warnings: usize,
}

impl CargoDiagnostics {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for CargoDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> CargoDiagnostics<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            errors: 0,
            warnings: 0,
        }
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    #[inline]
    pub fn errors(&self) -> usize {
        self.errors
    }

    #[inline]
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Diagnostics for CargoDiagnostics<W> {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
        // One instruction per line, cargo ignores the rest of a broken line.
        let line = diagnostic.to_string().replace(['\r', '\n'], " ");
        if let Err(err) = writeln!(self.out, "cargo:warning={line}") {
            log::error!("Failed to print diagnostic `{line}`: {err}");
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectDiagnostics {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

impl Diagnostics for CollectDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
