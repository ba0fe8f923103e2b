//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Diagnostic collection
//!
//! Reading, writing and checking a catalog report problems through a
//! [`DiagnosticSink`].  Warnings and errors accumulate; a fatal error stops
//! the operation by returning [`Fatal`], which callers propagate with `?`.
//!
//! Only one diagnostic session runs at a time in a process.  [`collect`]
//! holds the session lock for the duration of the operation.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Errors beyond this count abort the operation
pub const MAX_ERRORS: usize = 20;

static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
    /// Aborts the operation that reported it
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal error"),
        }
    }
}

/// Position in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// File name, if the source was a file
    pub file: Option<String>,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, 0 when unknown
    pub column: usize,
}

impl Location {
    pub fn new(file: Option<&str>, line: usize, column: usize) -> Self {
        Location {
            file: file.map(str::to_string),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.as_deref().unwrap_or("<string>"), self.line)?;
        if self.column > 0 {
            write!(f, ":{}", self.column)?;
        }
        Ok(())
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Option<Location>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref location) = self.location {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Marker returned when a fatal diagnostic has been reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fatal;

/// Accumulates the diagnostics of one operation
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    /// Record a warning
    pub fn warning(&mut self, location: Option<Location>, message: impl Into<String>) {
        self.push(Severity::Warning, location, message.into());
    }

    /// Record an error.  Fails once too many errors have been seen.
    pub fn error(
        &mut self,
        location: Option<Location>,
        message: impl Into<String>,
    ) -> Result<(), Fatal> {
        self.push(Severity::Error, location.clone(), message.into());
        self.errors += 1;
        if self.errors > MAX_ERRORS {
            return Err(self.fatal(location, "too many errors, aborting"));
        }
        Ok(())
    }

    /// Record a fatal error; the caller must abort with the returned marker
    pub fn fatal(&mut self, location: Option<Location>, message: impl Into<String>) -> Fatal {
        self.push(Severity::Fatal, location, message.into());
        Fatal
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn push(&mut self, severity: Severity, location: Option<Location>, message: String) {
        log::debug!("diagnostic: {} {:?}: {}", severity, location, message);
        self.diagnostics.push(Diagnostic {
            severity,
            location,
            message,
        });
    }

    pub fn into_report(self) -> DiagnosticReport {
        DiagnosticReport {
            diagnostics: self.diagnostics,
        }
    }
}

/// All diagnostics of a failed operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Message texts joined by newlines
    pub fn message(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the operation was aborted by a fatal error
    pub fn is_fatal(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Fatal)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Run `op` inside the process-wide diagnostic session.
///
/// Returns the value produced by `op` (`None` after a fatal error) together
/// with everything that was reported.  The session lock is released on
/// every exit path, including unwinding out of `op`.
pub fn collect<T, F>(op: F) -> (Option<T>, DiagnosticReport)
where
    F: FnOnce(&mut DiagnosticSink) -> Result<T, Fatal>,
{
    let _session = SESSION_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let mut sink = DiagnosticSink::new();
    let value = match op(&mut sink) {
        Ok(value) => Some(value),
        Err(Fatal) => {
            log::debug!("operation aborted after {} diagnostics", sink.len());
            None
        }
    };

    (value, sink.into_report())
}
