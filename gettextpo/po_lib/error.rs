//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use crate::po_lib::diagnostic::DiagnosticReport;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed input while reading a catalog
    #[error("{0}")]
    Parse(DiagnosticReport),
    /// Catalog could not be serialized
    #[error("{0}")]
    Write(DiagnosticReport),
    /// Format strings or catalog consistency checks failed
    #[error("{0}")]
    Check(DiagnosticReport),
    #[error(transparent)]
    Usage(#[from] UsageError),
}

/// Misuse of the API, detected before anything is modified
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("message is already owned by a catalog")]
    AlreadyOwned,
    #[error("can not set plural msgstr with no plural msgid")]
    NoPluralMsgid,
    #[error("plural form index {0} is out of range")]
    PluralIndexOutOfRange(usize),
}

impl Error {
    /// Diagnostics carried by the error, if any
    pub fn report(&self) -> Option<&DiagnosticReport> {
        match self {
            Error::Parse(report) | Error::Write(report) | Error::Check(report) => Some(report),
            Error::Usage(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Turn the outcome of a diagnostic session into a result: any diagnostic
/// at all fails the operation.
pub(crate) fn finish<T>(
    value: Option<T>,
    report: DiagnosticReport,
    kind: fn(DiagnosticReport) -> Error,
) -> Result<T> {
    match value {
        Some(value) if report.is_empty() => Ok(value),
        _ => Err(kind(report)),
    }
}
