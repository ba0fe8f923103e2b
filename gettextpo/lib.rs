//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! posixutils-gettextpo library
//!
//! This library reads, inspects, modifies, checks and writes GNU gettext
//! PO catalogs:
//! - po_lib::catalog: catalogs, domains and message iteration
//! - po_lib::parser / po_lib::writer: PO text input and output
//! - po_lib::format: format string checks (c-format, python-format, ...)

pub mod po_lib;

pub use po_lib::catalog::Catalog;
pub use po_lib::diagnostic::{Diagnostic, DiagnosticReport, Location, Severity};
pub use po_lib::error::{Error, Result, UsageError};
pub use po_lib::iterator::MessageIterator;
pub use po_lib::message::{Message, PoEntry};
pub use po_lib::writer::WriteOptions;
