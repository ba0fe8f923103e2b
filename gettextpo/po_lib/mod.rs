//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! PO catalog library
//!
//! This module provides the in-memory model of .po files (catalogs,
//! domains, messages), a parser and a writer for the PO text format,
//! evaluation of Plural-Forms expressions, and checks of format strings
//! in translations.

pub mod catalog;
pub mod check;
pub mod diagnostic;
pub mod error;
pub mod format;
pub mod header;
pub mod iterator;
pub mod message;
pub mod parser;
pub mod plural;
pub mod writer;

/// Name of the domain used before any `domain` directive
pub const DEFAULT_DOMAIN: &str = "messages";
