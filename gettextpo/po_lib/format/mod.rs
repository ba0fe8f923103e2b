//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Format string checks
//!
//! A message flagged with e.g. `c-format` carries printf-like directives.
//! Its translations must consume the same arguments in compatible ways.
//! Each family of format strings implements [`FormatFamily`]; the entry
//! point for a single flag is [`check_format_type`].

pub mod brace;
pub mod c;
pub mod python;

use crate::po_lib::diagnostic::{DiagnosticSink, Fatal, Location};
use crate::po_lib::message::PoEntry;

/// Names of the two strings being compared, as shown in diagnostics
#[derive(Debug, Clone, Copy)]
pub struct Names<'a> {
    /// "msgid" or "msgid_plural"
    pub source: &'a str,
    /// "msgstr" or "msgstr[N]"
    pub translation: &'a str,
}

impl Names<'_> {
    pub fn count_mismatch(&self) -> String {
        format!(
            "number of format specifications in '{}' and '{}' does not match",
            self.source, self.translation
        )
    }

    pub fn argument_mismatch(&self, argument: impl std::fmt::Display) -> String {
        format!(
            "format specifications in '{}' and '{}' for argument {} are not the same",
            self.source, self.translation, argument
        )
    }

    /// The translation uses an argument the source does not have
    pub fn extra_argument(&self, name: &str) -> String {
        format!(
            "a format specification for argument '{}', as in '{}', doesn't exist in '{}'",
            name, self.translation, self.source
        )
    }

    /// The translation leaves out an argument of the source
    pub fn missing_argument(&self, name: &str) -> String {
        format!(
            "a format specification for argument '{}' doesn't exist in '{}'",
            name, self.translation
        )
    }
}

/// One family of format strings
pub trait FormatFamily {
    /// Arguments consumed by a format string
    type Spec;

    /// Language name used in diagnostics, e.g. "C"
    const LANGUAGE: &'static str;

    /// Parse the directives of `text`.  The error is a sentence describing
    /// why the string is invalid.
    fn parse(text: &str) -> Result<Self::Spec, String>;

    /// Compare the directives of a translation against its source.  With
    /// `strict`, the translation must consume every source argument.
    fn compare(
        source: &Self::Spec,
        translation: &Self::Spec,
        strict: bool,
        names: Names<'_>,
    ) -> Vec<String>;
}

/// Check `entry` against the format family `F`.
///
/// `distribution` tells for each plural form whether it is used for more
/// than one count; such forms are compared strictly, and forms beyond it
/// leniently.  Without it, plural
/// messages with at least two translations are compared leniently.
pub fn check_with<F: FormatFamily>(
    entry: &PoEntry,
    distribution: Option<&[bool]>,
    location: Option<&Location>,
    sink: &mut DiagnosticSink,
) -> Result<(), Fatal> {
    let (source_name, source) = match (&entry.msgid_plural, &entry.msgid) {
        (Some(plural), _) => ("msgid_plural", plural.as_str()),
        (None, Some(msgid)) => ("msgid", msgid.as_str()),
        (None, None) => return Ok(()),
    };

    let source_spec = match F::parse(source) {
        Ok(spec) => spec,
        Err(reason) => {
            log::debug!(
                "'{}' is not a valid {} format string: {}",
                source_name,
                F::LANGUAGE,
                reason
            );
            return Ok(());
        }
    };

    let mut translations: Vec<(String, &str, bool)> = Vec::new();
    if entry.is_plural() {
        let count = entry.msgstr_plural.len();
        for (index, text) in entry.msgstr_plural.iter().enumerate() {
            let strict = match distribution {
                Some(often) => often.get(index).copied().unwrap_or(false),
                None => count < 2,
            };
            translations.push((format!("msgstr[{}]", index), text.as_str(), strict));
        }
    } else if let Some(ref msgstr) = entry.msgstr {
        translations.push(("msgstr".to_string(), msgstr.as_str(), true));
    }

    for (name, text, strict) in translations {
        if text.is_empty() {
            continue;
        }
        let names = Names {
            source: source_name,
            translation: &name,
        };
        match F::parse(text) {
            Ok(spec) => {
                for problem in F::compare(&source_spec, &spec, strict, names) {
                    sink.error(location.cloned(), problem)?;
                }
            }
            Err(reason) => {
                let message = format!(
                    "'{}' is not a valid {} format string, unlike '{}'. Reason: {}",
                    name,
                    F::LANGUAGE,
                    source_name,
                    reason
                );
                sink.error(location.cloned(), message)?;
            }
        }
    }

    Ok(())
}

/// Check `entry` for one format flag.  Unknown types pass.
pub fn check_format_type(
    format_type: &str,
    entry: &PoEntry,
    distribution: Option<&[bool]>,
    location: Option<&Location>,
    sink: &mut DiagnosticSink,
) -> Result<(), Fatal> {
    match format_type {
        "c-format" => check_with::<c::CFormat>(entry, distribution, location, sink),
        "python-format" => check_with::<python::PythonFormat>(entry, distribution, location, sink),
        "python-brace-format" => {
            check_with::<brace::PythonBraceFormat>(entry, distribution, location, sink)
        }
        other => {
            log::debug!("no checker for {}, skipping", other);
            Ok(())
        }
    }
}
