//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Message and catalog checks

use crate::po_lib::catalog::Domain;
use crate::po_lib::diagnostic::{DiagnosticSink, Fatal, Location};
use crate::po_lib::format;
use crate::po_lib::header;
use crate::po_lib::message::PoEntry;
use crate::po_lib::plural::PluralForms;

/// Whether `check_message_format` has anything to do for `entry`.
///
/// Untranslated messages, messages with an empty msgid and messages
/// without an enabled format flag are never checked.
pub fn needs_format_check(entry: &PoEntry) -> bool {
    let has_msgid = entry.msgid.as_deref().is_some_and(|s| !s.is_empty());
    let translated = entry.primary_msgstr().is_some_and(|s| !s.is_empty());
    has_msgid && translated && entry.formats.iter().any(|(_, enabled)| *enabled)
}

/// Check every enabled format flag of `entry`
pub fn check_message_format(
    entry: &PoEntry,
    distribution: Option<&[bool]>,
    location: Option<&Location>,
    sink: &mut DiagnosticSink,
) -> Result<(), Fatal> {
    for (format_type, enabled) in &entry.formats {
        if *enabled {
            format::check_format_type(format_type, entry, distribution, location, sink)?;
        }
    }
    Ok(())
}

/// Leading and trailing newlines of a translation must match the msgid
fn check_newlines(
    entry: &PoEntry,
    location: Option<&Location>,
    sink: &mut DiagnosticSink,
) -> Result<(), Fatal> {
    let Some(msgid) = entry.msgid.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let mut translations: Vec<(String, &str, &str)> = Vec::new();
    if entry.is_plural() {
        let msgid_plural = entry.msgid_plural.as_deref().unwrap_or(msgid);
        for (index, text) in entry.msgstr_plural.iter().enumerate() {
            let source = if index == 0 { "msgid" } else { "msgid_plural" };
            let original = if index == 0 { msgid } else { msgid_plural };
            translations.push((format!("{}' and 'msgstr[{}]", source, index), original, text.as_str()));
        }
    } else if let Some(ref msgstr) = entry.msgstr {
        translations.push(("msgid' and 'msgstr".to_string(), msgid, msgstr.as_str()));
    }

    for (names, original, text) in translations {
        if text.is_empty() {
            continue;
        }
        if original.starts_with('\n') != text.starts_with('\n') {
            let message = format!("'{}' entries do not both begin with '\\n'", names);
            sink.error(location.cloned(), message)?;
        }
        if original.ends_with('\n') != text.ends_with('\n') {
            let message = format!("'{}' entries do not both end with '\\n'", names);
            sink.error(location.cloned(), message)?;
        }
    }
    Ok(())
}

/// Validate the Plural-Forms header of a domain.  Returns the parsed
/// forms when they are usable for further checks.
fn check_plural_header(
    domain: &Domain,
    sink: &mut DiagnosticSink,
) -> Result<Option<PluralForms>, Fatal> {
    let header_location = domain.header_message().and_then(|m| m.origin());
    let plural_header = domain.header().as_deref().and_then(header::plural_forms);

    let Some(value) = plural_header else {
        let first_plural = domain
            .messages
            .iter()
            .find(|m| m.with_entry(|e| e.is_plural() && !e.obsolete));
        if let Some(message) = first_plural {
            sink.error(
                message.origin().or(header_location),
                "message catalog has plural form translations, but lacks a header entry with \"Plural-Forms: nplurals=INTEGER; plural=EXPRESSION;\"",
            )?;
        }
        return Ok(None);
    };

    let forms = match PluralForms::parse(&value) {
        Ok(forms) => forms,
        Err(e) => {
            sink.error(header_location, format!("invalid Plural-Forms: {}", e))?;
            return Ok(None);
        }
    };

    match forms.max_value() {
        Ok(max) if max >= forms.nplurals as u64 => {
            let message = format!(
                "nplurals = {} but plural expression can produce values as large as {}",
                forms.nplurals, max
            );
            sink.error(header_location, message)?;
            Ok(None)
        }
        Ok(_) => Ok(Some(forms)),
        Err(e) => {
            sink.error(header_location, format!("invalid Plural-Forms: {}", e))?;
            Ok(None)
        }
    }
}

/// Run every catalog-wide check on one domain
pub(crate) fn check_domain(domain: &Domain, sink: &mut DiagnosticSink) -> Result<(), Fatal> {
    log::debug!("checking domain {}", domain.name);

    let forms = check_plural_header(domain, sink)?;
    let distribution = match forms {
        Some(ref forms) => forms.distribution().ok(),
        None => None,
    };

    for message in &domain.messages {
        let entry = message.entry();
        if entry.obsolete || entry.is_header() {
            continue;
        }
        let location = message.origin();

        if let Some(ref forms) = forms {
            let count = entry.msgstr_plural.len();
            if entry.is_plural() && count != forms.nplurals {
                let text = format!(
                    "number of plural translations ({}) does not match nplurals = {}",
                    count, forms.nplurals
                );
                sink.error(location.clone(), text)?;
            }
        }

        check_newlines(&entry, location.as_ref(), sink)?;

        if needs_format_check(&entry) {
            check_message_format(&entry, distribution.as_deref(), location.as_ref(), sink)?;
        }
    }
    Ok(())
}
