//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! .po file output
//!
//! Entries are written in catalog order, separated by blank lines.  Long
//! strings are broken into continuation lines after embedded newlines and
//! at spaces, starting with an empty `keyword ""` line.

use std::collections::HashSet;

use crate::po_lib::catalog::CatalogData;
use crate::po_lib::diagnostic::{DiagnosticSink, Fatal};
use crate::po_lib::message::PoEntry;
use crate::po_lib::DEFAULT_DOMAIN;

/// Output layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Maximum line width, including quotes and prefixes
    pub width: usize,
    /// Break long strings at spaces; when false, strings are only broken
    /// after newlines
    pub wrap: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            width: 79,
            wrap: true,
        }
    }
}

/// Render `data` as .po text.
///
/// Messages that can not be represented are reported as errors and left
/// out of the text.
pub fn render(
    data: &CatalogData,
    options: &WriteOptions,
    sink: &mut DiagnosticSink,
) -> Result<String, Fatal> {
    let mut blocks: Vec<String> = Vec::new();

    for domain in data.domains.iter().filter(|d| !d.messages.is_empty()) {
        if !(blocks.is_empty() && domain.name == DEFAULT_DOMAIN) {
            blocks.push(format!("domain \"{}\"\n", escape(&domain.name)));
        }

        let mut seen: HashSet<(Option<String>, String)> = HashSet::new();
        for message in &domain.messages {
            let entry = message.entry();
            let location = message.origin();

            let Some(ref msgid) = entry.msgid else {
                sink.error(location, "message has no 'msgid'")?;
                continue;
            };
            if entry.msgid_plural.is_none() && !entry.msgstr_plural.is_empty() {
                sink.error(
                    location,
                    "message has plural translations but no 'msgid_plural'",
                )?;
                continue;
            }
            if entry.msgid_plural.is_some() && entry.msgstr.is_some() {
                sink.error(location, "message has 'msgid_plural' but a singular 'msgstr'")?;
                continue;
            }
            if !entry.obsolete && !seen.insert((entry.msgctxt.clone(), msgid.clone())) {
                sink.error(location, "duplicate message definition")?;
                continue;
            }

            blocks.push(render_entry(&entry, options));
        }
    }

    log::debug!("rendered {} blocks", blocks.len());
    Ok(blocks.join("\n"))
}

/// Render one entry, ending with a newline
pub fn render_entry(entry: &PoEntry, options: &WriteOptions) -> String {
    let mut out = String::new();
    let wrap = options.wrap && !entry.no_wrap();
    let width = options.width;

    for comment in &entry.translator_comments {
        if comment.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str(&format!("# {}\n", comment));
        }
    }
    for comment in &entry.extracted_comments {
        out.push_str(&format!("#. {}\n", comment));
    }
    write_references(&mut out, &entry.references, width);

    let mut flags: Vec<String> = Vec::new();
    if entry.fuzzy {
        flags.push("fuzzy".to_string());
    }
    for (name, enabled) in &entry.formats {
        flags.push(if *enabled {
            name.clone()
        } else {
            format!("no-{}", name)
        });
    }
    flags.extend(entry.flags.iter().cloned());
    if !flags.is_empty() {
        out.push_str(&format!("#, {}\n", flags.join(", ")));
    }

    let previous_prefix = if entry.obsolete { "#~| " } else { "#| " };
    let previous = [
        ("msgctxt", &entry.previous_msgctxt),
        ("msgid", &entry.previous_msgid),
        ("msgid_plural", &entry.previous_msgid_plural),
    ];
    for (keyword, value) in previous {
        if let Some(value) = value {
            write_string(&mut out, previous_prefix, keyword, value, width, wrap);
        }
    }

    let prefix = if entry.obsolete { "#~ " } else { "" };
    if let Some(ref msgctxt) = entry.msgctxt {
        write_string(&mut out, prefix, "msgctxt", msgctxt, width, wrap);
    }
    let msgid = entry.msgid.as_deref().unwrap_or_default();
    write_string(&mut out, prefix, "msgid", msgid, width, wrap);

    match entry.msgid_plural {
        Some(ref msgid_plural) => {
            write_string(&mut out, prefix, "msgid_plural", msgid_plural, width, wrap);
            if entry.msgstr_plural.is_empty() {
                write_string(&mut out, prefix, "msgstr[0]", "", width, wrap);
                write_string(&mut out, prefix, "msgstr[1]", "", width, wrap);
            }
            for (index, msgstr) in entry.msgstr_plural.iter().enumerate() {
                let keyword = format!("msgstr[{}]", index);
                write_string(&mut out, prefix, &keyword, msgstr, width, wrap);
            }
        }
        None => {
            let msgstr = entry.msgstr.as_deref().unwrap_or_default();
            write_string(&mut out, prefix, "msgstr", msgstr, width, wrap);
        }
    }

    out
}

/// "#: a.c:1 b.c:2", filled up to `width`
fn write_references(out: &mut String, references: &[String], width: usize) {
    let mut line = String::new();
    for reference in references {
        if !line.is_empty() && line.len() + 1 + reference.len() > width {
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if line.is_empty() {
            line.push_str("#:");
        }
        line.push(' ');
        line.push_str(reference);
    }
    if !line.is_empty() {
        out.push_str(&line);
        out.push('\n');
    }
}

/// Write `keyword "value"`, broken into continuation lines if needed
fn write_string(
    out: &mut String,
    prefix: &str,
    keyword: &str,
    value: &str,
    width: usize,
    wrap: bool,
) {
    let escaped = escape(value);
    let single = format!("{}{} \"{}\"", prefix, keyword, escaped);

    // room for the text of a continuation line, inside its quotes
    let room = width.saturating_sub(prefix.chars().count() + 2).max(1);
    let mut pieces: Vec<String> = Vec::new();
    for segment in value.split_inclusive('\n') {
        let segment = escape(segment);
        if wrap {
            break_at_spaces(&segment, room, &mut pieces);
        } else {
            pieces.push(segment);
        }
    }

    if pieces.len() <= 1 && (!wrap || single.chars().count() <= width) {
        out.push_str(&single);
        out.push('\n');
        return;
    }

    out.push_str(&format!("{}{} \"\"\n", prefix, keyword));
    for piece in pieces {
        out.push_str(&format!("{}\"{}\"\n", prefix, piece));
    }
}

/// Split `text` into pieces of at most `room` characters, breaking after
/// spaces.  Words longer than `room` get a piece of their own.
fn break_at_spaces(text: &str, room: usize, pieces: &mut Vec<String>) {
    let mut line = String::new();
    let mut line_len = 0;
    for word in text.split_inclusive(' ') {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + word_len > room {
            pieces.push(std::mem::take(&mut line));
            line_len = 0;
        }
        line.push_str(word);
        line_len += word_len;
    }
    if !line.is_empty() {
        pieces.push(line);
    }
}

/// Escape a string for use inside a PO string literal
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\u{07}' => result.push_str("\\a"),
            '\u{08}' => result.push_str("\\b"),
            '\u{0c}' => result.push_str("\\f"),
            '\u{0b}' => result.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                result.push_str(&format!("\\{:03o}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
