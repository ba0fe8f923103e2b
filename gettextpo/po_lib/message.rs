//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Catalog messages
//!
//! A [`PoEntry`] is the plain value of one message as it appears in a .po
//! file.  A [`Message`] is a shared handle to an entry: handles obtained by
//! iterating a catalog refer to the catalog's own message, so setters act
//! on the catalog in place.  Handles compare equal only when they refer to
//! the same message.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::po_lib::catalog::CatalogData;
use crate::po_lib::check;
use crate::po_lib::diagnostic::{collect, Location};
use crate::po_lib::error::{finish, Error, Result, UsageError};
use crate::po_lib::plural::MAX_NPLURALS;

/// A single message entry from a .po file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoEntry {
    /// Translator comments (# ...)
    pub translator_comments: Vec<String>,
    /// Extracted comments (#. ...)
    pub extracted_comments: Vec<String>,
    /// Reference comments (#: file:line), one reference per element
    pub references: Vec<String>,
    /// Whether the entry is marked as fuzzy
    pub fuzzy: bool,
    /// Format flags in file order: ("c-format", true), ("python-format", false), ...
    pub formats: Vec<(String, bool)>,
    /// Any other flags (no-wrap, range: 1..5, ...)
    pub flags: Vec<String>,
    /// Previous context (#| msgctxt "...")
    pub previous_msgctxt: Option<String>,
    /// Previous msgid (#| msgid "...")
    pub previous_msgid: Option<String>,
    /// Previous plural msgid (#| msgid_plural "...")
    pub previous_msgid_plural: Option<String>,
    /// Message context
    pub msgctxt: Option<String>,
    /// Original string; `Some("")` for the header entry
    pub msgid: Option<String>,
    /// Plural original
    pub msgid_plural: Option<String>,
    /// Translation of a message without plural forms
    pub msgstr: Option<String>,
    /// Translations indexed by plural form
    pub msgstr_plural: Vec<String>,
    /// Whether this entry is obsolete (#~ ...)
    pub obsolete: bool,
}

impl PoEntry {
    /// Check if this is the header entry (empty msgid)
    pub fn is_header(&self) -> bool {
        self.msgid.as_deref() == Some("") && self.msgctxt.is_none()
    }

    /// Check if this is a plural entry
    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    /// Translation used to decide whether the entry is translated: the
    /// msgstr, or the first plural form.
    pub fn primary_msgstr(&self) -> Option<&str> {
        match self.msgstr {
            Some(ref msgstr) => Some(msgstr.as_str()),
            None => self.msgstr_plural.first().map(|s| s.as_str()),
        }
    }

    /// Format flag state: `Some(true)` for "c-format", `Some(false)` for
    /// "no-c-format", `None` when not mentioned.
    pub fn format(&self, format_type: &str) -> Option<bool> {
        self.formats
            .iter()
            .find(|(name, _)| name == format_type)
            .map(|(_, enabled)| *enabled)
    }

    /// Whether the "no-wrap" flag is present
    pub fn no_wrap(&self) -> bool {
        self.flags.iter().any(|f| f == "no-wrap")
    }
}

pub(crate) struct MessageData {
    pub(crate) entry: PoEntry,
    pub(crate) owner: Weak<RefCell<CatalogData>>,
    pub(crate) origin: Option<Location>,
}

/// Shared handle to a catalog message
#[derive(Clone)]
pub struct Message {
    pub(crate) inner: Rc<RefCell<MessageData>>,
}

impl Message {
    /// Create a new message that belongs to no catalog
    pub fn new() -> Self {
        Message::from_entry(PoEntry::default())
    }

    /// Create an ownerless message holding `entry`
    pub fn from_entry(entry: PoEntry) -> Self {
        Message {
            inner: Rc::new(RefCell::new(MessageData {
                entry,
                owner: Weak::new(),
                origin: None,
            })),
        }
    }

    pub(crate) fn with_origin(entry: PoEntry, origin: Location) -> Self {
        let message = Message::from_entry(entry);
        message.inner.borrow_mut().origin = Some(origin);
        message
    }

    /// Snapshot of the message fields
    pub fn entry(&self) -> PoEntry {
        self.inner.borrow().entry.clone()
    }

    pub(crate) fn with_entry<T>(&self, f: impl FnOnce(&PoEntry) -> T) -> T {
        f(&self.inner.borrow().entry)
    }

    fn update(&self, f: impl FnOnce(&mut PoEntry)) {
        f(&mut self.inner.borrow_mut().entry)
    }

    /// Where the message was read from, if it came from a file
    pub fn origin(&self) -> Option<Location> {
        self.inner.borrow().origin.clone()
    }

    /// Whether a live catalog holds this message
    pub fn is_owned(&self) -> bool {
        self.inner.borrow().owner.upgrade().is_some()
    }

    pub(crate) fn set_owner(&self, owner: Weak<RefCell<CatalogData>>) {
        self.inner.borrow_mut().owner = owner;
    }

    pub fn msgctxt(&self) -> Option<String> {
        self.with_entry(|e| e.msgctxt.clone())
    }

    pub fn set_msgctxt(&self, msgctxt: impl Into<String>) {
        let msgctxt = msgctxt.into();
        self.update(|e| e.msgctxt = Some(msgctxt));
    }

    pub fn clear_msgctxt(&self) {
        self.update(|e| e.msgctxt = None);
    }

    pub fn msgid(&self) -> Option<String> {
        self.with_entry(|e| e.msgid.clone())
    }

    pub fn set_msgid(&self, msgid: impl Into<String>) {
        let msgid = msgid.into();
        self.update(|e| e.msgid = Some(msgid));
    }

    pub fn clear_msgid(&self) {
        self.update(|e| e.msgid = None);
    }

    pub fn msgid_plural(&self) -> Option<String> {
        self.with_entry(|e| e.msgid_plural.clone())
    }

    pub fn set_msgid_plural(&self, msgid_plural: impl Into<String>) {
        let msgid_plural = msgid_plural.into();
        self.update(|e| e.msgid_plural = Some(msgid_plural));
    }

    /// Remove the plural msgid.  Plural translations go with it.
    pub fn clear_msgid_plural(&self) {
        self.update(|e| {
            e.msgid_plural = None;
            e.msgstr_plural.clear();
        });
    }

    pub fn msgstr(&self) -> Option<String> {
        self.with_entry(|e| e.msgstr.clone())
    }

    pub fn set_msgstr(&self, msgstr: impl Into<String>) {
        let msgstr = msgstr.into();
        self.update(|e| e.msgstr = Some(msgstr));
    }

    pub fn clear_msgstr(&self) {
        self.update(|e| e.msgstr = None);
    }

    /// Plural translations, in index order
    pub fn msgstr_plural(&self) -> Vec<String> {
        self.with_entry(|e| e.msgstr_plural.clone())
    }

    /// Set the translation for plural form `index`.  Missing lower forms
    /// are filled with empty strings.  `index` must be below
    /// `MAX_NPLURALS`.
    pub fn set_msgstr_plural(&self, index: usize, msgstr: impl Into<String>) -> Result<()> {
        if self.with_entry(|e| e.msgid_plural.is_none()) {
            return Err(Error::Usage(UsageError::NoPluralMsgid));
        }
        if index >= MAX_NPLURALS {
            return Err(Error::Usage(UsageError::PluralIndexOutOfRange(index)));
        }
        let msgstr = msgstr.into();
        self.update(|e| {
            if e.msgstr_plural.len() <= index {
                e.msgstr_plural.resize(index + 1, String::new());
            }
            e.msgstr_plural[index] = msgstr;
        });
        Ok(())
    }

    pub fn clear_msgstr_plural(&self) {
        self.update(|e| e.msgstr_plural.clear());
    }

    /// Translator comments, one line per comment line, each ending in '\n'
    pub fn comments(&self) -> String {
        self.with_entry(|e| join_lines(&e.translator_comments))
    }

    pub fn set_comments(&self, comments: &str) {
        let lines = split_lines(comments);
        self.update(|e| e.translator_comments = lines);
    }

    pub fn extracted_comments(&self) -> String {
        self.with_entry(|e| join_lines(&e.extracted_comments))
    }

    pub fn set_extracted_comments(&self, comments: &str) {
        let lines = split_lines(comments);
        self.update(|e| e.extracted_comments = lines);
    }

    pub fn references(&self) -> Vec<String> {
        self.with_entry(|e| e.references.clone())
    }

    /// Add a source reference; duplicates are ignored
    pub fn add_reference(&self, file: &str, line: Option<usize>) {
        let reference = match line {
            Some(line) => format!("{}:{}", file, line),
            None => file.to_string(),
        };
        self.update(|e| {
            if !e.references.contains(&reference) {
                e.references.push(reference);
            }
        });
    }

    pub fn remove_reference(&self, reference: &str) {
        self.update(|e| e.references.retain(|r| r != reference));
    }

    pub fn previous_msgctxt(&self) -> Option<String> {
        self.with_entry(|e| e.previous_msgctxt.clone())
    }

    pub fn set_previous_msgctxt(&self, value: Option<&str>) {
        self.update(|e| e.previous_msgctxt = value.map(str::to_string));
    }

    pub fn previous_msgid(&self) -> Option<String> {
        self.with_entry(|e| e.previous_msgid.clone())
    }

    pub fn set_previous_msgid(&self, value: Option<&str>) {
        self.update(|e| e.previous_msgid = value.map(str::to_string));
    }

    pub fn previous_msgid_plural(&self) -> Option<String> {
        self.with_entry(|e| e.previous_msgid_plural.clone())
    }

    pub fn set_previous_msgid_plural(&self, value: Option<&str>) {
        self.update(|e| e.previous_msgid_plural = value.map(str::to_string));
    }

    pub fn is_fuzzy(&self) -> bool {
        self.with_entry(|e| e.fuzzy)
    }

    pub fn set_fuzzy(&self, fuzzy: bool) {
        self.update(|e| e.fuzzy = fuzzy);
    }

    pub fn is_obsolete(&self) -> bool {
        self.with_entry(|e| e.obsolete)
    }

    pub fn set_obsolete(&self, obsolete: bool) {
        self.update(|e| e.obsolete = obsolete);
    }

    /// Whether `format_type` (e.g. "c-format") is marked enabled
    pub fn is_format(&self, format_type: &str) -> bool {
        self.with_entry(|e| e.format(format_type) == Some(true))
    }

    /// Mark `format_type` as enabled ("c-format") or disabled
    /// ("no-c-format").
    pub fn set_format(&self, format_type: &str, enabled: bool) {
        let format_type = format_type.strip_prefix("no-").unwrap_or(format_type);
        self.update(|e| {
            match e.formats.iter_mut().find(|(name, _)| name == format_type) {
                Some(slot) => slot.1 = enabled,
                None => e.formats.push((format_type.to_string(), enabled)),
            }
        });
    }

    /// Check that the format directives of the translation agree with the
    /// original string.
    ///
    /// Nothing is checked when msgid or msgstr is empty or absent, or when
    /// no format flag is enabled.
    pub fn check_format(&self) -> Result<()> {
        let entry = self.entry();
        if !check::needs_format_check(&entry) {
            return Ok(());
        }

        let (value, report) = collect(|sink| check::check_message_format(&entry, None, None, sink));
        finish(value, report, Error::Check)
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::new()
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Message {}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Message")
            .field("msgctxt", &data.entry.msgctxt)
            .field("msgid", &data.entry.msgid)
            .field("owned", &data.owner.upgrade().is_some())
            .finish()
    }
}

fn join_lines(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{}\n", l)).collect()
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
