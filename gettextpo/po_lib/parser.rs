//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! .po (Portable Object) file parser
//!
//! PO file format:
//! - Comments: lines starting with #
//!   - #  - translator comments
//!   - #. - extracted comments
//!   - #: - reference (file:line)
//!   - #, - flags (fuzzy, c-format, etc.)
//!   - #| - previous msgctxt / msgid / msgid_plural
//!   - #~ - obsolete entry (the rest of the line is parsed as usual)
//! - domain "name" - following entries belong to domain "name"
//! - msgctxt "context" - message context (optional)
//! - msgid "original" - original string
//! - msgid_plural "plural" - plural original (optional)
//! - msgstr "translation" - translation (for singular)
//! - msgstr[N] "translation" - plural translations
//!
//! Problems are reported to a [`DiagnosticSink`]; parsing goes on after
//! errors so that one pass reports as much as possible.

use std::collections::HashMap;

use crate::po_lib::diagnostic::{DiagnosticSink, Fatal, Location};
use crate::po_lib::header;
use crate::po_lib::message::PoEntry;
use crate::po_lib::DEFAULT_DOMAIN;

/// Entries of one domain, in file order
#[derive(Debug, Clone, Default)]
pub struct ParsedDomain {
    pub name: String,
    pub entries: Vec<(PoEntry, Location)>,
}

/// Which string a continuation line appends to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Stage {
    /// Only comments seen so far
    #[default]
    Comments,
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
    MsgstrPlural(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreviousField {
    Msgctxt,
    Msgid,
    MsgidPlural,
}

/// Parser for .po files
pub struct PoParser<'a> {
    text: &'a str,
    file: Option<&'a str>,
    sink: &'a mut DiagnosticSink,
    line_number: usize,
    entry: PoEntry,
    entry_start: Option<Location>,
    stage: Stage,
    previous: Option<PreviousField>,
    domains: Vec<ParsedDomain>,
    current_domain: String,
    /// (domain, msgctxt, msgid) -> line of first definition
    seen: HashMap<(String, Option<String>, String), usize>,
}

/// Parse PO source bytes.  Input that is not UTF-8 is fatal.
pub fn parse_bytes(
    bytes: &[u8],
    file: Option<&str>,
    sink: &mut DiagnosticSink,
) -> Result<Vec<ParsedDomain>, Fatal> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_str(text, file, sink),
        Err(e) => {
            let valid = &bytes[..e.valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            Err(sink.fatal(
                Some(Location::new(file, line, 0)),
                "invalid multibyte sequence: the input is not valid UTF-8",
            ))
        }
    }
}

/// Parse PO source text
pub fn parse_str(
    text: &str,
    file: Option<&str>,
    sink: &mut DiagnosticSink,
) -> Result<Vec<ParsedDomain>, Fatal> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    PoParser::new(text, file, sink).parse()
}

impl<'a> PoParser<'a> {
    pub fn new(text: &'a str, file: Option<&'a str>, sink: &'a mut DiagnosticSink) -> Self {
        PoParser {
            text,
            file,
            sink,
            line_number: 0,
            entry: PoEntry::default(),
            entry_start: None,
            stage: Stage::Comments,
            previous: None,
            domains: Vec::new(),
            current_domain: DEFAULT_DOMAIN.to_string(),
            seen: HashMap::new(),
        }
    }

    /// Parse the .po text
    pub fn parse(mut self) -> Result<Vec<ParsedDomain>, Fatal> {
        let text = self.text;
        for (index, line) in text.lines().enumerate() {
            self.line_number = index + 1;
            self.parse_line(line)?;
        }
        self.finish_entry()?;

        if self.entry != PoEntry::default() {
            log::debug!("dropping comments after the last entry");
        }

        self.check_headers();
        log::debug!(
            "parsed {} entries in {} domains",
            self.domains.iter().map(|d| d.entries.len()).sum::<usize>(),
            self.domains.len()
        );
        Ok(self.domains)
    }

    fn location(&self, column: usize) -> Option<Location> {
        Some(Location::new(self.file, self.line_number, column))
    }

    fn error_at(&mut self, line: &str, byte: usize, message: &str) -> Result<(), Fatal> {
        let location = self.location(column(line, byte));
        self.sink.error(location, message)
    }

    fn parse_line(&mut self, line: &str) -> Result<(), Fatal> {
        let trimmed = line.trim_start();
        let (obsolete, content) = match trimmed.strip_prefix("#~") {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        if content.is_empty() {
            return Ok(());
        }

        let comment = match content.strip_prefix('#') {
            Some(rest) => Some(rest),
            // "#~| msgid ..." is a previous-msgid comment of an obsolete entry
            None if obsolete && content.starts_with('|') => Some(content),
            None => None,
        };
        if let Some(rest) = comment {
            return self.parse_comment(line, rest);
        }
        self.previous = None;

        let offset = line.len() - content.len();
        if content.starts_with('"') {
            return self.parse_continuation(line, offset);
        }

        let keyword_len = content
            .find(|c: char| c.is_whitespace() || c == '"')
            .unwrap_or(content.len());
        let keyword = &content[..keyword_len];
        let value_offset = offset + keyword_len;

        match keyword {
            "domain" => self.parse_domain(line, value_offset),
            "msgctxt" => self.parse_msgctxt(line, offset, value_offset, obsolete),
            "msgid" => self.parse_msgid(line, value_offset, obsolete),
            "msgid_plural" => self.parse_msgid_plural(line, offset, value_offset),
            "msgstr" => self.parse_msgstr(line, offset, value_offset),
            _ => match keyword
                .strip_prefix("msgstr[")
                .and_then(|rest| rest.strip_suffix(']'))
            {
                Some(index) => self.parse_msgstr_plural(line, offset, index, value_offset),
                None => self.error_at(line, offset, "syntax error"),
            },
        }
    }

    /// Parse a comment line; `rest` follows the '#'
    fn parse_comment(&mut self, line: &str, rest: &str) -> Result<(), Fatal> {
        // A comment after the keywords of an entry starts the next entry
        if self.stage != Stage::Comments {
            self.finish_entry()?;
        }

        let mut chars = rest.chars();
        match chars.next() {
            Some('.') => {
                let text = strip_one_space(chars.as_str());
                self.entry.extracted_comments.push(text.to_string());
            }
            Some(':') => {
                self.entry
                    .references
                    .extend(chars.as_str().split_whitespace().map(str::to_string));
            }
            Some(',') => {
                for flag in chars.as_str().split(',') {
                    self.add_flag(flag.trim());
                }
            }
            Some('|') => {
                let offset = line.len() - chars.as_str().len();
                return self.parse_previous(line, offset);
            }
            _ => {
                self.entry
                    .translator_comments
                    .push(strip_one_space(rest).to_string());
            }
        }
        self.previous = None;
        Ok(())
    }

    fn add_flag(&mut self, flag: &str) {
        if flag.is_empty() {
            return;
        }
        if flag == "fuzzy" {
            self.entry.fuzzy = true;
        } else if flag.ends_with("-format")
            && !flag.starts_with("possible-")
            && !flag.starts_with("impossible-")
        {
            let (name, enabled) = match flag.strip_prefix("no-") {
                Some(name) => (name, false),
                None => (flag, true),
            };
            match self.entry.formats.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = enabled,
                None => self.entry.formats.push((name.to_string(), enabled)),
            }
        } else if !self.entry.flags.iter().any(|f| f == flag) {
            self.entry.flags.push(flag.to_string());
        }
    }

    /// Parse "#| keyword "..."" or a "#| "..."" continuation
    fn parse_previous(&mut self, line: &str, offset: usize) -> Result<(), Fatal> {
        let body = line[offset..].trim_start();
        let offset = line.len() - body.len();

        if body.starts_with('"') {
            let value = self.parse_literal(line, offset)?;
            let field = match self.previous {
                Some(PreviousField::Msgctxt) => &mut self.entry.previous_msgctxt,
                Some(PreviousField::Msgid) => &mut self.entry.previous_msgid,
                Some(PreviousField::MsgidPlural) => &mut self.entry.previous_msgid_plural,
                None => return self.error_at(line, offset, "syntax error"),
            };
            field.get_or_insert_with(String::new).push_str(&value);
            return Ok(());
        }

        let keyword_len = body
            .find(|c: char| c.is_whitespace() || c == '"')
            .unwrap_or(body.len());
        let field = match &body[..keyword_len] {
            "msgctxt" => PreviousField::Msgctxt,
            "msgid" => PreviousField::Msgid,
            "msgid_plural" => PreviousField::MsgidPlural,
            _ => {
                self.previous = None;
                return self.error_at(line, offset, "syntax error");
            }
        };

        let value = self.parse_string_value(line, offset + keyword_len)?;
        let slot = match field {
            PreviousField::Msgctxt => &mut self.entry.previous_msgctxt,
            PreviousField::Msgid => &mut self.entry.previous_msgid,
            PreviousField::MsgidPlural => &mut self.entry.previous_msgid_plural,
        };
        *slot = Some(value.unwrap_or_default());
        self.previous = Some(field);
        Ok(())
    }

    fn parse_domain(&mut self, line: &str, offset: usize) -> Result<(), Fatal> {
        self.finish_entry()?;
        if let Some(name) = self.parse_string_value(line, offset)? {
            if name.is_empty() {
                return self.error_at(line, offset, "empty domain name");
            }
            log::trace!("line {}: switching to domain {}", self.line_number, name);
            self.current_domain = name;
        }
        Ok(())
    }

    fn start_keywords(&mut self, obsolete: bool) {
        if self.stage == Stage::Comments {
            self.entry.obsolete = obsolete;
            self.entry_start = self.location(0);
        }
    }

    fn parse_msgctxt(
        &mut self,
        line: &str,
        keyword_offset: usize,
        offset: usize,
        obsolete: bool,
    ) -> Result<(), Fatal> {
        match self.stage {
            Stage::Comments => {}
            Stage::Msgctxt => self.error_at(line, keyword_offset, "duplicate 'msgctxt'")?,
            _ => self.finish_entry()?,
        }
        self.start_keywords(obsolete);
        let value = self.parse_string_value(line, offset)?;
        self.entry.msgctxt = Some(value.unwrap_or_default());
        self.stage = Stage::Msgctxt;
        Ok(())
    }

    fn parse_msgid(&mut self, line: &str, offset: usize, obsolete: bool) -> Result<(), Fatal> {
        if !matches!(self.stage, Stage::Comments | Stage::Msgctxt) {
            self.finish_entry()?;
        }
        self.start_keywords(obsolete);
        let value = self.parse_string_value(line, offset)?;
        self.entry.msgid = Some(value.unwrap_or_default());
        self.stage = Stage::Msgid;
        Ok(())
    }

    fn parse_msgid_plural(
        &mut self,
        line: &str,
        keyword_offset: usize,
        offset: usize,
    ) -> Result<(), Fatal> {
        if self.stage != Stage::Msgid {
            return self.error_at(
                line,
                keyword_offset,
                "'msgid_plural' without preceding 'msgid'",
            );
        }
        let value = self.parse_string_value(line, offset)?;
        self.entry.msgid_plural = Some(value.unwrap_or_default());
        self.stage = Stage::MsgidPlural;
        Ok(())
    }

    fn parse_msgstr(
        &mut self,
        line: &str,
        keyword_offset: usize,
        offset: usize,
    ) -> Result<(), Fatal> {
        match self.stage {
            Stage::Msgid => {}
            Stage::MsgidPlural => self.error_at(
                line,
                keyword_offset,
                "message with 'msgid_plural' requires 'msgstr[N]', not 'msgstr'",
            )?,
            Stage::Msgstr | Stage::MsgstrPlural(_) => {
                return self.error_at(line, keyword_offset, "duplicate 'msgstr' section");
            }
            Stage::Comments | Stage::Msgctxt => {
                return self.error_at(line, keyword_offset, "'msgstr' without preceding 'msgid'");
            }
        }
        let value = self.parse_string_value(line, offset)?;
        self.entry.msgstr = Some(value.unwrap_or_default());
        self.stage = Stage::Msgstr;
        Ok(())
    }

    fn parse_msgstr_plural(
        &mut self,
        line: &str,
        keyword_offset: usize,
        index: &str,
        offset: usize,
    ) -> Result<(), Fatal> {
        let index: usize = match index.parse() {
            Ok(index) => index,
            Err(_) => return self.error_at(line, keyword_offset, "invalid msgstr index"),
        };

        let expected = match self.stage {
            Stage::MsgidPlural => 0,
            Stage::MsgstrPlural(last) => last + 1,
            Stage::Msgid => {
                return self.error_at(
                    line,
                    keyword_offset,
                    "'msgstr[N]' given for a message without 'msgid_plural'",
                );
            }
            _ => {
                return self.error_at(line, keyword_offset, "'msgstr[N]' without preceding 'msgid'");
            }
        };
        if index != expected {
            self.error_at(line, keyword_offset, "plural form has wrong index")?;
        }

        // a misnumbered form is stored in the next slot
        let value = self.parse_string_value(line, offset)?.unwrap_or_default();
        self.entry.msgstr_plural.push(value);
        self.stage = Stage::MsgstrPlural(expected);
        Ok(())
    }

    fn parse_continuation(&mut self, line: &str, offset: usize) -> Result<(), Fatal> {
        let value = self.parse_literal(line, offset)?;
        let entry = &mut self.entry;
        let target = match self.stage {
            Stage::Comments => {
                return self.error_at(line, offset, "syntax error: string without keyword");
            }
            Stage::Msgctxt => entry.msgctxt.get_or_insert_with(String::new),
            Stage::Msgid => entry.msgid.get_or_insert_with(String::new),
            Stage::MsgidPlural => entry.msgid_plural.get_or_insert_with(String::new),
            Stage::Msgstr => entry.msgstr.get_or_insert_with(String::new),
            Stage::MsgstrPlural(index) => &mut entry.msgstr_plural[index],
        };
        target.push_str(&value);
        Ok(())
    }

    /// Complete the current entry and add it to the current domain
    fn finish_entry(&mut self) -> Result<(), Fatal> {
        let stage = std::mem::take(&mut self.stage);
        if stage == Stage::Comments {
            // comments without keywords stay with the next entry
            return Ok(());
        }

        let entry = std::mem::take(&mut self.entry);
        let start = self
            .entry_start
            .take()
            .unwrap_or_else(|| Location::new(self.file, self.line_number, 0));
        self.previous = None;

        let msgid = match entry.msgid {
            Some(ref msgid) => msgid.clone(),
            None => return self.sink.error(Some(start), "missing 'msgid' section"),
        };

        match stage {
            Stage::Msgid => self.sink.error(Some(start.clone()), "missing 'msgstr' section")?,
            Stage::MsgidPlural => {
                self.sink
                    .error(Some(start.clone()), "missing 'msgstr[]' section")?
            }
            _ => {}
        }

        if !entry.obsolete {
            let key = (self.current_domain.clone(), entry.msgctxt.clone(), msgid);
            if let Some(first) = self.seen.get(&key) {
                let message = format!("duplicate message definition (first defined at line {})", first);
                self.sink.error(Some(start.clone()), message)?;
            } else {
                self.seen.insert(key, start.line);
            }
        }

        let domain = match self
            .domains
            .iter()
            .position(|d| d.name == self.current_domain)
        {
            Some(index) => index,
            None => {
                self.domains.push(ParsedDomain {
                    name: self.current_domain.clone(),
                    entries: Vec::new(),
                });
                self.domains.len() - 1
            }
        };
        self.domains[domain].entries.push((entry, start));
        Ok(())
    }

    /// Warn about header charsets that are not read as UTF-8
    fn check_headers(&mut self) {
        let mut warnings = Vec::new();
        for domain in &self.domains {
            let Some((entry, location)) = domain
                .entries
                .iter()
                .find(|(e, _)| e.is_header() && !e.obsolete)
            else {
                continue;
            };
            let Some(charset) = entry.msgstr.as_deref().and_then(header::charset) else {
                continue;
            };
            if charset == "CHARSET" {
                warnings.push((
                    location.clone(),
                    "charset \"CHARSET\" is not a portable encoding name; message conversion to the user's codeset might not work".to_string(),
                ));
            } else if !header::is_utf8_compatible(&charset) {
                warnings.push((
                    location.clone(),
                    format!("charset \"{}\" is not supported; the file is read as UTF-8", charset),
                ));
            }
        }
        for (location, message) in warnings {
            self.sink.warning(Some(location), message);
        }
    }

    /// Parse a string value after a keyword (e.g., after "msgid ").  An
    /// error is reported and `None` returned when there is no string.
    fn parse_string_value(&mut self, line: &str, offset: usize) -> Result<Option<String>, Fatal> {
        let rest = &line[offset..];
        let trimmed = rest.trim_start();
        let start = offset + (rest.len() - trimmed.len());
        if !trimmed.starts_with('"') {
            self.error_at(line, start, "expected quoted string")?;
            return Ok(None);
        }
        self.parse_literal(line, start).map(Some)
    }

    /// Parse the quoted string starting at byte `start` of `line`
    /// (including escape sequences)
    fn parse_literal(&mut self, line: &str, start: usize) -> Result<String, Fatal> {
        let body = start + 1;
        let mut bytes: Vec<u8> = Vec::new();
        let mut chars = line[body..].char_indices().peekable();
        let mut closed_at = None;

        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    closed_at = Some(body + i + 1);
                    break;
                }
                '\\' => {
                    let Some((j, escaped)) = chars.next() else {
                        break;
                    };
                    match escaped {
                        'n' => bytes.push(b'\n'),
                        't' => bytes.push(b'\t'),
                        'r' => bytes.push(b'\r'),
                        'a' => bytes.push(0x07),
                        'b' => bytes.push(0x08),
                        'f' => bytes.push(0x0c),
                        'v' => bytes.push(0x0b),
                        '\\' | '"' | '?' => bytes.push(escaped as u8),
                        '0'..='7' => {
                            let mut value = escaped.to_digit(8).unwrap_or(0);
                            for _ in 0..2 {
                                match chars.peek().and_then(|&(_, d)| d.to_digit(8)) {
                                    Some(digit) => {
                                        value = value * 8 + digit;
                                        chars.next();
                                    }
                                    None => break,
                                }
                            }
                            bytes.push((value & 0xff) as u8);
                        }
                        'x' => {
                            let mut value = 0;
                            let mut digits = 0;
                            while digits < 2 {
                                match chars.peek().and_then(|&(_, d)| d.to_digit(16)) {
                                    Some(digit) => {
                                        value = value * 16 + digit;
                                        digits += 1;
                                        chars.next();
                                    }
                                    None => break,
                                }
                            }
                            if digits == 0 {
                                self.error_at(line, body + j, "invalid control sequence")?;
                            } else {
                                bytes.push(value as u8);
                            }
                        }
                        other => {
                            self.error_at(line, body + j, "invalid control sequence")?;
                            push_char(&mut bytes, other);
                        }
                    }
                }
                c => push_char(&mut bytes, c),
            }
        }

        match closed_at {
            None => self.error_at(line, line.len(), "end-of-line within string")?,
            Some(end) => {
                let trailing = line[end..].trim_start();
                if !trailing.is_empty() {
                    let at = line.len() - trailing.len();
                    self.error_at(line, at, "syntax error: text after closing quote")?;
                }
            }
        }

        match String::from_utf8(bytes) {
            Ok(s) => Ok(s),
            Err(e) => {
                self.error_at(line, start, "invalid multibyte sequence in string")?;
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }
}

fn push_char(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn strip_one_space(s: &str) -> &str {
    s.strip_prefix(' ').unwrap_or(s)
}

/// 1-based character column of byte offset `byte` in `line`
fn column(line: &str, byte: usize) -> usize {
    line.get(..byte).map_or(0, |s| s.chars().count()) + 1
}
