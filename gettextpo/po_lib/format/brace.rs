//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Python `str.format` strings (`python-brace-format`)
//!
//! A replacement field is `{field[.attr|[index]]...[!conv][:spec]}`.  The
//! part after the colon may hold one level of nested fields, e.g.
//! `{value:{width}}`.
//! `{{` and `}}` are literal braces.  Only the argument names matter when
//! comparing; `{}` fields are numbered automatically.

use std::collections::BTreeSet;
use std::iter::Peekable;
use std::str::Chars;

use super::{FormatFamily, Names};

pub struct PythonBraceFormat;

/// Argument names used by a brace format string
pub type BraceSpec = BTreeSet<String>;

impl FormatFamily for PythonBraceFormat {
    type Spec = BraceSpec;

    const LANGUAGE: &'static str = "Python brace";

    fn parse(text: &str) -> Result<BraceSpec, String> {
        let mut parser = FieldParser {
            chars: text.chars().peekable(),
            directive: 0,
            auto: 0,
            manual: false,
            names: BTreeSet::new(),
        };
        parser.parse()?;
        Ok(parser.names)
    }

    fn compare(
        source: &BraceSpec,
        translation: &BraceSpec,
        strict: bool,
        names: Names<'_>,
    ) -> Vec<String> {
        let mut problems: Vec<String> = translation
            .difference(source)
            .map(|name| names.extra_argument(name))
            .collect();
        if strict {
            problems.extend(
                source
                    .difference(translation)
                    .map(|name| names.missing_argument(name)),
            );
        }
        problems
    }
}

struct FieldParser<'a> {
    chars: Peekable<Chars<'a>>,
    directive: usize,
    /// next automatic field number
    auto: usize,
    /// whether a field was numbered explicitly
    manual: bool,
    names: BTreeSet<String>,
}

const MIXED: &str = "The string refers to arguments both through absolute argument numbers and through unnumbered argument specifications.";

impl FieldParser<'_> {
    fn parse(&mut self) -> Result<(), String> {
        while let Some(c) = self.chars.next() {
            match c {
                '{' if self.chars.next_if_eq(&'{').is_some() => {}
                '{' => self.field(true)?,
                '}' if self.chars.next_if_eq(&'}').is_some() => {}
                '}' => {
                    return Err(format!(
                        "The string contains a lone '}}' after directive number {}.",
                        self.directive
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn unterminated(&self) -> String {
        format!("The directive number {} is unterminated.", self.directive)
    }

    /// Parse a replacement field after its opening brace
    fn field(&mut self, toplevel: bool) -> Result<(), String> {
        self.directive += 1;

        let mut name = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
            name.push(c);
        }

        if name.is_empty() {
            if self.manual {
                return Err(MIXED.to_string());
            }
            name = self.auto.to_string();
            self.auto += 1;
        } else if name.chars().all(|c| c.is_ascii_digit()) {
            if self.auto > 0 {
                return Err(MIXED.to_string());
            }
            self.manual = true;
        } else if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(format!(
                "In the directive number {}, '{}' is not a valid argument name.",
                self.directive, name
            ));
        }
        self.names.insert(name);

        // attribute and index chains
        loop {
            if self.chars.next_if_eq(&'.').is_some() {
                let mut attribute = 0;
                while self
                    .chars
                    .next_if(|c| c.is_alphanumeric() || *c == '_')
                    .is_some()
                {
                    attribute += 1;
                }
                if attribute == 0 {
                    return Err(format!(
                        "In the directive number {}, there is an empty attribute name.",
                        self.directive
                    ));
                }
            } else if self.chars.next_if_eq(&'[').is_some() {
                let mut index = 0;
                loop {
                    match self.chars.next() {
                        None => return Err(self.unterminated()),
                        Some(']') => break,
                        Some(_) => index += 1,
                    }
                }
                if index == 0 {
                    return Err(format!(
                        "In the directive number {}, there is an empty index.",
                        self.directive
                    ));
                }
            } else {
                break;
            }
        }

        if self.chars.next_if_eq(&'!').is_some()
            && self
                .chars
                .next_if(|c| matches!(*c, 'r' | 's' | 'a'))
                .is_none()
        {
            return Err(format!(
                "In the directive number {}, the conversion must be 'r', 's' or 'a'.",
                self.directive
            ));
        }

        if self.chars.next_if_eq(&':').is_some() {
            loop {
                match self.chars.next() {
                    None => return Err(self.unterminated()),
                    Some('}') => return Ok(()),
                    Some('{') if toplevel => self.field(false)?,
                    Some('{') => {
                        return Err(format!(
                            "In the directive number {}, fields are nested too deeply.",
                            self.directive
                        ));
                    }
                    Some(_) => {}
                }
            }
        }

        match self.chars.next() {
            Some('}') => Ok(()),
            None => Err(self.unterminated()),
            Some(c) => Err(format!(
                "In the directive number {}, the character '{}' is not valid in a field.",
                self.directive, c
            )),
        }
    }
}
