//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! printf-style format strings (`c-format`)
//!
//! A directive is `%[n$][flags][width][.precision][length]conversion`
//! where width and precision may be `*` or `*m$`.  Arguments are either
//! all numbered (`%2$s`) or all unnumbered.

use super::{FormatFamily, Names};

/// Integer argument size, from the length modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntSize {
    /// hh
    Char,
    /// h
    Short,
    Int,
    /// l
    Long,
    /// ll, q
    LongLong,
    /// j
    IntMax,
    /// z
    Size,
    /// t
    PtrDiff,
}

/// Type of the argument a directive consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CArg {
    Int { size: IntSize, unsigned: bool },
    /// e f g a; `long` with the L modifier
    Double { long: bool },
    Char { wide: bool },
    Str { wide: bool },
    Pointer,
    /// %n
    Count(IntSize),
}

/// Arguments of a C format string, in argument order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CSpec {
    /// Number of directives, not counting `%%`
    pub directives: usize,
    pub args: Vec<CArg>,
}

pub struct CFormat;

impl FormatFamily for CFormat {
    type Spec = CSpec;

    const LANGUAGE: &'static str = "C";

    fn parse(text: &str) -> Result<CSpec, String> {
        DirectiveParser::new(text).parse()
    }

    fn compare(source: &CSpec, translation: &CSpec, strict: bool, names: Names<'_>) -> Vec<String> {
        let (expected, found) = (source.args.len(), translation.args.len());
        if found > expected || (strict && found != expected) {
            return vec![names.count_mismatch()];
        }

        source
            .args
            .iter()
            .zip(&translation.args)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| names.argument_mismatch(i + 1))
            .collect()
    }
}

struct DirectiveParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    directive: usize,
    numbered: Vec<(usize, CArg)>,
    unnumbered: Vec<CArg>,
}

impl<'a> DirectiveParser<'a> {
    fn new(text: &'a str) -> Self {
        DirectiveParser {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            directive: 0,
            numbered: Vec::new(),
            unnumbered: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.text[start..self.pos].parse().ok()
    }

    /// Parse `n$` if present; the position is unchanged otherwise
    fn argument_number(&mut self) -> Result<Option<usize>, String> {
        let start = self.pos;
        match self.number() {
            Some(n) if self.eat(b'$') => {
                if n == 0 {
                    return Err(format!(
                        "In the directive number {}, the argument number 0 is not a positive integer.",
                        self.directive
                    ));
                }
                Ok(Some(n))
            }
            _ => {
                self.pos = start;
                Ok(None)
            }
        }
    }

    fn push_arg(&mut self, number: Option<usize>, arg: CArg) -> Result<(), String> {
        let mixed = match number {
            Some(n) => {
                self.numbered.push((n, arg));
                !self.unnumbered.is_empty()
            }
            None => {
                self.unnumbered.push(arg);
                !self.numbered.is_empty()
            }
        };
        if mixed {
            return Err("The string refers to arguments both through absolute argument numbers and through unnumbered argument specifications.".to_string());
        }
        Ok(())
    }

    /// Width or precision: digits, `*` or `*m$`
    fn star_or_digits(&mut self, main_numbered: bool) -> Result<(), String> {
        if self.eat(b'*') {
            let number = self.argument_number()?;
            if main_numbered && number.is_none() {
                return Err("The string refers to arguments both through absolute argument numbers and through unnumbered argument specifications.".to_string());
            }
            let int = CArg::Int {
                size: IntSize::Int,
                unsigned: false,
            };
            self.push_arg(number, int)?;
        } else {
            self.number();
        }
        Ok(())
    }

    fn length(&mut self) -> (IntSize, bool) {
        let size = match self.peek() {
            Some(b'h') => {
                self.pos += 1;
                if self.eat(b'h') {
                    IntSize::Char
                } else {
                    IntSize::Short
                }
            }
            Some(b'l') => {
                self.pos += 1;
                if self.eat(b'l') {
                    IntSize::LongLong
                } else {
                    IntSize::Long
                }
            }
            Some(b'q') => {
                self.pos += 1;
                IntSize::LongLong
            }
            Some(b'j') => {
                self.pos += 1;
                IntSize::IntMax
            }
            Some(b'z') => {
                self.pos += 1;
                IntSize::Size
            }
            Some(b't') => {
                self.pos += 1;
                IntSize::PtrDiff
            }
            Some(b'L') => {
                self.pos += 1;
                return (IntSize::Int, true);
            }
            _ => IntSize::Int,
        };
        (size, false)
    }

    fn directive(&mut self) -> Result<(), String> {
        if self.eat(b'%') {
            return Ok(());
        }
        self.directive += 1;

        let number = self.argument_number()?;
        while matches!(self.peek(), Some(b'-' | b'+' | b' ' | b'#' | b'0' | b'\'' | b'I')) {
            self.pos += 1;
        }
        self.star_or_digits(number.is_some())?;
        if self.eat(b'.') {
            self.star_or_digits(number.is_some())?;
        }
        let (size, long_double) = self.length();
        let wide = size == IntSize::Long;

        let Some(conversion) = self.text[self.pos..].chars().next() else {
            return Err("The string ends in the middle of a directive.".to_string());
        };
        self.pos += conversion.len_utf8();

        let arg = match conversion {
            'd' | 'i' => CArg::Int {
                size,
                unsigned: false,
            },
            'o' | 'u' | 'x' | 'X' => CArg::Int {
                size,
                unsigned: true,
            },
            'e' | 'E' | 'f' | 'F' | 'g' | 'G' | 'a' | 'A' => CArg::Double { long: long_double },
            'c' => CArg::Char { wide },
            'C' => CArg::Char { wide: true },
            's' => CArg::Str { wide },
            'S' => CArg::Str { wide: true },
            'p' => CArg::Pointer,
            'n' => CArg::Count(size),
            // %m prints strerror(errno) and takes no argument
            'm' => return Ok(()),
            other => {
                return Err(format!(
                    "In the directive number {}, the character '{}' is not a valid conversion specifier.",
                    self.directive, other
                ));
            }
        };
        self.push_arg(number, arg)
    }

    fn parse(mut self) -> Result<CSpec, String> {
        while let Some(offset) = self.text[self.pos..].find('%') {
            self.pos += offset + 1;
            self.directive()?;
        }

        let args = if self.numbered.is_empty() {
            std::mem::take(&mut self.unnumbered)
        } else {
            order_numbered(std::mem::take(&mut self.numbered))?
        };

        Ok(CSpec {
            directives: self.directive,
            args,
        })
    }
}

/// Arrange numbered arguments by number.  Every number up to the largest
/// must be used, and repeated uses must agree on the type.
fn order_numbered(mut numbered: Vec<(usize, CArg)>) -> Result<Vec<CArg>, String> {
    numbered.sort_by_key(|(n, _)| *n);
    let mut args: Vec<CArg> = Vec::with_capacity(numbered.len());

    for (n, arg) in numbered {
        if n <= args.len() {
            if args[n - 1] != arg {
                return Err(format!(
                    "The string refers to argument number {} in incompatible ways.",
                    n
                ));
            }
        } else if n == args.len() + 1 {
            args.push(arg);
        } else {
            return Err(format!(
                "The string refers to argument number {} but ignores argument number {}.",
                n,
                args.len() + 1
            ));
        }
    }

    Ok(args)
}
