//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Python %-formatting (`python-format`)
//!
//! Directives either name their argument, `%(count)d`, taking values from
//! a mapping, or are unnamed, `%d`, taking values from a tuple.

use std::collections::BTreeMap;

use super::{FormatFamily, Names};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PyArg {
    /// %s %r %a accept any object
    Any,
    Char,
    Integer,
    Float,
}

impl PyArg {
    fn compatible(self, other: PyArg, strict: bool) -> bool {
        self == other || (!strict && (self == PyArg::Any || other == PyArg::Any))
    }
}

/// Arguments of a Python format string.  At most one of the two
/// collections is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PythonSpec {
    pub named: BTreeMap<String, PyArg>,
    pub unnamed: Vec<PyArg>,
}

pub struct PythonFormat;

const MIXED: &str = "The string refers to arguments both through argument names and through unnamed argument specifications.";

impl FormatFamily for PythonFormat {
    type Spec = PythonSpec;

    const LANGUAGE: &'static str = "Python";

    fn parse(text: &str) -> Result<PythonSpec, String> {
        let mut spec = PythonSpec::default();
        let mut chars = text.chars().peekable();
        let mut directive = 0;

        while let Some(c) = chars.next() {
            if c != '%' {
                continue;
            }
            if chars.next_if_eq(&'%').is_some() {
                continue;
            }
            directive += 1;

            let mut name = None;
            if chars.next_if_eq(&'(').is_some() {
                let mut depth = 1;
                let mut key = String::new();
                loop {
                    let Some(c) = chars.next() else {
                        return Err("The string ends in the middle of a directive.".to_string());
                    };
                    match c {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    key.push(c);
                }
                name = Some(key);
            }

            while chars
                .next_if(|c| matches!(*c, '-' | '+' | ' ' | '#' | '0'))
                .is_some()
            {}

            let mut stars = 0;
            if chars.next_if_eq(&'*').is_some() {
                stars += 1;
            } else {
                while chars.next_if(char::is_ascii_digit).is_some() {}
            }
            if chars.next_if_eq(&'.').is_some() {
                if chars.next_if_eq(&'*').is_some() {
                    stars += 1;
                } else {
                    while chars.next_if(char::is_ascii_digit).is_some() {}
                }
            }
            while chars.next_if(|c| matches!(*c, 'h' | 'l' | 'L')).is_some() {}

            let arg = match chars.next() {
                None => return Err("The string ends in the middle of a directive.".to_string()),
                Some('s' | 'r' | 'a') => PyArg::Any,
                Some('c') => PyArg::Char,
                Some('d' | 'i' | 'u' | 'o' | 'x' | 'X') => PyArg::Integer,
                Some('e' | 'E' | 'f' | 'F' | 'g' | 'G') => PyArg::Float,
                Some(other) => {
                    return Err(format!(
                        "In the directive number {}, the character '{}' is not a valid conversion specifier.",
                        directive, other
                    ));
                }
            };

            match name {
                Some(name) => {
                    if stars > 0 || !spec.unnamed.is_empty() {
                        return Err(MIXED.to_string());
                    }
                    if let Some(&previous) = spec.named.get(&name) {
                        if previous != arg {
                            return Err(format!(
                                "The string refers to the argument named '{}' in incompatible ways.",
                                name
                            ));
                        }
                    }
                    spec.named.insert(name, arg);
                }
                None => {
                    if !spec.named.is_empty() {
                        return Err(MIXED.to_string());
                    }
                    spec.unnamed.extend(std::iter::repeat(PyArg::Integer).take(stars));
                    spec.unnamed.push(arg);
                }
            }
        }

        Ok(spec)
    }

    fn compare(
        source: &PythonSpec,
        translation: &PythonSpec,
        strict: bool,
        names: Names<'_>,
    ) -> Vec<String> {
        if !source.named.is_empty() && !translation.unnamed.is_empty() {
            return vec![format!(
                "format specifications in '{}' expect a mapping, those in '{}' expect a tuple",
                names.source, names.translation
            )];
        }
        if !source.unnamed.is_empty() && !translation.named.is_empty() {
            return vec![format!(
                "format specifications in '{}' expect a tuple, those in '{}' expect a mapping",
                names.source, names.translation
            )];
        }

        let mut problems = Vec::new();
        if !source.named.is_empty() || !translation.named.is_empty() {
            for (name, &arg) in &translation.named {
                match source.named.get(name) {
                    None => problems.push(names.extra_argument(name)),
                    Some(&expected) if !expected.compatible(arg, strict) => {
                        problems.push(names.argument_mismatch(format!("'{}'", name)));
                    }
                    Some(_) => {}
                }
            }
            if strict {
                for name in source.named.keys() {
                    if !translation.named.contains_key(name) {
                        problems.push(names.missing_argument(name));
                    }
                }
            }
            return problems;
        }

        if source.unnamed.len() != translation.unnamed.len() {
            return vec![names.count_mismatch()];
        }
        for (i, (&expected, &arg)) in source.unnamed.iter().zip(&translation.unnamed).enumerate() {
            if !expected.compatible(arg, strict) {
                problems.push(names.argument_mismatch(i + 1));
            }
        }
        problems
    }
}
