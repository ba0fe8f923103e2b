//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Header entry fields
//!
//! The header of a domain is the msgstr of its entry with an empty msgid.
//! It holds "Field: value" lines, e.g.
//!
//! ```text
//! Content-Type: text/plain; charset=UTF-8
//! Plural-Forms: nplurals=2; plural=(n != 1);
//! ```

/// Get the value of `field` from a header, without surrounding whitespace
pub fn header_field(header: &str, field: &str) -> Option<String> {
    header.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        (name == field).then(|| value.trim().to_string())
    })
}

/// Return `header` with `field` set to `value`.  An existing field keeps
/// its position; a new one is appended.
pub fn set_header_field(header: &str, field: &str, value: &str) -> String {
    let mut result = String::with_capacity(header.len() + field.len() + value.len() + 3);
    let mut replaced = false;

    for line in header.lines() {
        match line.split_once(':') {
            Some((name, _)) if name == field && !replaced => {
                result.push_str(&format!("{}: {}\n", field, value));
                replaced = true;
            }
            _ => {
                result.push_str(line);
                result.push('\n');
            }
        }
    }

    if !replaced {
        result.push_str(&format!("{}: {}\n", field, value));
    }
    result
}

/// Get the charset from the Content-Type field
pub fn charset(header: &str) -> Option<String> {
    let content_type = header_field(header, "Content-Type")?;
    content_type.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|cs| cs.trim().to_string())
    })
}

/// Get the Plural-Forms field
pub fn plural_forms(header: &str) -> Option<String> {
    header_field(header, "Plural-Forms")
}

/// Whether text in `charset` can be read as UTF-8 without conversion
pub fn is_utf8_compatible(charset: &str) -> bool {
    matches!(
        charset.to_ascii_uppercase().as_str(),
        "UTF-8" | "UTF8" | "ASCII" | "US-ASCII" | "ANSI_X3.4-1968"
    )
}
