//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! PO catalogs
//!
//! A catalog is an ordered list of domains, each an ordered list of
//! messages.  [`Catalog`] is a cheap handle; clones refer to the same
//! catalog.  Every operation that can report problems runs inside one
//! diagnostic session and fails when anything at all was reported.

use std::cell::RefCell;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;

use crate::po_lib::check;
use crate::po_lib::diagnostic::{collect, DiagnosticSink, Fatal};
use crate::po_lib::error::{finish, Error, Result};
use crate::po_lib::header;
use crate::po_lib::iterator::MessageIterator;
use crate::po_lib::message::Message;
use crate::po_lib::parser::{self, ParsedDomain};
use crate::po_lib::writer::{self, WriteOptions};
use crate::po_lib::DEFAULT_DOMAIN;

#[derive(Debug, Default)]
pub(crate) struct Domain {
    pub(crate) name: String,
    pub(crate) messages: Vec<Message>,
}

impl Domain {
    /// msgstr of the first live header entry
    pub(crate) fn header(&self) -> Option<String> {
        self.messages.iter().find_map(|message| {
            message.with_entry(|e| {
                if e.is_header() && !e.obsolete {
                    e.msgstr.clone()
                } else {
                    None
                }
            })
        })
    }

    pub(crate) fn header_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.with_entry(|e| e.is_header() && !e.obsolete))
    }
}

#[derive(Debug, Default)]
pub(crate) struct CatalogData {
    pub(crate) domains: Vec<Domain>,
}

impl CatalogData {
    pub(crate) fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    pub(crate) fn domain_index_or_insert(&mut self, name: &str) -> usize {
        match self.domains.iter().position(|d| d.name == name) {
            Some(index) => index,
            None => {
                self.domains.push(Domain {
                    name: name.to_string(),
                    messages: Vec::new(),
                });
                self.domains.len() - 1
            }
        }
    }

    /// Message at `position` counting across all domains
    pub(crate) fn message_at(&self, position: usize) -> Option<Message> {
        self.domains
            .iter()
            .flat_map(|d| d.messages.iter())
            .nth(position)
            .cloned()
    }

    /// (domain, index) where a message inserted in front of `position`
    /// goes.  A position at the end of a domain appends to that domain, not
    /// to the front of the next one.
    pub(crate) fn insertion_point(&mut self, position: usize) -> (usize, usize) {
        let mut remaining = position;
        for (index, domain) in self.domains.iter().enumerate() {
            if remaining <= domain.messages.len() {
                return (index, remaining);
            }
            remaining -= domain.messages.len();
        }

        match self.domains.len() {
            0 => (self.domain_index_or_insert(DEFAULT_DOMAIN), 0),
            n => (n - 1, self.domains[n - 1].messages.len()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.domains.iter().map(|d| d.messages.len()).sum()
    }
}

/// An in-memory PO catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) inner: Rc<RefCell<CatalogData>>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Read a catalog from a .po file
    pub fn read(path: impl AsRef<Path>) -> Result<Catalog> {
        let path = path.as_ref();
        let name = path.display().to_string();
        log::debug!("reading {}", name);

        let (value, report) = collect(|sink| {
            let bytes = fs::read(path).map_err(|e| {
                sink.fatal(None, format!("cannot open file \"{}\": {}", name, e))
            })?;
            parser::parse_bytes(&bytes, Some(&name), sink)
        });
        let domains = finish(value, report, Error::Parse)?;
        Ok(Catalog::from_parsed(domains))
    }

    /// Read a catalog from any reader; `name` is used in diagnostics
    pub fn read_from(mut reader: impl Read, name: &str) -> Result<Catalog> {
        let (value, report) = collect(|sink| {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).map_err(|e| {
                sink.fatal(None, format!("error while reading \"{}\": {}", name, e))
            })?;
            parser::parse_bytes(&bytes, Some(name), sink)
        });
        let domains = finish(value, report, Error::Parse)?;
        Ok(Catalog::from_parsed(domains))
    }

    /// Parse a catalog from PO text
    pub fn parse(text: &str) -> Result<Catalog> {
        let (value, report) = collect(|sink| parser::parse_str(text, None, sink));
        let domains = finish(value, report, Error::Parse)?;
        Ok(Catalog::from_parsed(domains))
    }

    fn from_parsed(parsed: Vec<ParsedDomain>) -> Catalog {
        let catalog = Catalog::new();
        let owner = Rc::downgrade(&catalog.inner);

        let domains = parsed
            .into_iter()
            .map(|domain| Domain {
                name: domain.name,
                messages: domain
                    .entries
                    .into_iter()
                    .map(|(entry, location)| {
                        let message = Message::with_origin(entry, location);
                        message.set_owner(owner.clone());
                        message
                    })
                    .collect(),
            })
            .collect();

        catalog.inner.borrow_mut().domains = domains;
        catalog
    }

    /// Write the catalog to a .po file with default options
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_with(path, &WriteOptions::default())
    }

    /// Write the catalog to a .po file.  Nothing is written when any
    /// problem is reported.
    pub fn write_with(&self, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
        let path = path.as_ref();
        let name = path.display().to_string();
        log::debug!("writing {}", name);

        let data = self.inner.borrow();
        let (value, report) = collect(|sink| {
            let text = writer::render(&data, options, sink)?;
            if !sink.is_empty() {
                return Ok(());
            }
            fs::write(path, text).map_err(|e| {
                sink.fatal(None, format!("cannot create output file \"{}\": {}", name, e))
            })
        });
        finish(value, report, Error::Write)
    }

    /// Render the catalog as PO text
    pub fn to_po_string(&self, options: &WriteOptions) -> Result<String> {
        let data = self.inner.borrow();
        let (value, report) = collect(|sink| writer::render(&data, options, sink));
        finish(value, report, Error::Write)
    }

    /// Names of the domains that hold messages, in file order
    pub fn domains(&self) -> Vec<String> {
        self.inner
            .borrow()
            .domains
            .iter()
            .filter(|d| !d.messages.is_empty())
            .map(|d| d.name.clone())
            .collect()
    }

    /// Header of `domain` (the default domain for `None`)
    pub fn domain_header(&self, domain: Option<&str>) -> Option<String> {
        let data = self.inner.borrow();
        data.domain(domain.unwrap_or(DEFAULT_DOMAIN))?.header()
    }

    /// Charset named in the header of `domain`
    pub fn charset(&self, domain: Option<&str>) -> Option<String> {
        header::charset(&self.domain_header(domain)?)
    }

    /// Plural-Forms value from the header of `domain`
    pub fn plural_forms(&self, domain: Option<&str>) -> Option<String> {
        header::plural_forms(&self.domain_header(domain)?)
    }

    /// Iterate over the messages of `domain`, or of all domains in file
    /// order for `None`
    pub fn iterate(&self, domain: Option<&str>) -> MessageIterator {
        MessageIterator::new(self.clone(), domain.map(str::to_string))
    }

    /// Run the catalog-wide consistency and format checks
    pub fn check_all(&self) -> Result<()> {
        let data = self.inner.borrow();
        let (value, report) = collect(|sink| check_domains(&data, sink));
        finish(value, report, Error::Check)
    }

    /// Number of messages in all domains
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_domains(
    data: &CatalogData,
    sink: &mut DiagnosticSink,
) -> std::result::Result<(), Fatal> {
    for domain in &data.domains {
        check::check_domain(domain, sink)?;
    }
    Ok(())
}
