//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::rc::Rc;

use crate::po_lib::catalog::Catalog;
use crate::po_lib::error::{Result, UsageError};
use crate::po_lib::message::Message;

/// Cursor over the messages of a catalog.
///
/// The iterator holds a position, not a snapshot: messages inserted
/// through it, or through another iterator, are seen by later calls to
/// `next`.  The catalog stays alive as long as the iterator does.
pub struct MessageIterator {
    catalog: Catalog,
    /// `None` walks all domains in order
    domain: Option<String>,
    position: usize,
}

impl MessageIterator {
    pub(crate) fn new(catalog: Catalog, domain: Option<String>) -> Self {
        MessageIterator {
            catalog,
            domain,
            position: 0,
        }
    }

    /// Insert `message` in front of the message `next` would return, and
    /// move past it.  The catalog takes ownership of the message.
    pub fn insert(&mut self, message: &Message) -> Result<()> {
        if message.is_owned() {
            return Err(UsageError::AlreadyOwned.into());
        }

        {
            let mut data = self.catalog.inner.borrow_mut();
            let (domain, index) = match self.domain {
                Some(ref name) => {
                    let domain = data.domain_index_or_insert(name);
                    let index = self.position.min(data.domains[domain].messages.len());
                    (domain, index)
                }
                None => data.insertion_point(self.position),
            };
            data.domains[domain].messages.insert(index, message.clone());
            log::trace!(
                "inserted message into domain {} at {}",
                data.domains[domain].name,
                index
            );
        }

        message.set_owner(Rc::downgrade(&self.catalog.inner));
        self.position += 1;
        Ok(())
    }
}

impl Iterator for MessageIterator {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        let data = self.catalog.inner.borrow();
        let message = match self.domain {
            Some(ref name) => data
                .domain(name)
                .and_then(|d| d.messages.get(self.position))
                .cloned(),
            None => data.message_at(self.position),
        };
        if message.is_some() {
            self.position += 1;
        }
        message
    }
}
