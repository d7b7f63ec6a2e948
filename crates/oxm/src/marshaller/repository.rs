// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-session reference tracking.

use crate::error::{OxmError, Result};
use crate::object::ObjectId;
use std::collections::HashMap;

/// Maps wire reference ids to objects for one marshal or unmarshal session.
///
/// Write side: ids are handed out 0, 1, 2, ... in first-encounter order, keyed
/// by object identity. Read side: ids come from the wire and are bound as soon
/// as an object is instantiated, so a cycle back to it resolves to the same
/// instance. An id never rebinds within a session.
#[derive(Debug, Default)]
pub struct ObjectRepository {
    written: HashMap<ObjectId, u32>,
    read: HashMap<u32, ObjectId>,
}

impl ObjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference id for `object`, and whether it was already emitted.
    pub fn resolve_for_write(&mut self, object: ObjectId) -> Result<(u32, bool)> {
        if let Some(&id) = self.written.get(&object) {
            return Ok((id, true));
        }
        let id = next_reference(self.written.len())?;
        self.written.insert(object, id);
        Ok((id, false))
    }

    /// Object bound to a wire id, if any.
    pub fn resolve_for_read(&self, id: u32) -> Option<ObjectId> {
        self.read.get(&id).copied()
    }

    /// Bind a freshly instantiated object; an existing binding is kept.
    pub fn bind(&mut self, id: u32, object: ObjectId) {
        self.read.entry(id).or_insert(object);
    }

    /// Number of tracked objects on either side.
    pub fn len(&self) -> usize {
        self.written.len() + self.read.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every binding and restart numbering at 0.
    pub fn clear(&mut self) {
        self.written.clear();
        self.read.clear();
    }
}

/// Id for the next object after `assigned` have been numbered.
fn next_reference(assigned: usize) -> Result<u32> {
    u32::try_from(assigned).map_err(|_| {
        OxmError::InvalidCursorState(format!("reference ids exhausted after {}", assigned))
    })
}
