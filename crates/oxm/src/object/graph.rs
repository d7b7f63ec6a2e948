// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Arena of mapped objects addressed by index.

use super::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Index of an object inside one [`ObjectGraph`].
///
/// Two references are "the same object" exactly when their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Handle for arena slot `index`; `None` past `u32::MAX`.
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An instance of a mapped type: a type name plus named field values.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedObject {
    type_name: String,
    fields: HashMap<String, Value>,
}

impl MappedObject {
    /// Create an empty instance of `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: HashMap::new(),
        }
    }

    /// Runtime type name (may be a registered proxy alias).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Field value; `None` when the field is absent or null.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder-style [`Self::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Remove a field value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Iterate over set fields (unordered).
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Owner of every object taking part in a marshal or unmarshal call.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    objects: Vec<MappedObject>,
}

impl ObjectGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an object into the arena; `None` once every `u32` id is taken.
    pub fn try_insert(&mut self, object: MappedObject) -> Option<ObjectId> {
        let id = ObjectId::from_index(self.objects.len())?;
        self.objects.push(object);
        Some(id)
    }

    /// Move an object into the arena.
    ///
    /// # Panics
    ///
    /// If the graph already holds `u32::MAX + 1` objects; use
    /// [`Self::try_insert`] to handle that case.
    pub fn insert(&mut self, object: MappedObject) -> ObjectId {
        match self.try_insert(object) {
            Some(id) => id,
            None => panic!("object graph is full ({} objects)", self.objects.len()),
        }
    }

    /// Insert an empty instance of `type_name`.
    pub fn create(&mut self, type_name: impl Into<String>) -> ObjectId {
        self.insert(MappedObject::new(type_name))
    }

    pub fn get(&self, id: ObjectId) -> Option<&MappedObject> {
        self.objects.get(id.index())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut MappedObject> {
        self.objects.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &MappedObject)> {
        self.objects
            .iter()
            .zip(0u32..)
            .map(|(o, i)| (ObjectId(i), o))
    }

    /// Structural equality of two object graphs rooted at `a_id` and `b_id`.
    ///
    /// Object references are followed; a pair already under comparison is
    /// treated as equal so cycles terminate. Absent and null fields compare
    /// equal.
    pub fn deep_eq(a: &ObjectGraph, a_id: ObjectId, b: &ObjectGraph, b_id: ObjectId) -> bool {
        let mut visiting = HashSet::new();
        objects_eq(a, a_id, b, b_id, &mut visiting)
    }
}

fn objects_eq(
    a: &ObjectGraph,
    a_id: ObjectId,
    b: &ObjectGraph,
    b_id: ObjectId,
    visiting: &mut HashSet<(ObjectId, ObjectId)>,
) -> bool {
    if !visiting.insert((a_id, b_id)) {
        return true;
    }
    let (Some(left), Some(right)) = (a.get(a_id), b.get(b_id)) else {
        return false;
    };
    if left.type_name != right.type_name {
        return false;
    }

    let names: HashSet<&str> = left
        .fields
        .keys()
        .chain(right.fields.keys())
        .map(String::as_str)
        .collect();

    names.into_iter().all(|name| match (left.get(name), right.get(name)) {
        (None, None) => true,
        (Some(l), Some(r)) => values_eq(a, l, b, r, visiting),
        _ => false,
    })
}

fn values_eq(
    a: &ObjectGraph,
    left: &Value,
    b: &ObjectGraph,
    right: &Value,
    visiting: &mut HashSet<(ObjectId, ObjectId)>,
) -> bool {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => objects_eq(a, *l, b, *r, visiting),
        (Value::List(l), Value::List(r)) => {
            l.len() == r.len()
                && l
                    .iter()
                    .zip(r)
                    .all(|(lv, rv)| values_eq(a, lv, b, rv, visiting))
        }
        (Value::Map(l), Value::Map(r)) => {
            l.len() == r.len()
                && l
                    .iter()
                    .zip(r)
                    .all(|((lk, lv), (rk, rv))| lk == rk && values_eq(a, lv, b, rv, visiting))
        }
        _ => left == right,
    }
}
