// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Document -> object graph.

use super::cursor::{unexpected_eof, DocumentCursor, StartTag, Token};
use super::repository::ObjectRepository;
use super::{converter_for, object, object_mut, run_hook};
use crate::config::REPOSITORY_ATTRIBUTE;
use crate::error::{OxmError, Result};
use crate::mapping::{FieldDescriptor, LifecycleEvent, MappedType, Metadata, NodeKind};
use crate::object::{ObjectGraph, ObjectId, Value};
use crate::types::TypeRegistry;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;

/// State of one element's child pass.
#[derive(Debug, Default)]
struct ChildPass {
    /// Collection values gathered so far, by field name.
    lists: HashMap<String, Vec<Value>>,
    /// Scalar fields already assigned.
    filled: HashSet<String>,
}

impl ChildPass {
    /// Start an empty list for `field` if none exists yet.
    fn open_list(&mut self, field: &FieldDescriptor) {
        self.lists.entry(field.field_name.clone()).or_default();
    }
}

/// One unmarshal call: a fresh repository bound to wire reference ids.
pub(crate) struct UnmarshalSession<'a, M: Metadata> {
    metadata: &'a M,
    types: &'a TypeRegistry,
    strict: bool,
    repository: ObjectRepository,
}

impl<'a, M: Metadata> UnmarshalSession<'a, M> {
    pub(crate) fn new(metadata: &'a M, types: &'a TypeRegistry, strict: bool) -> Self {
        Self {
            metadata,
            types,
            strict,
            repository: ObjectRepository::new(),
        }
    }

    /// Read the root element and everything below it.
    pub(crate) fn run<R: BufRead>(
        mut self,
        cursor: &mut DocumentCursor<R>,
        graph: &mut ObjectGraph,
    ) -> Result<ObjectId> {
        let root = cursor.root()?;
        let mapped = self
            .metadata
            .by_element(&root.name)
            .ok_or_else(|| OxmError::UnknownMapping(root.name.clone()))?;
        let id = self.unmarshal(cursor, graph, root, mapped)?;
        log::trace!(
            "[unmarshal] {} reference id(s) bound",
            self.repository.len()
        );
        Ok(id)
    }

    fn unmarshal<R: BufRead>(
        &mut self,
        cursor: &mut DocumentCursor<R>,
        graph: &mut ObjectGraph,
        tag: StartTag,
        mapped: &'a MappedType,
    ) -> Result<ObjectId> {
        let reference = reference_id(&tag)?;
        if let Some(existing) = reference.and_then(|r| self.repository.resolve_for_read(r)) {
            log::trace!("[unmarshal] <{}> resolved to {}", tag.name, existing);
            cursor.skip_element(&tag)?;
            return Ok(existing);
        }

        let id = graph
            .try_insert(mapped.new_instance())
            .ok_or_else(|| OxmError::InvalidCursorState("object graph is full".into()))?;
        if let Some(reference) = reference {
            self.repository.bind(reference, id);
        }
        log::trace!("[unmarshal] <{}> -> {} ({})", tag.name, id, mapped.type_name);

        run_hook(graph, id, mapped, LifecycleEvent::PreUnmarshal)?;
        self.read_attributes(graph, id, mapped, &tag)?;
        if !tag.self_closing {
            self.read_children(cursor, graph, id, mapped, &tag)?;
        }

        let instance = object(graph, id)?;
        if let Some(missing) = mapped
            .fields
            .iter()
            .find(|f| f.required && instance.get(&f.field_name).is_none())
        {
            return Err(OxmError::field_required(&mapped.type_name, &missing.field_name));
        }

        run_hook(graph, id, mapped, LifecycleEvent::PostUnmarshal)?;
        Ok(id)
    }

    fn read_attributes(
        &self,
        graph: &mut ObjectGraph,
        id: ObjectId,
        mapped: &MappedType,
        tag: &StartTag,
    ) -> Result<()> {
        for attr in &tag.attributes {
            if attr.is_namespace_binding() || attr.local_name == REPOSITORY_ATTRIBUTE {
                continue;
            }
            let Some(field) = mapped.attribute_field(&attr.local_name) else {
                continue;
            };
            if field.required && attr.value.is_empty() {
                return Err(OxmError::field_required(&mapped.type_name, &field.field_name));
            }

            let converter = converter_for(self.types, field)?;
            let value = if field.is_collection() {
                let values = attr
                    .value
                    .split(' ')
                    .filter(|token| !token.is_empty())
                    .map(|token| converter.to_native(Some(strip_key(token))))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Value::List(values)
            } else if field.nillable && attr.value.is_empty() {
                converter.to_native(None)?
            } else {
                converter.to_native(Some(&attr.value))?
            };
            object_mut(graph, id)?.set(field.field_name.clone(), value);
        }
        Ok(())
    }

    fn read_children<R: BufRead>(
        &mut self,
        cursor: &mut DocumentCursor<R>,
        graph: &mut ObjectGraph,
        id: ObjectId,
        mapped: &'a MappedType,
        tag: &StartTag,
    ) -> Result<()> {
        let metadata = self.metadata;
        let mut pass = ChildPass::default();
        // open wrapper elements below `tag`
        let mut depth = 0usize;

        loop {
            match cursor.next_token()? {
                Token::End(_) if depth == 0 => break,
                Token::End(_) => depth -= 1,
                Token::Text(_) => {}
                Token::Eof => return Err(unexpected_eof(&tag.name)),
                Token::Start(child) => {
                    if let Some(field) = mapped.field_by_wire_name(&child.name) {
                        self.read_field(cursor, graph, id, field, child, &mut pass)?;
                    } else if let Some(field) = mapped.field_by_wrapper(&child.name) {
                        if child.self_closing {
                            pass.open_list(field);
                        } else {
                            depth += 1;
                        }
                    } else if let Some(child_type) = metadata.by_element(&child.name) {
                        match self.polymorphic_field(mapped, child_type, &pass.filled) {
                            Some(field) => {
                                let child_id = self.unmarshal(cursor, graph, child, child_type)?;
                                store(graph, id, field, Value::Object(child_id), &mut pass)?;
                            }
                            None => self.unexpected(cursor, mapped, &child)?,
                        }
                    } else {
                        self.unexpected(cursor, mapped, &child)?;
                    }
                }
            }
        }

        let target = object_mut(graph, id)?;
        for (field, values) in pass.lists {
            target.set(field, Value::List(values));
        }
        Ok(())
    }

    /// Child element named after one of the current type's fields.
    fn read_field<R: BufRead>(
        &mut self,
        cursor: &mut DocumentCursor<R>,
        graph: &mut ObjectGraph,
        id: ObjectId,
        field: &'a FieldDescriptor,
        child: StartTag,
        pass: &mut ChildPass,
    ) -> Result<()> {
        let metadata = self.metadata;
        let placeholder = child.self_closing && child.attributes.is_empty();

        if let Some(declared) = metadata.mapped_type(&field.type_name) {
            if placeholder {
                if field.is_collection() {
                    pass.open_list(field);
                } else {
                    object_mut(graph, id)?.set(field.field_name.clone(), Value::Null);
                    pass.filled.insert(field.field_name.clone());
                }
                return Ok(());
            }
            let actual = match metadata.by_element(&child.name) {
                Some(found) if self.is_same_or_subtype(found, declared) => found,
                _ => declared,
            };
            let child_id = self.unmarshal(cursor, graph, child, actual)?;
            return store(graph, id, field, Value::Object(child_id), pass);
        }

        let text = read_leaf(cursor, &child)?;
        if field.is_collection() && placeholder {
            pass.open_list(field);
            return Ok(());
        }
        let value = converter_for(self.types, field)?.to_native(text.as_deref())?;
        store(graph, id, field, value, pass)
    }

    /// First non-attribute field declared as `child_type` or one of its
    /// supertypes that can still take a value: a collection, or a scalar not
    /// yet assigned in this pass.
    ///
    /// Element fields are written in declaration order under the child's own
    /// element name, so same-typed scalars are matched by position.
    fn polymorphic_field(
        &self,
        mapped: &'a MappedType,
        child_type: &MappedType,
        filled: &HashSet<String>,
    ) -> Option<&'a FieldDescriptor> {
        let mut candidates = vec![child_type.type_name.clone()];
        candidates.extend(self.metadata.ancestors(&child_type.type_name));
        mapped.fields.iter().find(|f| {
            f.kind() != NodeKind::Attribute
                && candidates.contains(&f.type_name)
                && (f.is_collection() || !filled.contains(&f.field_name))
        })
    }

    fn is_same_or_subtype(&self, found: &MappedType, declared: &MappedType) -> bool {
        found.type_name == declared.type_name
            || self
                .metadata
                .ancestors(&found.type_name)
                .contains(&declared.type_name)
    }

    /// Child element with no matching field.
    fn unexpected<R: BufRead>(
        &self,
        cursor: &mut DocumentCursor<R>,
        mapped: &MappedType,
        child: &StartTag,
    ) -> Result<()> {
        if self.strict {
            return Err(OxmError::UnknownMapping(child.name.clone()));
        }
        log::warn!(
            "[unmarshal] skipping unexpected <{}> inside <{}>",
            child.name,
            mapped.element_name
        );
        cursor.skip_element(child)
    }
}

fn store(
    graph: &mut ObjectGraph,
    id: ObjectId,
    field: &FieldDescriptor,
    value: Value,
    pass: &mut ChildPass,
) -> Result<()> {
    if field.is_collection() {
        pass.lists
            .entry(field.field_name.clone())
            .or_default()
            .push(value);
    } else {
        object_mut(graph, id)?.set(field.field_name.clone(), value);
        pass.filled.insert(field.field_name.clone());
    }
    Ok(())
}

/// Text content of a leaf element; `None` for a self-closing one.
fn read_leaf<R: BufRead>(cursor: &mut DocumentCursor<R>, tag: &StartTag) -> Result<Option<String>> {
    if tag.self_closing {
        return Ok(None);
    }
    let mut text = String::new();
    loop {
        match cursor.next_token()? {
            Token::Text(chunk) => text.push_str(&chunk),
            Token::End(_) => return Ok(Some(text)),
            Token::Start(inner) => {
                return Err(OxmError::InvalidCursorState(format!(
                    "expected text inside <{}>, found <{}>",
                    tag.name, inner.name
                )))
            }
            Token::Eof => return Err(unexpected_eof(&tag.name)),
        }
    }
}

fn reference_id(tag: &StartTag) -> Result<Option<u32>> {
    tag.attribute(REPOSITORY_ATTRIBUTE)
        .map(|raw| {
            raw.trim().parse::<u32>().map_err(|e| {
                OxmError::DocumentParseFailure(format!(
                    "invalid {} {:?} on <{}>: {}",
                    REPOSITORY_ATTRIBUTE, raw, tag.name, e
                ))
            })
        })
        .transpose()
}

/// Drop a leading `key:` from an attribute token.
fn strip_key(token: &str) -> &str {
    match token.split_once(':') {
        Some((key, rest))
            if !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_') =>
        {
            rest
        }
        _ => token,
    }
}
