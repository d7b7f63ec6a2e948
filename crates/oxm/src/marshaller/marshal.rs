// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object graph -> document.

use super::emitter::DocumentEmitter;
use super::repository::ObjectRepository;
use super::{converter_for, object, run_hook};
use crate::config::REPOSITORY_ATTRIBUTE;
use crate::error::{OxmError, Result};
use crate::mapping::{qualify, FieldDescriptor, FieldNode, LifecycleEvent, Metadata, NodeKind};
use crate::object::{ObjectGraph, ObjectId, Value};
use crate::types::{ConversionError, TypeConverter, TypeRegistry};
use std::io::Write;

/// One marshal call: a fresh repository plus the destination emitter.
pub(crate) struct MarshalSession<'a, M: Metadata, W: Write> {
    metadata: &'a M,
    types: &'a TypeRegistry,
    repository: ObjectRepository,
    emitter: DocumentEmitter<W>,
}

impl<'a, M: Metadata, W: Write> MarshalSession<'a, M, W> {
    pub(crate) fn new(metadata: &'a M, types: &'a TypeRegistry, emitter: DocumentEmitter<W>) -> Self {
        Self {
            metadata,
            types,
            repository: ObjectRepository::new(),
            emitter,
        }
    }

    /// Marshal `root` and everything reachable from it.
    pub(crate) fn run(mut self, graph: &mut ObjectGraph, root: ObjectId) -> Result<(W, usize)> {
        self.marshal(graph, root)?;
        log::trace!(
            "[marshal] {} object(s) assigned reference ids",
            self.repository.len()
        );
        self.emitter.finish()
    }

    fn marshal(&mut self, graph: &mut ObjectGraph, id: ObjectId) -> Result<()> {
        let metadata = self.metadata;
        let runtime = object(graph, id)?.type_name().to_string();
        let mapped = metadata
            .resolve_runtime_type(&runtime)
            .ok_or(OxmError::MappingNotFound(runtime))?;

        self.emitter.start_element(&mapped.element_name)?;
        for ns in &mapped.namespaces {
            self.emitter.write_namespace(&ns.url, ns.prefix.as_deref())?;
        }

        let (reference, emitted) = self.repository.resolve_for_write(id)?;
        self.emitter
            .write_attribute(REPOSITORY_ATTRIBUTE, &reference.to_string())?;
        if emitted {
            log::trace!(
                "[marshal] <{}> {} already written as {}",
                mapped.element_name,
                id,
                reference
            );
            return self.emitter.end_element();
        }
        log::trace!("[marshal] <{}> {} -> {}", mapped.element_name, id, reference);

        run_hook(graph, id, mapped, LifecycleEvent::PreMarshal)?;

        for kind in [NodeKind::Attribute, NodeKind::Text, NodeKind::Element] {
            for field in mapped.fields_of_kind(kind) {
                let value = object(graph, id)?.get(&field.field_name).cloned();
                if value.is_none() && field.required {
                    return Err(OxmError::field_required(&mapped.type_name, &field.field_name));
                }
                if value.is_none() && !field.nillable {
                    continue;
                }
                match kind {
                    NodeKind::Attribute => self.write_attribute(field, value.as_ref())?,
                    NodeKind::Text => self.write_text(field, value.as_ref())?,
                    NodeKind::Element => self.write_element(graph, field, value.as_ref())?,
                }
            }
        }

        run_hook(graph, id, mapped, LifecycleEvent::PostMarshal)?;
        self.emitter.end_element()
    }

    fn write_attribute(&mut self, field: &FieldDescriptor, value: Option<&Value>) -> Result<()> {
        let converter = converter_for(self.types, field)?;
        let text = match (&field.node, value) {
            (_, None) => String::new(),
            (FieldNode::AttributeList { keyed }, Some(value)) => {
                attribute_tokens(converter.as_ref(), value, *keyed)?.join(" ")
            }
            (_, Some(value)) => converter.to_wire(value)?.unwrap_or_default(),
        };
        self.emitter
            .write_attribute(&field.qualified_name(), &text)
    }

    fn write_text(&mut self, field: &FieldDescriptor, value: Option<&Value>) -> Result<()> {
        let converter = converter_for(self.types, field)?;
        let name = field.qualified_name();

        if !field.is_collection() {
            let wire = match value {
                Some(value) => converter.to_wire(value)?,
                None => None,
            };
            return self.emitter.write_element(&name, wire.as_deref());
        }

        let items = value.map(items).unwrap_or_default();
        if items.is_empty() {
            let empty = converter.to_wire(&Value::Null)?;
            return self.emitter.write_element(&name, empty.as_deref());
        }

        let wrapper = field
            .node
            .wrapper()
            .map(|w| qualify(field.prefix.as_deref(), w));
        if let Some(wrapper) = &wrapper {
            self.emitter.start_element(wrapper)?;
        }
        for item in items {
            let wire = converter.to_wire(item)?;
            self.emitter.write_element(&name, wire.as_deref())?;
        }
        if wrapper.is_some() {
            self.emitter.end_element()?;
        }
        Ok(())
    }

    fn write_element(
        &mut self,
        graph: &mut ObjectGraph,
        field: &FieldDescriptor,
        value: Option<&Value>,
    ) -> Result<()> {
        if !self.metadata.is_mapped(&field.type_name) {
            return self.write_text(field, value);
        }

        let children = match value {
            None => Vec::new(),
            Some(value) if field.is_collection() => items(value)
                .into_iter()
                .map(|item| child_ref(field, item))
                .collect::<Result<Vec<_>>>()?,
            Some(value) => vec![child_ref(field, value)?],
        };

        if children.is_empty() {
            return self.emitter.write_element(&field.qualified_name(), None);
        }
        for child in children {
            self.marshal(graph, child)?;
        }
        Ok(())
    }
}

/// Collection elements; a scalar counts as a one-element collection.
fn items(value: &Value) -> Vec<&Value> {
    value.collection_values().unwrap_or_else(|| vec![value])
}

fn child_ref(field: &FieldDescriptor, value: &Value) -> Result<ObjectId> {
    value.as_object().ok_or_else(|| {
        OxmError::Conversion(ConversionError::TypeMismatch {
            type_name: field.type_name.clone(),
            found: value.kind_name().to_string(),
        })
    })
}

/// Space-separated attribute tokens; map entries carry a `key:` prefix,
/// as do list entries (by index) when `keyed` is set.
fn attribute_tokens(
    converter: &dyn TypeConverter,
    value: &Value,
    keyed: bool,
) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    match value {
        Value::Map(entries) => {
            for (key, item) in entries {
                let wire = converter.to_wire(item)?.unwrap_or_default();
                tokens.push(format!("{}:{}", key, wire));
            }
        }
        other => {
            for (index, item) in items(other).into_iter().enumerate() {
                let wire = converter.to_wire(item)?.unwrap_or_default();
                if keyed {
                    tokens.push(format!("{}:{}", index, wire));
                } else {
                    tokens.push(wire);
                }
            }
        }
    }
    Ok(tokens)
}
