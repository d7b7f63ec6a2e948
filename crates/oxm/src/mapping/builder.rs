// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for MappedType.

use super::mapped_type::{
    FieldDescriptor, FieldNode, LifecycleCallback, LifecycleEvent, MappedType, Namespace,
};
use crate::object::MappedObject;
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for creating MappedType instances.
pub struct MappedTypeBuilder {
    type_name: String,
    element_name: Option<String>,
    namespaces: Vec<Namespace>,
    fields: Vec<FieldDescriptor>,
    parents: Vec<String>,
    callbacks: HashMap<LifecycleEvent, Vec<LifecycleCallback>>,
}

impl MappedTypeBuilder {
    /// Create a new builder; the element name defaults to the kebab-cased type name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            element_name: None,
            namespaces: Vec::new(),
            fields: Vec::new(),
            parents: Vec::new(),
            callbacks: HashMap::new(),
        }
    }

    /// Override the element name.
    pub fn element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = Some(name.into());
        self
    }

    /// Declare a namespace binding written on the element.
    pub fn namespace(mut self, url: impl Into<String>, prefix: Option<&str>) -> Self {
        self.namespaces.push(Namespace::new(url, prefix));
        self
    }

    /// Add a field descriptor, replacing any field of the same name.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        match self
            .fields
            .iter_mut()
            .find(|f| f.field_name == field.field_name)
        {
            Some(slot) => *slot = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Add a scalar attribute field.
    pub fn attribute(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldNode::Attribute, type_name))
    }

    /// Add a space-separated attribute list.
    pub fn attribute_list(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(
            name,
            FieldNode::AttributeList { keyed: false },
            type_name,
        ))
    }

    /// Add an attribute list whose map entries are written as `key:value`.
    pub fn keyed_attribute_list(
        self,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        self.field(FieldDescriptor::new(
            name,
            FieldNode::AttributeList { keyed: true },
            type_name,
        ))
    }

    /// Add a text child element.
    pub fn text(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldNode::Text, type_name))
    }

    /// Add repeated text child elements.
    pub fn text_list(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(
            name,
            FieldNode::TextList { wrapper: None },
            type_name,
        ))
    }

    /// Add repeated text child elements nested in a `wrapper` element.
    pub fn wrapped_text_list(
        self,
        name: impl Into<String>,
        wrapper: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        self.field(FieldDescriptor::new(
            name,
            FieldNode::TextList {
                wrapper: Some(wrapper.into()),
            },
            type_name,
        ))
    }

    /// Add a nested mapped object.
    pub fn element(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldNode::Element, type_name))
    }

    /// Add repeated nested mapped objects.
    pub fn element_list(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, FieldNode::ElementList, type_name))
    }

    /// Declare a supertype by name (fields are not copied).
    pub fn parent(mut self, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        if !self.parents.contains(&type_name) {
            self.parents.push(type_name);
        }
        self
    }

    /// Extend a built supertype: its fields come first, its supertypes follow
    /// it in the ancestor list, and its callbacks run before ours.
    pub fn inherit(mut self, parent: &MappedType) -> Self {
        self = self.parent(parent.type_name.clone());
        for ancestor in &parent.parents {
            self = self.parent(ancestor.clone());
        }

        let own = std::mem::take(&mut self.fields);
        self.fields = parent.fields.clone();
        for field in own {
            self = self.field(field);
        }

        for (event, callbacks) in parent.callbacks() {
            let slot = self.callbacks.entry(*event).or_default();
            let mut merged = callbacks.clone();
            merged.append(slot);
            *slot = merged;
        }
        self
    }

    /// Register a lifecycle callback.
    pub fn on<F>(mut self, event: LifecycleEvent, callback: F) -> Self
    where
        F: Fn(&mut MappedObject) + Send + Sync + 'static,
    {
        self.callbacks
            .entry(event)
            .or_default()
            .push(Arc::new(callback));
        self
    }

    /// Build the MappedType.
    pub fn build(self) -> MappedType {
        let element_name = self
            .element_name
            .unwrap_or_else(|| default_element_name(&self.type_name));
        MappedType::from_parts(
            self.type_name,
            element_name,
            self.namespaces,
            self.fields,
            self.parents,
            self.callbacks,
        )
    }
}

/// `app::model::SimpleCompound` -> `simple-compound`.
fn default_element_name(type_name: &str) -> String {
    let short = type_name.rsplit("::").next().unwrap_or(type_name);
    let chars: Vec<char> = short.chars().collect();
    let mut out = String::with_capacity(short.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}
