// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type mapping metadata.

use crate::object::MappedObject;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Namespace binding declared on a mapped element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Namespace URI.
    pub url: String,
    /// Prefix (`None` = default namespace).
    pub prefix: Option<String>,
}

impl Namespace {
    pub fn new(url: impl Into<String>, prefix: Option<&str>) -> Self {
        Self {
            url: url.into(),
            prefix: prefix.map(str::to_string),
        }
    }

    /// Attribute name carrying this binding (`xmlns` or `xmlns:prefix`).
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        }
    }
}

/// Structural classification of a field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Attribute,
    Text,
    Element,
}

/// Node kind and collection-ness of a field, as one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNode {
    /// Single attribute value.
    Attribute,
    /// Space-separated attribute tokens; `keyed` writes `key:value` tokens.
    AttributeList { keyed: bool },
    /// One child element holding text.
    Text,
    /// One child element per value, optionally nested in a wrapper element.
    TextList { wrapper: Option<String> },
    /// Nested mapped object.
    Element,
    /// One nested mapped object per value, never wrapped.
    ElementList,
}

impl FieldNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Attribute | Self::AttributeList { .. } => NodeKind::Attribute,
            Self::Text | Self::TextList { .. } => NodeKind::Text,
            Self::Element | Self::ElementList => NodeKind::Element,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::AttributeList { .. } | Self::TextList { .. } | Self::ElementList
        )
    }

    pub fn wrapper(&self) -> Option<&str> {
        match self {
            Self::TextList { wrapper } => wrapper.as_deref(),
            _ => None,
        }
    }
}

/// Field descriptor for mapped type members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name on the object.
    pub field_name: String,
    /// Attribute or element name on the wire.
    pub wire_name: String,
    /// Wire shape.
    pub node: FieldNode,
    /// Declared type: a mapped type name or a converter name.
    pub type_name: String,
    /// Value must be present on both directions.
    pub required: bool,
    /// Present-but-empty is allowed for an absent value.
    pub nillable: bool,
    /// Namespace prefix written before the wire name.
    pub prefix: Option<String>,
}

impl FieldDescriptor {
    /// Create a new field descriptor; the wire name defaults to the field name.
    pub fn new(field_name: impl Into<String>, node: FieldNode, type_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            wire_name: field_name.clone(),
            field_name,
            node,
            type_name: type_name.into(),
            required: false,
            nillable: false,
            prefix: None,
        }
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as nillable.
    pub fn nillable(mut self) -> Self {
        self.nillable = true;
        self
    }

    /// Set namespace prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set wire name.
    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    pub fn is_collection(&self) -> bool {
        self.node.is_collection()
    }

    /// Wire name with prefix applied.
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.wire_name)
    }
}

pub(crate) fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, name),
        None => name.to_string(),
    }
}

/// Lifecycle points at which a mapped type may run callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    PreMarshal,
    PostMarshal,
    PreUnmarshal,
    PostUnmarshal,
}

/// Callback run against the object being (un)marshalled.
pub type LifecycleCallback = Arc<dyn Fn(&mut MappedObject) + Send + Sync>;

/// A registered type with its wire-format metadata.
#[derive(Clone)]
pub struct MappedType {
    /// Registered type name.
    pub type_name: String,
    /// Element name on the wire.
    pub element_name: String,
    /// Namespace bindings written on the element.
    pub namespaces: Vec<Namespace>,
    /// Field descriptors in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Supertypes, nearest first.
    pub parents: Vec<String>,
    callbacks: HashMap<LifecycleEvent, Vec<LifecycleCallback>>,
}

impl MappedType {
    pub(crate) fn from_parts(
        type_name: String,
        element_name: String,
        namespaces: Vec<Namespace>,
        fields: Vec<FieldDescriptor>,
        parents: Vec<String>,
        callbacks: HashMap<LifecycleEvent, Vec<LifecycleCallback>>,
    ) -> Self {
        Self {
            type_name,
            element_name,
            namespaces,
            fields,
            parents,
            callbacks,
        }
    }

    /// Get field by object field name.
    pub fn field(&self, field_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    /// Attribute field whose wire name is `wire_name`.
    pub fn attribute_field(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.kind() == NodeKind::Attribute && f.wire_name == wire_name)
    }

    /// Text or element field whose wire name is `wire_name`.
    pub fn field_by_wire_name(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.kind() != NodeKind::Attribute && f.wire_name == wire_name)
    }

    /// Text collection field wrapped in an element named `wrapper`.
    pub fn field_by_wrapper(&self, wrapper: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.node.wrapper() == Some(wrapper))
    }

    /// Fields of one node kind, in declaration order.
    pub fn fields_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |f| f.kind() == kind)
    }

    pub fn has_lifecycle_callbacks(&self, event: LifecycleEvent) -> bool {
        self.callbacks.get(&event).is_some_and(|c| !c.is_empty())
    }

    /// Run the callbacks declared for `event`, in registration order.
    pub fn invoke_lifecycle_callbacks(&self, event: LifecycleEvent, object: &mut MappedObject) {
        if let Some(callbacks) = self.callbacks.get(&event) {
            for callback in callbacks {
                callback(object);
            }
        }
    }

    pub(crate) fn callbacks(&self) -> &HashMap<LifecycleEvent, Vec<LifecycleCallback>> {
        &self.callbacks
    }

    /// Fresh, empty instance of this type.
    pub fn new_instance(&self) -> MappedObject {
        MappedObject::new(self.type_name.clone())
    }
}

impl fmt::Debug for MappedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<_> = self.callbacks.keys().collect();
        events.sort_by_key(|e| format!("{:?}", e));
        f.debug_struct("MappedType")
            .field("type_name", &self.type_name)
            .field("element_name", &self.element_name)
            .field("namespaces", &self.namespaces)
            .field("fields", &self.fields)
            .field("parents", &self.parents)
            .field("callbacks", &events)
            .finish()
    }
}
