// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// ============================================================================
// Metadata trait + HashMap implementation
// ============================================================================

use super::MappedType;
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Registry construction failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Element <{element}> is already mapped to {type_name}")]
    DuplicateElement { element: String, type_name: String },

    #[error("Type {0} is already registered")]
    DuplicateType(String),

    #[error("Type {type_name} declares unregistered parent {parent}")]
    UnknownParent { type_name: String, parent: String },
}

/// Lookup of mapped types by type name and by element name.
pub trait Metadata {
    /// Registered type by name.
    fn mapped_type(&self, type_name: &str) -> Option<&MappedType>;

    /// Registered type by element local name.
    fn by_element(&self, element: &str) -> Option<&MappedType>;

    fn is_mapped(&self, type_name: &str) -> bool {
        self.mapped_type(type_name).is_some()
    }

    /// Concrete mapped type for a runtime object type.
    fn resolve_runtime_type(&self, type_name: &str) -> Option<&MappedType> {
        self.mapped_type(type_name)
    }

    /// Supertypes of `type_name`, nearest first, each listed once.
    fn ancestors(&self, type_name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<String> = self
            .mapped_type(type_name)
            .map(|t| t.parents.iter().cloned().collect())
            .unwrap_or_default();
        let mut out = Vec::new();

        while let Some(parent) = queue.pop_front() {
            if parent == type_name || !seen.insert(parent.clone()) {
                continue;
            }
            if let Some(ty) = self.mapped_type(&parent) {
                queue.extend(ty.parents.iter().cloned());
            }
            out.push(parent);
        }
        out
    }
}

/// Simple [`HashMap`]-backed [`Metadata`].
#[derive(Debug, Default, Clone)]
pub struct MappingRegistry {
    types: HashMap<String, MappedType>,
    elements: HashMap<String, String>,
    proxies: HashMap<String, String>,
}

impl MappingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapped type.
    pub fn register(&mut self, mapped: MappedType) -> Result<(), MappingError> {
        if self.types.contains_key(&mapped.type_name) {
            return Err(MappingError::DuplicateType(mapped.type_name));
        }
        if let Some(owner) = self.elements.get(&mapped.element_name) {
            return Err(MappingError::DuplicateElement {
                element: mapped.element_name.clone(),
                type_name: owner.clone(),
            });
        }
        log::trace!(
            "[mapping] registered {} as <{}>",
            mapped.type_name,
            mapped.element_name
        );
        self.elements
            .insert(mapped.element_name.clone(), mapped.type_name.clone());
        self.types.insert(mapped.type_name.clone(), mapped);
        Ok(())
    }

    /// Builder-style [`Self::register`].
    pub fn with(mut self, mapped: MappedType) -> Result<Self, MappingError> {
        self.register(mapped)?;
        Ok(self)
    }

    /// Declare `proxy` as a stand-in runtime type for `underlying`.
    pub fn register_proxy(&mut self, proxy: impl Into<String>, underlying: impl Into<String>) {
        self.proxies.insert(proxy.into(), underlying.into());
    }

    /// Check that every declared parent is registered.
    pub fn validate(&self) -> Result<(), MappingError> {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();
        for name in names {
            let ty = &self.types[name];
            if let Some(parent) = ty.parents.iter().find(|p| !self.types.contains_key(*p)) {
                return Err(MappingError::UnknownParent {
                    type_name: ty.type_name.clone(),
                    parent: parent.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Metadata for MappingRegistry {
    fn mapped_type(&self, type_name: &str) -> Option<&MappedType> {
        self.types.get(type_name)
    }

    fn by_element(&self, element: &str) -> Option<&MappedType> {
        self.elements
            .get(element)
            .and_then(|name| self.types.get(name))
    }

    fn resolve_runtime_type(&self, type_name: &str) -> Option<&MappedType> {
        let resolved = self
            .proxies
            .get(type_name)
            .map_or(type_name, String::as_str);
        self.types.get(resolved)
    }
}
