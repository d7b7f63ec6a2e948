// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire-string to native-value conversion, keyed by declared type name.
//!
//! The engine never inspects native representations itself: every leaf
//! field goes through the [`TypeConverter`] registered for its declared
//! type, so new scalar types only need a new converter.
//!
//! # Example
//!
//! ```
//! use oxm::types::TypeRegistry;
//! use oxm::object::Value;
//!
//! let types = TypeRegistry::with_builtins();
//! let int = types.get("integer").unwrap();
//! assert_eq!(int.to_wire(&Value::Int(7)).unwrap().as_deref(), Some("7"));
//! assert_eq!(int.to_native(Some("7")).unwrap(), Value::Int(7));
//! ```

mod builtin;

pub use builtin::{
    BooleanType, DateTimeType, DateType, FloatType, IntegerType, StringType, BOOLEAN, DATE,
    DATETIME, DATETIME_FORMAT, DATE_FORMAT, FLOAT, INTEGER, STRING,
};

use crate::object::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Conversion failures, propagated unchanged by the engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Could not convert '{value}' to {type_name}: {reason}")]
    InvalidValue {
        type_name: String,
        value: String,
        reason: String,
    },

    #[error("Type {type_name} cannot hold a {found} value")]
    TypeMismatch { type_name: String, found: String },

    #[error("Type {type_name} does not accept null")]
    NullNotAllowed { type_name: String },
}

impl ConversionError {
    pub(crate) fn invalid(type_name: &str, value: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidValue {
            type_name: type_name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn mismatch(type_name: &str, found: &Value) -> Self {
        Self::TypeMismatch {
            type_name: type_name.to_string(),
            found: found.kind_name().to_string(),
        }
    }
}

/// Converter registration failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Type {0} already exists")]
    TypeExists(String),
}

/// Coercion between wire strings and native [`Value`]s for one declared type.
pub trait TypeConverter: Send + Sync {
    /// Declared type name.
    fn name(&self) -> &str;

    /// Native value to wire text; `None` is the canonical null representation.
    fn to_wire(&self, value: &Value) -> Result<Option<String>, ConversionError>;

    /// Wire text (or its absence) to a native value.
    fn to_native(&self, wire: Option<&str>) -> Result<Value, ConversionError>;
}

impl fmt::Debug for dyn TypeConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeConverter({})", self.name())
    }
}

/// Registry of converters by declared type name.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    converters: HashMap<String, Arc<dyn TypeConverter>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in scalar types.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [Arc<dyn TypeConverter>; 6] = [
            Arc::new(StringType),
            Arc::new(IntegerType),
            Arc::new(BooleanType),
            Arc::new(FloatType),
            Arc::new(DateTimeType),
            Arc::new(DateType),
        ];
        for converter in builtins {
            registry
                .converters
                .insert(converter.name().to_string(), converter);
        }
        registry
    }

    /// Look up a converter.
    pub fn get(&self, name: &str) -> Result<Arc<dyn TypeConverter>, RegistryError> {
        self.converters
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Register a new type; fails if `name` is taken.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        converter: Arc<dyn TypeConverter>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.converters.contains_key(&name) {
            return Err(RegistryError::TypeExists(name));
        }
        self.converters.insert(name, converter);
        Ok(())
    }

    /// Replace an existing type; fails if `name` is unknown.
    pub fn override_type(
        &mut self,
        name: &str,
        converter: Arc<dyn TypeConverter>,
    ) -> Result<(), RegistryError> {
        match self.converters.get_mut(name) {
            Some(slot) => {
                *slot = converter;
                Ok(())
            }
            None => Err(RegistryError::UnknownType(name.to_string())),
        }
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
