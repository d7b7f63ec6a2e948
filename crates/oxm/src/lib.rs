// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OXM - Object/XML Mapping
//!
//! Marshal object graphs to XML and back, driven by per-type mapping
//! metadata:
//! - Attributes, text children and nested objects, scalar or repeated
//! - Shared references and cycles via per-session `repositoryBy` ids
//! - Required/nillable field rules enforced in both directions
//! - Pluggable scalar conversion through [`types::TypeConverter`]
//! - Lifecycle callbacks around marshal and unmarshal
//!
//! # Quick Start
//!
//! ```
//! use oxm::{MappedObject, MappedTypeBuilder, MappingRegistry, ObjectGraph, XmlMarshaller};
//!
//! let mut registry = MappingRegistry::new();
//! registry.register(
//!     MappedTypeBuilder::new("Address")
//!         .text("street", "string")
//!         .text("city", "string")
//!         .build(),
//! )?;
//! registry.register(
//!     MappedTypeBuilder::new("User")
//!         .attribute("id", "integer")
//!         .text("name", "string")
//!         .element("address", "Address")
//!         .build(),
//! )?;
//!
//! let marshaller = XmlMarshaller::new(registry);
//!
//! let mut graph = ObjectGraph::new();
//! let address = graph.insert(
//!     MappedObject::new("Address")
//!         .with("street", "27 Foobar Way")
//!         .with("city", "New Haven"),
//! );
//! let user = graph.insert(
//!     MappedObject::new("User")
//!         .with("id", 1)
//!         .with("name", "Malcolm")
//!         .with("address", address),
//! );
//!
//! let xml = marshaller.marshal_to_string(&mut graph, user)?;
//!
//! let mut read = ObjectGraph::new();
//! let root = marshaller.unmarshal_from_string(&xml, &mut read)?;
//! assert!(ObjectGraph::deep_eq(&graph, user, &read, root));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Field Shapes
//!
//! | Field | Wire |
//! |-------|------|
//! | `attribute` | `name="v"` |
//! | `attribute_list` | `name="a b c"` |
//! | `keyed_attribute_list` | `name="k1:a k2:b"` |
//! | `text` | `<name>v</name>` |
//! | `text_list` | `<name>a</name><name>b</name>` |
//! | `wrapped_text_list` | `<wrap><name>a</name><name>b</name></wrap>` |
//! | `element` / `element_list` | nested mapped elements |

pub mod config;
pub mod error;
pub mod mapping;
pub mod marshaller;
pub mod object;
pub mod types;

pub use config::MarshallerConfig;
pub use error::{OxmError, Result};
pub use mapping::{
    FieldDescriptor, FieldNode, LifecycleEvent, MappedType, MappedTypeBuilder, MappingError,
    MappingRegistry, Metadata, Namespace, NodeKind,
};
pub use marshaller::{ObjectRepository, XmlMarshaller};
pub use object::{MappedObject, ObjectGraph, ObjectId, Value};
pub use types::{ConversionError, TypeConverter, TypeRegistry};
