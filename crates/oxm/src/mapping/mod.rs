// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mapping metadata: which types are mapped, how they appear on the wire.
//!
//! A [`MappedType`] carries the element name, namespace bindings, ordered
//! field descriptors, supertypes and lifecycle callbacks of one type. The
//! engine reaches them through the [`Metadata`] trait; [`MappingRegistry`]
//! is the in-memory implementation.
//!
//! # Example
//!
//! ```
//! use oxm::mapping::{MappedTypeBuilder, MappingRegistry, Metadata};
//!
//! let mut registry = MappingRegistry::new();
//! registry
//!     .register(
//!         MappedTypeBuilder::new("User")
//!             .attribute("id", "integer")
//!             .text("name", "string")
//!             .element("address", "Address")
//!             .build(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(registry.by_element("user").unwrap().type_name, "User");
//! ```

mod builder;
mod mapped_type;
mod registry;

pub use builder::MappedTypeBuilder;
pub use mapped_type::{
    FieldDescriptor, FieldNode, LifecycleCallback, LifecycleEvent, MappedType, Namespace, NodeKind,
};
pub use registry::{MappingError, MappingRegistry, Metadata};

pub(crate) use mapped_type::qualify;
