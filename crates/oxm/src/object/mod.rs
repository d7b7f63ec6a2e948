// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Arena object model.
//!
//! Mapped objects live in an [`ObjectGraph`] and refer to each other through
//! [`ObjectId`] handles, so shared references and cycles are plain index
//! equality.
//!
//! ```
//! use oxm::object::{MappedObject, ObjectGraph, Value};
//!
//! let mut graph = ObjectGraph::new();
//! let b = graph.insert(MappedObject::new("Leaf").with("name", "b"));
//! let a = graph.insert(MappedObject::new("Pair").with("left", b).with("right", b));
//!
//! let pair = graph.get(a).unwrap();
//! assert_eq!(pair.get("left"), pair.get("right"));
//! assert_eq!(pair.get("left").and_then(Value::as_object), Some(b));
//! ```

mod graph;
mod value;

pub use graph::{MappedObject, ObjectGraph, ObjectId};
pub use value::Value;
