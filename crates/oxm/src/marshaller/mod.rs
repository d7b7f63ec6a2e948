// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshal and unmarshal sessions.
//!
//! [`XmlMarshaller`] is the entry point. Every call is one session: a fresh
//! [`ObjectRepository`] numbers (or resolves) mapped elements through the
//! `repositoryBy` attribute and is dropped when the call returns, whether it
//! succeeded or not.
//!
//! # Wire format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <pair repositoryBy="0">
//!     <leaf repositoryBy="1" name="b"/>
//!     <leaf repositoryBy="1"/>
//! </pair>
//! ```
//!
//! A second occurrence of an object carries only its reference id.

mod cursor;
mod emitter;
mod marshal;
mod repository;
mod unmarshal;

pub use cursor::{DocumentCursor, StartTag, TagAttribute, Token};
pub use emitter::DocumentEmitter;
pub use repository::ObjectRepository;

use crate::config::MarshallerConfig;
use crate::error::{OxmError, Result};
use crate::mapping::{FieldDescriptor, LifecycleEvent, MappedType, MappingRegistry, Metadata};
use crate::object::{MappedObject, ObjectGraph, ObjectId};
use crate::types::{TypeConverter, TypeRegistry};
use marshal::MarshalSession;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use unmarshal::UnmarshalSession;

/// Metadata-driven XML marshaller.
///
/// # Example
///
/// ```
/// use oxm::mapping::{MappedTypeBuilder, MappingRegistry};
/// use oxm::object::{MappedObject, ObjectGraph};
/// use oxm::XmlMarshaller;
///
/// let mut registry = MappingRegistry::new();
/// registry
///     .register(MappedTypeBuilder::new("User").attribute("name", "string").build())
///     .unwrap();
/// let marshaller = XmlMarshaller::new(registry);
///
/// let mut graph = ObjectGraph::new();
/// let user = graph.insert(MappedObject::new("User").with("name", "Mal"));
/// let xml = marshaller.marshal_to_string(&mut graph, user).unwrap();
/// assert!(xml.ends_with(r#"<user repositoryBy="0" name="Mal"/>"#));
///
/// let mut read = ObjectGraph::new();
/// let back = marshaller.unmarshal_from_string(&xml, &mut read).unwrap();
/// assert!(ObjectGraph::deep_eq(&graph, user, &read, back));
/// ```
#[derive(Debug, Clone)]
pub struct XmlMarshaller<M: Metadata = MappingRegistry> {
    metadata: M,
    types: Arc<TypeRegistry>,
    config: MarshallerConfig,
}

impl<M: Metadata> XmlMarshaller<M> {
    /// Marshaller over `metadata` with the built-in scalar types.
    pub fn new(metadata: M) -> Self {
        Self::with_types(metadata, Arc::new(TypeRegistry::with_builtins()))
    }

    /// Marshaller with a caller-supplied converter registry.
    pub fn with_types(metadata: M, types: Arc<TypeRegistry>) -> Self {
        Self {
            metadata,
            types,
            config: MarshallerConfig::default(),
        }
    }

    /// Builder-style configuration.
    pub fn with_config(mut self, config: MarshallerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MarshallerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MarshallerConfig) {
        self.config = config;
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Marshal `root` into a document string.
    pub fn marshal_to_string(&self, graph: &mut ObjectGraph, root: ObjectId) -> Result<String> {
        let (bytes, _) = self.marshal_into(graph, root, Vec::new())?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Marshal `root` into `writer`; returns bytes written.
    pub fn marshal_to_writer<W: Write>(
        &self,
        graph: &mut ObjectGraph,
        root: ObjectId,
        writer: W,
    ) -> Result<usize> {
        let (_, written) = self.marshal_into(graph, root, writer)?;
        Ok(written)
    }

    /// Marshal `root` into a newly created file; returns bytes written.
    pub fn marshal_to_stream(
        &self,
        graph: &mut ObjectGraph,
        root: ObjectId,
        path: impl AsRef<Path>,
    ) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| OxmError::StreamOpenFailure {
            target: path.display().to_string(),
            source,
        })?;
        self.marshal_to_writer(graph, root, BufWriter::new(file))
    }

    /// Unmarshal a document string into `graph`; returns the root object.
    pub fn unmarshal_from_string(&self, text: &str, graph: &mut ObjectGraph) -> Result<ObjectId> {
        self.unmarshal_from_reader(text.trim().as_bytes(), graph)
    }

    /// Unmarshal from any buffered source.
    pub fn unmarshal_from_reader<R: BufRead>(
        &self,
        reader: R,
        graph: &mut ObjectGraph,
    ) -> Result<ObjectId> {
        let before = graph.len();
        log::debug!("[unmarshal] session start (strict={})", self.config.strict);

        let mut cursor = DocumentCursor::new(reader);
        let session = UnmarshalSession::new(&self.metadata, &self.types, self.config.strict);
        let result = session.run(&mut cursor, graph);

        match &result {
            Ok(root) => log::debug!(
                "[unmarshal] session end: root {}, {} object(s) created",
                root,
                graph.len() - before
            ),
            Err(e) => log::debug!("[unmarshal] session failed: {}", e),
        }
        result
    }

    /// Unmarshal the document stored at `path`.
    pub fn unmarshal_from_stream(
        &self,
        path: impl AsRef<Path>,
        graph: &mut ObjectGraph,
    ) -> Result<ObjectId> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| OxmError::StreamOpenFailure {
            target: path.display().to_string(),
            source,
        })?;
        self.unmarshal_from_reader(BufReader::new(file), graph)
    }

    fn marshal_into<W: Write>(
        &self,
        graph: &mut ObjectGraph,
        root: ObjectId,
        writer: W,
    ) -> Result<(W, usize)> {
        log::debug!(
            "[marshal] session start: root {} (indent={}, encoding={})",
            root,
            self.config.indent,
            self.config.encoding
        );

        let mut emitter = DocumentEmitter::new(writer, self.config.indent);
        emitter.declaration(&self.config.xml_version, &self.config.encoding)?;
        let result = MarshalSession::new(&self.metadata, &self.types, emitter).run(graph, root);

        match &result {
            Ok((_, written)) => log::debug!("[marshal] session end: {} bytes written", written),
            Err(e) => log::debug!("[marshal] session failed: {}", e),
        }
        result
    }
}

pub(crate) fn converter_for(
    types: &TypeRegistry,
    field: &FieldDescriptor,
) -> Result<Arc<dyn TypeConverter>> {
    types
        .get(&field.type_name)
        .map_err(|_| OxmError::MappingNotFound(field.type_name.clone()))
}

pub(crate) fn object(graph: &ObjectGraph, id: ObjectId) -> Result<&MappedObject> {
    graph
        .get(id)
        .ok_or_else(|| OxmError::MappingNotFound(format!("object {}", id)))
}

pub(crate) fn object_mut(graph: &mut ObjectGraph, id: ObjectId) -> Result<&mut MappedObject> {
    graph
        .get_mut(id)
        .ok_or_else(|| OxmError::MappingNotFound(format!("object {}", id)))
}

pub(crate) fn run_hook(
    graph: &mut ObjectGraph,
    id: ObjectId,
    mapped: &MappedType,
    event: LifecycleEvent,
) -> Result<()> {
    if mapped.has_lifecycle_callbacks(event) {
        mapped.invoke_lifecycle_callbacks(event, object_mut(graph, id)?);
    }
    Ok(())
}
