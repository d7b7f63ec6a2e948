// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for marshal/unmarshal sessions.
//!
//! Every variant is fatal to the enclosing call: there is no partial result
//! and no retry. A stream destination may hold a truncated document after a
//! failed marshal.

use crate::types::ConversionError;
use std::io;
use thiserror::Error;

/// Errors raised by the marshaller.
#[derive(Debug, Error)]
pub enum OxmError {
    /// Source or destination could not be opened.
    #[error("Could not open stream {target}: {source}")]
    StreamOpenFailure {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Input text is not a well-formed document.
    #[error("Could not parse document: {0}")]
    DocumentParseFailure(String),

    /// Element name has no registered mapped type.
    #[error("No mapping registered for element <{0}>")]
    UnknownMapping(String),

    /// Runtime object type is not registered.
    #[error("No mapping found for type {0}")]
    MappingNotFound(String),

    /// Required field has no value.
    #[error("Field {field} of {type_name} is required")]
    FieldRequired { type_name: String, field: String },

    /// Unexpected token sequence.
    #[error("Invalid cursor state: {0}")]
    InvalidCursorState(String),

    /// Propagated unchanged from the type converter.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// I/O failure on an already opened stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<quick_xml::Error> for OxmError {
    fn from(e: quick_xml::Error) -> Self {
        match e {
            quick_xml::Error::Io(io) => Self::Io(io::Error::new(io.kind(), io.to_string())),
            other => Self::DocumentParseFailure(other.to_string()),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for OxmError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::DocumentParseFailure(e.to_string())
    }
}

impl OxmError {
    pub(crate) fn field_required(type_name: &str, field: &str) -> Self {
        Self::FieldRequired {
            type_name: type_name.to_string(),
            field: field.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, OxmError>;
