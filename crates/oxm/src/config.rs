// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshaller configuration and wire constants.
//!
//! # Example
//!
//! ```
//! use oxm::config::MarshallerConfig;
//!
//! let config = MarshallerConfig::default()
//!     .indent(2)
//!     .encoding("iso-8859-1")
//!     .strict(true);
//! assert_eq!(config.encoding, "ISO-8859-1");
//! ```

use serde::{Deserialize, Serialize};

/// Attribute carrying the per-session reference id on every mapped element.
pub const REPOSITORY_ATTRIBUTE: &str = "repositoryBy";

/// Default indentation width in spaces.
pub const DEFAULT_INDENT: usize = 4;

/// Default declared character encoding.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Default declared document version.
pub const DEFAULT_XML_VERSION: &str = "1.0";

/// Output and parsing options for [`crate::XmlMarshaller`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshallerConfig {
    /// Indentation width in spaces (0 disables pretty-printing).
    pub indent: usize,

    /// Encoding label written into the declaration.
    ///
    /// Only the label changes; output bytes are always UTF-8.
    pub encoding: String,

    /// Version written into the declaration.
    pub xml_version: String,

    /// Fail on unexpected child elements instead of skipping them.
    pub strict: bool,
}

impl Default for MarshallerConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            encoding: DEFAULT_ENCODING.to_string(),
            xml_version: DEFAULT_XML_VERSION.to_string(),
            strict: false,
        }
    }
}

impl MarshallerConfig {
    /// Set indentation width.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set encoding label (stored upper-cased).
    pub fn encoding(mut self, encoding: impl AsRef<str>) -> Self {
        self.encoding = encoding.as_ref().to_uppercase();
        self
    }

    /// Set declared document version.
    pub fn xml_version(mut self, version: impl Into<String>) -> Self {
        self.xml_version = version.into();
        self
    }

    /// Enable or disable strict child matching.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
