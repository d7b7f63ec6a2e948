// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pull-reader over a streaming XML tokenizer.
//!
//! Wraps `quick_xml::Reader` and hands the engine owned tokens with local
//! names already split off, so the engine never holds a borrow of the read
//! buffer across recursive calls.

use crate::error::{OxmError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

/// One attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAttribute {
    /// Name as written, prefix included.
    pub name: String,
    /// Name without prefix.
    pub local_name: String,
    /// Unescaped value.
    pub value: String,
}

impl TagAttribute {
    /// `xmlns` or `xmlns:*` binding.
    pub fn is_namespace_binding(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

/// A start-element token (`<a ...>` or `<a .../>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Local name.
    pub name: String,
    pub attributes: Vec<TagAttribute>,
    pub self_closing: bool,
}

impl StartTag {
    /// Value of the attribute with local name `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == name)
            .map(|a| a.value.as_str())
    }
}

/// Significant tokens; comments, processing instructions and the like are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(StartTag),
    /// End tag, by local name.
    End(String),
    /// Character data (text or CDATA), unescaped.
    Text(String),
    Eof,
}

/// Streaming token source.
pub struct DocumentCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> DocumentCursor<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::with_capacity(1024),
        }
    }

    /// Read the next significant token.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            self.buf.clear();
            let token = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => Token::Start(start_tag(&e, false)?),
                Event::Empty(e) => Token::Start(start_tag(&e, true)?),
                Event::End(e) => Token::End(utf8(e.local_name().as_ref())?),
                Event::Text(e) => Token::Text(e.unescape()?.into_owned()),
                Event::CData(e) => Token::Text(utf8(&e.into_inner())?),
                Event::Eof => Token::Eof,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => continue,
            };
            return Ok(token);
        }
    }

    /// Skip the prolog and return the root start tag.
    pub fn root(&mut self) -> Result<StartTag> {
        loop {
            match self.next_token()? {
                Token::Start(tag) => return Ok(tag),
                Token::Text(text) if text.trim().is_empty() => continue,
                Token::Text(text) => {
                    return Err(OxmError::DocumentParseFailure(format!(
                        "text before root element: {:?}",
                        text.trim()
                    )))
                }
                Token::End(name) => {
                    return Err(OxmError::DocumentParseFailure(format!(
                        "unexpected </{}> before root element",
                        name
                    )))
                }
                Token::Eof => {
                    return Err(OxmError::DocumentParseFailure(
                        "document has no root element".into(),
                    ))
                }
            }
        }
    }

    /// Consume everything up to and including the end tag matching `tag`.
    pub fn skip_element(&mut self, tag: &StartTag) -> Result<()> {
        if tag.self_closing {
            return Ok(());
        }
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::Start(inner) if !inner.self_closing => depth += 1,
                Token::End(_) if depth == 0 => return Ok(()),
                Token::End(_) => depth -= 1,
                Token::Eof => return Err(unexpected_eof(&tag.name)),
                _ => {}
            }
        }
    }
}

pub(crate) fn unexpected_eof(element: &str) -> OxmError {
    OxmError::DocumentParseFailure(format!("unexpected end of document inside <{}>", element))
}

fn start_tag(e: &BytesStart<'_>, self_closing: bool) -> Result<StartTag> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        attributes.push(TagAttribute {
            name: utf8(attr.key.as_ref())?,
            local_name: utf8(attr.key.local_name().as_ref())?,
            value: attr.unescape_value()?.into_owned(),
        });
    }
    Ok(StartTag {
        name: utf8(e.local_name().as_ref())?,
        attributes,
        self_closing,
    })
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| OxmError::DocumentParseFailure(e.to_string()))
}
