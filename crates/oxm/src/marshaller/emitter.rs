// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Push-writer over a streaming XML writer.
//!
//! The start tag of the innermost element stays pending until content or
//! its end is written, so attributes can be added after `start_element` and
//! an element closed without content is written self-closing.

use crate::error::{OxmError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{self, Write};

/// `Write` adapter counting bytes that reached the destination.
struct CountingWriter<W> {
    inner: W,
    written: usize,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streaming token sink.
pub struct DocumentEmitter<W: Write> {
    writer: Writer<CountingWriter<W>>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl<W: Write> DocumentEmitter<W> {
    /// `indent` spaces per level; 0 writes everything on one line.
    pub fn new(destination: W, indent: usize) -> Self {
        let sink = CountingWriter {
            inner: destination,
            written: 0,
        };
        let writer = if indent == 0 {
            Writer::new(sink)
        } else {
            Writer::new_with_indent(sink, b' ', indent)
        };
        Self {
            writer,
            pending: None,
            open: Vec::new(),
        }
    }

    /// Write the `<?xml ...?>` declaration.
    pub fn declaration(&mut self, version: &str, encoding: &str) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new(version, Some(encoding), None)))?;
        Ok(())
    }

    /// Open an element; attributes may follow until content is written.
    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    /// Add an attribute to the element just opened.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(OxmError::InvalidCursorState(format!(
                "attribute {} written outside a start tag",
                name
            ))),
        }
    }

    /// Add an `xmlns`/`xmlns:prefix` binding to the element just opened.
    pub fn write_namespace(&mut self, url: &str, prefix: Option<&str>) -> Result<()> {
        match prefix {
            Some(prefix) => self.write_attribute(&format!("xmlns:{}", prefix), url),
            None => self.write_attribute("xmlns", url),
        }
    }

    /// Write escaped character data inside the current element.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        if self.open.is_empty() {
            return Err(OxmError::InvalidCursorState(
                "text written outside an element".into(),
            ));
        }
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Close the current element.
    pub fn end_element(&mut self) -> Result<()> {
        let name = self.open.pop().ok_or_else(|| {
            OxmError::InvalidCursorState("end_element without an open element".into())
        })?;
        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self.writer.write_event(Event::End(BytesEnd::new(name)))?,
        }
        Ok(())
    }

    /// `<name>text</name>`, or `<name/>` when `text` is `None`.
    pub fn write_element(&mut self, name: &str, text: Option<&str>) -> Result<()> {
        self.start_element(name)?;
        if let Some(text) = text {
            self.write_text(text)?;
        }
        self.end_element()
    }

    /// Bytes handed to the destination so far.
    pub fn bytes_written(&self) -> usize {
        self.writer.get_ref().written
    }

    /// Flush and return the destination with the total byte count.
    pub fn finish(mut self) -> Result<(W, usize)> {
        if let Some(name) = self.open.last() {
            return Err(OxmError::InvalidCursorState(format!(
                "element <{}> left open",
                name
            )));
        }
        self.writer.get_mut().flush()?;
        let sink = self.writer.into_inner();
        Ok((sink.inner, sink.written))
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}
