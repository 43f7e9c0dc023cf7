//! # Qt Linguist Catalog Format
//!
//! Reader and writer for `.ts` translation sources.
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <!DOCTYPE TS>
//! <TS version="2.0" language="fi_FI">
//! <context>
//!     <name>MainMenu</name>
//!     <message>
//!         <location filename="../mainmenu.cpp" line="36"/>
//!         <source>Play</source>
//!         <translation>Pelaa</translation>
//!     </message>
//! </context>
//! </TS>
//! ```
//!
//! The writer reproduces the lupdate layout exactly, so a file written by
//! lupdate survives read -> write byte for byte. Control characters are
//! carried as `<byte value="x1b"/>` elements, as lupdate does.
//!
//! Line endings in text are normalised to `\n` on read (XML 1.0 §2.11), so a
//! catalog checked out with CRLF endings yields the same keys as the LF file.
//! A carriage return that is part of the text is written as `&#xd;`.
//!
//! Plural (`numerus`) messages are rejected with `CatalogError::Unsupported`.

use crate::primitives::MAX_CATALOG_SIZE;
use crate::{Catalog, CatalogError, Context, LineNumber, Location, Message, Translation};
use crate::{TranslationStatus, types::DEFAULT_TS_VERSION};
use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use std::fmt;

// =============================================================================
// READER
// =============================================================================

/// Parse a catalog from `.ts` text.
///
/// Fails on malformed XML, on messages without source text and on elements
/// the format does not define. Attributes the format does not define are
/// ignored. Duplicate keys are NOT checked here; the document model keeps
/// them so `validate` can report them.
pub fn catalog_from_str(input: &str) -> Result<Catalog, CatalogError> {
    if input.len() > MAX_CATALOG_SIZE {
        return Err(CatalogError::IoError(format!(
            "Catalog size {} bytes exceeds maximum allowed {} bytes",
            input.len(),
            MAX_CATALOG_SIZE
        )));
    }
    TsReader::new(input).read_document()
}

/// Parse a catalog from raw bytes, which must be UTF-8.
pub fn catalog_from_bytes(bytes: &[u8]) -> Result<Catalog, CatalogError> {
    let text = std::str::from_utf8(bytes).map_err(|e| CatalogError::Xml {
        line: line_of(bytes, e.valid_up_to()),
        message: format!("invalid UTF-8: {}", e),
    })?;
    catalog_from_str(text)
}

/// 1-based line number of a byte offset.
fn line_of(bytes: &[u8], offset: usize) -> usize {
    let end = offset.min(bytes.len());
    bytes[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

fn name_of(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn is_blank(raw: &[u8]) -> bool {
    raw.iter().all(u8::is_ascii_whitespace)
}

/// Name of an `<extra-NAME>` element.
fn extra_name(raw: &[u8]) -> Option<String> {
    raw.strip_prefix(b"extra-")
        .filter(|name| !name.is_empty())
        .map(name_of)
}

/// Replace `\r\n` and lone `\r` with `\n`.
fn normalize_newlines(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Event-driven reader over one document.
struct TsReader<'a> {
    input: &'a str,
    reader: Reader<&'a [u8]>,
}

impl<'a> TsReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            reader: Reader::from_str(input),
        }
    }

    fn line(&self) -> usize {
        let position = usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX);
        line_of(self.input.as_bytes(), position)
    }

    fn xml_error(&self, message: impl fmt::Display) -> CatalogError {
        CatalogError::Xml {
            line: self.line(),
            message: message.to_string(),
        }
    }

    fn unexpected(&self, raw: &[u8]) -> CatalogError {
        CatalogError::UnexpectedElement {
            element: name_of(raw),
            line: self.line(),
        }
    }

    fn next(&mut self) -> Result<Event<'a>, CatalogError> {
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(e) => Err(self.xml_error(e)),
        }
    }

    fn attributes(&self, element: &BytesStart<'_>) -> Result<Vec<(String, String)>, CatalogError> {
        let mut out = Vec::new();
        for attr in element.attributes() {
            let attr = attr.map_err(|e| self.xml_error(e))?;
            let value = attr.unescape_value().map_err(|e| self.xml_error(e))?;
            out.push((name_of(attr.key.as_ref()), value.into_owned()));
        }
        Ok(out)
    }

    /// Skip prolog, read the `<TS>` root, and require nothing but
    /// whitespace and comments after it.
    fn read_document(mut self) -> Result<Catalog, CatalogError> {
        let mut catalog = None;

        loop {
            match self.next()? {
                Event::Start(e) => {
                    if catalog.is_some() {
                        return Err(self.unexpected(e.name().as_ref()));
                    }
                    if e.name().as_ref() != b"TS" {
                        return Err(CatalogError::NotACatalog(name_of(e.name().as_ref())));
                    }
                    let mut root = self.read_root_attributes(&e)?;
                    self.read_root_body(&mut root)?;
                    catalog = Some(root);
                }
                Event::Empty(e) => {
                    if catalog.is_some() {
                        return Err(self.unexpected(e.name().as_ref()));
                    }
                    if e.name().as_ref() != b"TS" {
                        return Err(CatalogError::NotACatalog(name_of(e.name().as_ref())));
                    }
                    catalog = Some(self.read_root_attributes(&e)?);
                }
                Event::Text(t) if is_blank(&t) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.xml_error("text outside of the root element"));
                }
                Event::Eof => break,
                // Declaration, doctype, comments, processing instructions
                _ => {}
            }
        }

        catalog.ok_or_else(|| self.xml_error("document has no root element"))
    }

    fn read_root_attributes(&self, element: &BytesStart<'_>) -> Result<Catalog, CatalogError> {
        let mut catalog = Catalog {
            version: DEFAULT_TS_VERSION.to_string(),
            language: None,
            source_language: None,
            default_codec: None,
            dependencies: Vec::new(),
            extras: Vec::new(),
            contexts: Vec::new(),
        };
        for (key, value) in self.attributes(element)? {
            match key.as_str() {
                "version" => catalog.version = value,
                "language" => catalog.language = Some(value),
                "sourcelanguage" => catalog.source_language = Some(value),
                _ => {}
            }
        }
        Ok(catalog)
    }

    fn read_root_body(&mut self, catalog: &mut Catalog) -> Result<(), CatalogError> {
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"context" => {
                    let context = self.read_context()?;
                    catalog.contexts.push(context);
                }
                Event::Empty(e) if e.name().as_ref() == b"context" => {
                    return Err(CatalogError::MissingContextName { line: self.line() });
                }
                Event::Start(e) => match e.name().as_ref() {
                    b"defaultcodec" => catalog.default_codec = Some(self.read_text()?),
                    b"dependencies" => self.read_dependencies(&mut catalog.dependencies)?,
                    other => match extra_name(other) {
                        Some(name) => {
                            let value = self.read_text()?;
                            catalog.extras.push((name, value));
                        }
                        None => return Err(self.unexpected(other)),
                    },
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"defaultcodec" => catalog.default_codec = Some(String::new()),
                    b"dependencies" => {}
                    other => match extra_name(other) {
                        Some(name) => catalog.extras.push((name, String::new())),
                        None => return Err(self.unexpected(other)),
                    },
                },
                Event::End(_) => return Ok(()),
                Event::Text(t) if is_blank(&t) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.xml_error("unexpected text inside <TS>"));
                }
                Event::Eof => return Err(self.xml_error("unexpected end of document in <TS>")),
                _ => {}
            }
        }
    }

    fn read_context(&mut self) -> Result<Context, CatalogError> {
        let start_line = self.line();
        let mut name = None;
        let mut comment = None;
        let mut messages = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"name" => name = Some(self.read_text()?),
                    b"comment" => comment = Some(self.read_text()?),
                    b"message" => {
                        let context_name = name.clone().unwrap_or_default();
                        let message = self.read_message(&e, &context_name)?;
                        messages.push(message);
                    }
                    other => return Err(self.unexpected(other)),
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"name" => name = Some(String::new()),
                    b"comment" => comment = Some(String::new()),
                    b"message" => {
                        return Err(CatalogError::MissingSource {
                            context: name.clone().unwrap_or_default(),
                            line: self.line(),
                        });
                    }
                    other => return Err(self.unexpected(other)),
                },
                Event::End(_) => break,
                Event::Text(t) if is_blank(&t) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.xml_error("unexpected text inside <context>"));
                }
                Event::Eof => {
                    return Err(self.xml_error("unexpected end of document in <context>"));
                }
                _ => {}
            }
        }

        let name = name.ok_or(CatalogError::MissingContextName { line: start_line })?;
        Ok(Context {
            name,
            comment,
            messages,
        })
    }

    fn read_message(
        &mut self,
        start: &BytesStart<'_>,
        context: &str,
    ) -> Result<Message, CatalogError> {
        let start_line = self.line();
        let mut message = Message::new(String::new());
        let mut has_source = false;

        for (key, value) in self.attributes(start)? {
            match key.as_str() {
                "id" => message.id = Some(value),
                "numerus" if value == "yes" => {
                    return Err(CatalogError::Unsupported(format!(
                        "plural message in context '{}' (line {})",
                        context, start_line
                    )));
                }
                _ => {}
            }
        }

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"location" => {
                        message.locations.push(self.read_location(&e)?);
                        self.skip_to_end()?;
                    }
                    b"source" => {
                        message.source = self.read_text()?;
                        has_source = true;
                    }
                    b"oldsource" => message.old_source = Some(self.read_text()?),
                    b"comment" => message.comment = Some(self.read_text()?),
                    b"oldcomment" => message.old_comment = Some(self.read_text()?),
                    b"extracomment" => message.extra_comment = Some(self.read_text()?),
                    b"translatorcomment" => message.translator_comment = Some(self.read_text()?),
                    b"translation" => {
                        let status = self.read_status(&e)?;
                        let text = self.read_text()?;
                        message.translation = Some(Translation::new(text, status));
                    }
                    b"userdata" => message.user_data = Some(self.read_text()?),
                    other => match extra_name(other) {
                        Some(name) => {
                            let value = self.read_text()?;
                            message.extras.push((name, value));
                        }
                        None => return Err(self.unexpected(other)),
                    },
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"location" => message.locations.push(self.read_location(&e)?),
                    b"source" => has_source = true,
                    b"oldsource" => message.old_source = Some(String::new()),
                    b"comment" => message.comment = Some(String::new()),
                    b"oldcomment" => message.old_comment = Some(String::new()),
                    b"extracomment" => message.extra_comment = Some(String::new()),
                    b"translatorcomment" => message.translator_comment = Some(String::new()),
                    b"translation" => {
                        let status = self.read_status(&e)?;
                        message.translation = Some(Translation::new(String::new(), status));
                    }
                    b"userdata" => message.user_data = Some(String::new()),
                    other => match extra_name(other) {
                        Some(name) => message.extras.push((name, String::new())),
                        None => return Err(self.unexpected(other)),
                    },
                },
                Event::End(_) => break,
                Event::Text(t) if is_blank(&t) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.xml_error("unexpected text inside <message>"));
                }
                Event::Eof => {
                    return Err(self.xml_error("unexpected end of document in <message>"));
                }
                _ => {}
            }
        }

        if !has_source || message.source.is_empty() {
            return Err(CatalogError::MissingSource {
                context: context.to_string(),
                line: start_line,
            });
        }
        Ok(message)
    }

    fn read_location(&self, element: &BytesStart<'_>) -> Result<Location, CatalogError> {
        let mut location = Location {
            filename: None,
            line: None,
        };
        for (key, value) in self.attributes(element)? {
            match key.as_str() {
                "filename" => location.filename = Some(value),
                "line" => location.line = Some(value.parse::<LineNumber>()?),
                _ => {}
            }
        }
        Ok(location)
    }

    fn read_status(&self, element: &BytesStart<'_>) -> Result<TranslationStatus, CatalogError> {
        for (key, value) in self.attributes(element)? {
            if key == "type" {
                return TranslationStatus::from_type_attr(&value).ok_or(
                    CatalogError::InvalidAttribute {
                        attribute: key,
                        value,
                    },
                );
            }
        }
        Ok(TranslationStatus::Finished)
    }

    /// Collect the text content of the current element up to its end tag.
    fn read_text(&mut self) -> Result<String, CatalogError> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Event::Text(t) => {
                    let raw = std::str::from_utf8(&t).map_err(|e| self.xml_error(e))?;
                    let normalized = normalize_newlines(raw);
                    let unescaped = unescape(&normalized).map_err(|e| self.xml_error(e))?;
                    text.push_str(&unescaped);
                }
                Event::CData(c) => {
                    let raw = std::str::from_utf8(&c).map_err(|e| self.xml_error(e))?;
                    text.push_str(&normalize_newlines(raw));
                }
                Event::Empty(e) if e.name().as_ref() == b"byte" => {
                    text.push(self.read_byte(&e)?);
                }
                Event::Start(e) if e.name().as_ref() == b"numerusform" => {
                    return Err(CatalogError::Unsupported(format!(
                        "plural forms (line {})",
                        self.line()
                    )));
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.unexpected(e.name().as_ref()));
                }
                Event::End(_) => return Ok(text),
                Event::Eof => return Err(self.xml_error("unexpected end of document in text")),
                _ => {}
            }
        }
    }

    /// Decode `<byte value="x1b"/>` (hex) or `<byte value="27"/>` (decimal).
    fn read_byte(&self, element: &BytesStart<'_>) -> Result<char, CatalogError> {
        let value = self
            .attributes(element)?
            .into_iter()
            .find(|(key, _)| key == "value")
            .map(|(_, value)| value)
            .unwrap_or_default();

        let code = match value.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => value.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .ok_or(CatalogError::InvalidAttribute {
                attribute: "value".to_string(),
                value,
            })
    }

    /// Read `<dependency catalog="..."/>` entries up to `</dependencies>`.
    fn read_dependencies(&mut self, dependencies: &mut Vec<String>) -> Result<(), CatalogError> {
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"dependency" => {
                    dependencies.push(self.read_catalog_attr(&e)?);
                    self.skip_to_end()?;
                }
                Event::Empty(e) if e.name().as_ref() == b"dependency" => {
                    dependencies.push(self.read_catalog_attr(&e)?);
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.unexpected(e.name().as_ref()));
                }
                Event::End(_) => return Ok(()),
                Event::Text(t) if is_blank(&t) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(self.xml_error("unexpected text inside <dependencies>"));
                }
                Event::Eof => {
                    return Err(self.xml_error("unexpected end of document in <dependencies>"));
                }
                _ => {}
            }
        }
    }

    fn read_catalog_attr(&self, element: &BytesStart<'_>) -> Result<String, CatalogError> {
        Ok(self
            .attributes(element)?
            .into_iter()
            .find(|(key, _)| key == "catalog")
            .map(|(_, value)| value)
            .unwrap_or_default())
    }

    /// Consume everything up to the end tag of an element whose content is
    /// ignored (a non-empty `<location>`).
    fn skip_to_end(&mut self) -> Result<(), CatalogError> {
        loop {
            match self.next()? {
                Event::End(_) => return Ok(()),
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.unexpected(e.name().as_ref()));
                }
                Event::Eof => return Err(self.xml_error("unexpected end of document")),
                _ => {}
            }
        }
    }
}

// =============================================================================
// WRITER
// =============================================================================

const MESSAGE_INDENT: &str = "    ";
const FIELD_INDENT: &str = "        ";

/// Serialize a catalog in the lupdate layout.
///
/// Pure transformation, no file I/O. Only the modelled elements and
/// attributes are written; attributes the reader ignored are not restored.
pub fn catalog_to_string(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(catalog.message_count() * 160 + 128);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");
    out.push_str(&format!("<TS version=\"{}\"", escape(&catalog.version)));
    if let Some(language) = &catalog.language {
        out.push_str(&format!(" language=\"{}\"", escape(language)));
    }
    if let Some(source_language) = &catalog.source_language {
        out.push_str(&format!(" sourcelanguage=\"{}\"", escape(source_language)));
    }
    out.push_str(">\n");

    if let Some(codec) = &catalog.default_codec {
        write_element(&mut out, "", "defaultcodec", "", codec);
    }
    if !catalog.dependencies.is_empty() {
        out.push_str("<dependencies>\n");
        for dependency in &catalog.dependencies {
            out.push_str(&format!("<dependency catalog=\"{}\"/>\n", escape(dependency)));
        }
        out.push_str("</dependencies>\n");
    }
    write_extras(&mut out, MESSAGE_INDENT, &catalog.extras);

    for context in &catalog.contexts {
        write_context(&mut out, context);
    }

    out.push_str("</TS>\n");
    out
}

fn write_context(out: &mut String, context: &Context) {
    out.push_str("<context>\n");
    write_element(out, MESSAGE_INDENT, "name", "", &context.name);
    if let Some(comment) = &context.comment {
        write_element(out, MESSAGE_INDENT, "comment", "", comment);
    }
    for message in &context.messages {
        write_message(out, message);
    }
    out.push_str("</context>\n");
}

fn write_message(out: &mut String, message: &Message) {
    out.push_str(MESSAGE_INDENT);
    match &message.id {
        Some(id) => out.push_str(&format!("<message id=\"{}\">\n", escape(id))),
        None => out.push_str("<message>\n"),
    }

    for location in &message.locations {
        out.push_str(FIELD_INDENT);
        out.push_str("<location");
        if let Some(filename) = &location.filename {
            out.push_str(&format!(" filename=\"{}\"", escape(filename)));
        }
        if let Some(line) = &location.line {
            out.push_str(&format!(" line=\"{}\"", line));
        }
        out.push_str("/>\n");
    }

    write_element(out, FIELD_INDENT, "source", "", &message.source);
    let optional_fields = [
        ("oldsource", &message.old_source),
        ("comment", &message.comment),
        ("oldcomment", &message.old_comment),
        ("extracomment", &message.extra_comment),
        ("translatorcomment", &message.translator_comment),
    ];
    for (tag, value) in optional_fields {
        if let Some(value) = value {
            write_element(out, FIELD_INDENT, tag, "", value);
        }
    }

    if let Some(translation) = &message.translation {
        let attrs = translation
            .status
            .type_attr()
            .map(|t| format!(" type=\"{}\"", t))
            .unwrap_or_default();
        write_element(out, FIELD_INDENT, "translation", &attrs, &translation.text);
    }
    if let Some(user_data) = &message.user_data {
        write_element(out, FIELD_INDENT, "userdata", "", user_data);
    }
    write_extras(out, FIELD_INDENT, &message.extras);

    out.push_str(MESSAGE_INDENT);
    out.push_str("</message>\n");
}

fn write_extras(out: &mut String, indent: &str, extras: &[(String, String)]) {
    for (name, value) in extras {
        write_element(out, indent, &format!("extra-{}", name), "", value);
    }
}

fn write_element(out: &mut String, indent: &str, tag: &str, attrs: &str, text: &str) {
    out.push_str(indent);
    out.push_str(&format!("<{}{}>", tag, attrs));
    protect_into(out, text);
    out.push_str(&format!("</{}>\n", tag));
}

/// Escape text content. Control characters other than tab, CR and LF are not
/// representable in XML 1.0 and become `<byte>` elements. CR becomes a
/// character reference, since a raw one is read back as LF.
fn protect_into(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(pos) = rest.find(needs_reference) {
        let (plain, tail) = rest.split_at(pos);
        out.push_str(&escape(plain));
        let mut chars = tail.chars();
        match chars.next() {
            Some('\r') => out.push_str("&#xd;"),
            Some(c) => out.push_str(&format!("<byte value=\"x{:x}\"/>", c as u32)),
            None => {}
        }
        rest = chars.as_str();
    }
    out.push_str(&escape(rest));
}

fn needs_reference(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n')
}

// =============================================================================
// TESTS
// =============================================================================
