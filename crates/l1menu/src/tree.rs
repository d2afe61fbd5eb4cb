// crates/l1menu/src/tree.rs

//! A minimal document tree used by the reader and writer.
//!
//! The codec only talks to the `DocumentNode` capability. `Element` is the
//! concrete node; it is built from `quick-xml` events on the way in and
//! streamed back out through a `quick-xml` writer.

use std::io::Write;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::{partial_escape, resolve_predefined_entity};
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};

use crate::error::MenuError;

/// The narrow tree interface the codec depends on.
pub trait DocumentNode: Sized {
    /// Creates a detached node with no text, attributes or children.
    fn create(name: &str) -> Self;

    /// The qualified element name (e.g. `tmxsd:menu`).
    fn name(&self) -> &str;

    /// The first child element called `name`.
    fn find_single_child(&self, name: &str) -> Option<&Self>;

    /// All child elements called `name`, in document order.
    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a;

    /// The text content of the first child called `name`, if that child exists.
    fn text_of(&self, name: &str) -> Option<&str>;

    /// Appends an attribute, keeping insertion order.
    fn set_attribute(&mut self, key: &str, value: &str);

    /// Appends a child element. `None` or empty text yields an empty element.
    fn append_child(&mut self, name: &str, text: Option<&str>) -> &mut Self;

    /// The part of the name after any namespace prefix.
    fn local_name(&self) -> &str {
        let name = self.name();
        name.split_once(':').map_or(name, |(_, local)| local)
    }
}

/// An XML element with its attributes, character data and child elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// The attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Looks up an attribute value by its qualified key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The character data directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All child elements in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Parses `xml` and returns its root element.
    ///
    /// Line endings are normalized to `\n`. Whitespace-only character data
    /// is dropped, so `<comment>  </comment>` has empty text; a value made of
    /// blanks therefore does not survive a write/parse cycle. Comments,
    /// processing instructions and the doctype are skipped.
    pub fn parse(xml: &str) -> Result<Element, MenuError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(Element::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Element::from_start(&e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        MenuError::Malformed("closing tag without an open element".into())
                    })?;
                    if element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(t) => {
                    if let Some(open) = stack.last_mut() {
                        let content = t.xml_content().map_err(quick_xml::Error::from)?;
                        open.text.push_str(&content);
                    }
                }
                Event::CData(c) => {
                    if let Some(open) = stack.last_mut() {
                        let content = c.xml_content().map_err(quick_xml::Error::from)?;
                        open.text.push_str(&content);
                    }
                }
                Event::GeneralRef(r) => {
                    if let Some(open) = stack.last_mut() {
                        push_reference(&mut open.text, &r)?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(MenuError::Malformed(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }
        root.ok_or_else(|| MenuError::Malformed("document has no root element".into()))
    }

    /// Serializes this element as a standalone UTF-8 document with two-space
    /// indentation, an XML declaration and a trailing newline.
    pub fn write_document<W: Write>(&self, sink: W) -> Result<(), MenuError> {
        let mut writer = Writer::new_with_indent(sink, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), Some("no"))))
            .map_err(sink_error)?;
        self.write_element(&mut writer)?;
        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    fn write_element<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), MenuError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_empty() && self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(sink_error)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(sink_error)?;
        if !self.text.is_empty() {
            let escaped = partial_escape(self.text.as_str());
            writer
                .write_event(Event::Text(BytesText::from_escaped(escaped)))
                .map_err(sink_error)?;
        }
        for child in &self.children {
            child.write_element(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(sink_error)?;
        Ok(())
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element, MenuError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut element = Element::create(&name);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| MenuError::Xml(quick_xml::Error::from(e)))?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            element.set_attribute(key, &value);
        }
        Ok(element)
    }
}

impl DocumentNode for Element {
    fn create(name: &str) -> Self {
        Element {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn find_single_child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn text_of(&self, name: &str) -> Option<&str> {
        self.find_single_child(name).map(|c| c.text.as_str())
    }

    fn set_attribute(&mut self, key: &str, value: &str) {
        self.attributes.push((key.to_string(), value.to_string()));
    }

    fn append_child(&mut self, name: &str, text: Option<&str>) -> &mut Self {
        let mut child = Element::create(name);
        if let Some(text) = text {
            child.text = text.to_string();
        }
        let index = self.children.len();
        self.children.push(child);
        &mut self.children[index]
    }
}

// --- Helper Functions ---

/// Hands a finished element to its parent, or makes it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), MenuError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(MenuError::Malformed(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

/// Failures while writing come from the sink, whichever error type the
/// `quick-xml` writer wraps them in.
fn sink_error<E: Into<MenuError>>(e: E) -> MenuError {
    match e.into() {
        MenuError::Xml(quick_xml::Error::Io(io)) => {
            MenuError::Write(std::io::Error::new(io.kind(), io.to_string()))
        }
        other => other,
    }
}

/// Appends the character behind `&name;` to `text`.
fn push_reference(text: &mut String, reference: &BytesRef<'_>) -> Result<(), MenuError> {
    if let Some(ch) = reference.resolve_char_ref().map_err(quick_xml::Error::from)? {
        if !is_xml_char(ch) {
            return Err(MenuError::Malformed(format!(
                "character reference to U+{:04X} is not allowed in XML",
                u32::from(ch)
            )));
        }
        text.push(ch);
        return Ok(());
    }
    let name = reference.decode().map_err(quick_xml::Error::from)?;
    let resolved = resolve_predefined_entity(&name)
        .ok_or_else(|| MenuError::Malformed(format!("unknown entity reference &{};", name)))?;
    text.push_str(resolved);
    Ok(())
}

/// The `Char` production of XML 1.0.
fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
        || ch >= '\u{10000}'
}
