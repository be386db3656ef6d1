//! Minimal XML element tree for WordprocessingML parts
//!
//! Parts are assembled as [`XmlElement`] trees and serialized with quick-xml,
//! which takes care of escaping text and attribute values.

use crate::output::OutputResult;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// A child of an element: a nested element or a text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with qualified name, attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute, builder style
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    /// Appends a child element, builder style
    pub fn child(mut self, element: XmlElement) -> Self {
        self.push(element);
        self
    }

    /// Appends a text node, builder style
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn push(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// All descendant elements with the given name, in document order
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for element in self.elements() {
            if element.name == name {
                found.push(element);
            }
            element.collect_named(name, found);
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => out.push_str(&element.text_content()),
            }
        }
        out
    }

    /// Writes this element and its subtree
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> OutputResult<()> {
        let mut start = BytesStart::new(self.name);
        for (key, value) in &self.attributes {
            start.push_attribute((*key, value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for node in &self.children {
            match node {
                XmlNode::Element(element) => element.write_to(writer)?,
                XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name)))?;

        Ok(())
    }
}

/// Serializes a part's root element with a standalone XML declaration
pub fn render_part(root: &XmlElement) -> OutputResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    root.write_to(&mut writer)?;
    Ok(writer.into_inner())
}
