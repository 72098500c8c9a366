//! Generic markup tokenizer.
//!
//! The codec only needs text → element tree. [`MarkupParser`] is that seam;
//! [`QuickXmlParser`] is the default implementation.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::TokenizerError;

/// A node of the generic tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// A generic element: qualified name, attributes in document order, and
/// children. Knows nothing about the state-chart format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the raw value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Element children, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }
}

/// Turns markup text into a generic element tree.
pub trait MarkupParser {
    fn parse_tree(&self, text: &str) -> Result<XmlElement, TokenizerError>;
}

/// [`MarkupParser`] backed by `quick-xml`.
///
/// Comments, processing instructions, declarations and doctypes are dropped.
/// CDATA sections become text and entity references are resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickXmlParser;

impl QuickXmlParser {
    pub fn new() -> Self {
        Self
    }

    fn element(
        &self,
        reader: &Reader<&[u8]>,
        start: &BytesStart,
    ) -> Result<XmlElement, TokenizerError> {
        let name = reader.decoder().decode(start.name().as_ref())?.into_owned();
        let mut element = XmlElement::new(name);
        for attr in start.attributes() {
            let attr = attr?;
            let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
            let value = attr
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }
}

impl MarkupParser for QuickXmlParser {
    fn parse_tree(&self, text: &str) -> Result<XmlElement, TokenizerError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event_into(&mut buf)?;
            if root.is_some() {
                if let Some(found) = trailing(&reader, &event)? {
                    return Err(TokenizerError::TrailingContent { found });
                }
            }
            match event {
                Event::Start(e) => {
                    let element = self.element(&reader, &e)?;
                    stack.push(element);
                }
                Event::Empty(e) => {
                    let element = self.element(&reader, &e)?;
                    if let Some(done) = close(&mut stack, element) {
                        root = Some(done);
                    }
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        if let Some(done) = close(&mut stack, element) {
                            root = Some(done);
                        }
                    }
                }
                Event::Text(e) => {
                    if let Some(top) = stack.last_mut() {
                        let text = reader.decoder().decode(&e)?;
                        top.push_text(&text);
                    }
                }
                Event::GeneralRef(e) => {
                    if let Some(top) = stack.last_mut() {
                        let entity = reader.decoder().decode(&e)?;
                        top.push_text(&decode_entity(&entity));
                    }
                }
                Event::CData(e) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(&String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => {
                    return match (root, stack.pop()) {
                        (Some(root), _) => Ok(root),
                        (None, Some(open)) => {
                            Err(TokenizerError::UnexpectedEof { open: open.name })
                        }
                        (None, None) => Err(TokenizerError::NoRootElement),
                    };
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }
    }
}

/// Describes an event that is not allowed once the root element has closed.
/// Whitespace, comments and processing instructions are allowed.
fn trailing(reader: &Reader<&[u8]>, event: &Event) -> Result<Option<String>, TokenizerError> {
    let found = match event {
        Event::Start(e) | Event::Empty(e) => {
            let qname = e.name();
            let name = reader.decoder().decode(qname.as_ref())?;
            Some(format!("<{}>", name))
        }
        Event::End(e) => {
            let qname = e.name();
            let name = reader.decoder().decode(qname.as_ref())?;
            Some(format!("</{}>", name))
        }
        Event::Text(e) => {
            let text = reader.decoder().decode(e)?;
            let text = text.trim();
            (!text.is_empty()).then(|| format!("text {:?}", text))
        }
        Event::GeneralRef(e) => {
            let entity = reader.decoder().decode(e)?;
            Some(format!("&{};", entity))
        }
        Event::CData(_) => Some("CDATA section".to_string()),
        Event::DocType(_) => Some("doctype".to_string()),
        Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::Eof => None,
    };
    Ok(found)
}

/// Attaches a finished element to its parent, or returns it when it is the
/// root.
fn close(stack: &mut [XmlElement], element: XmlElement) -> Option<XmlElement> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            None
        }
        None => Some(element),
    }
}

/// Resolves an entity reference name to its text.
fn decode_entity(entity: &str) -> Cow<'_, str> {
    match entity {
        "lt" => Cow::Borrowed("<"),
        "gt" => Cow::Borrowed(">"),
        "amp" => Cow::Borrowed("&"),
        "apos" => Cow::Borrowed("'"),
        "quot" => Cow::Borrowed("\""),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| Cow::Owned(format!("&{entity};")), |c| Cow::Owned(c.to_string()))
        }
        // Unknown entity, kept as written
        _ => Cow::Owned(format!("&{entity};")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<XmlElement, TokenizerError> {
        QuickXmlParser::new().parse_tree(text)
    }

    #[test]
    fn test_parse_nested_elements() {
        let root = parse(r#"<a x="1"><b/><c y="2">hi</c></a>"#).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("x"), Some("1"));

        let children: Vec<_> = root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(children, vec!["b", "c"]);

        let c = root.elements().nth(1).unwrap();
        assert_eq!(c.attr("y"), Some("2"));
        assert_eq!(c.text(), "hi");
    }

    #[test]
    fn test_attribute_order_preserved() {
        let root = parse(r#"<a z="1" b="2" m="3"/>"#).unwrap();
        let names: Vec<_> = root.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["z", "b", "m"]);
    }

    #[test]
    fn test_entities_and_cdata_become_text() {
        let root = parse("<s>a &lt; b &amp;&amp; c &#65;<![CDATA[<raw>]]></s>").unwrap();
        assert_eq!(root.text(), "a < b && c A<raw>");
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_escaped_attribute_values() {
        let root = parse(r#"<t cond="x &lt; 3 &amp;&amp; y &gt; 1"/>"#).unwrap();
        assert_eq!(root.attr("cond"), Some("x < 3 && y > 1"));
    }

    #[test]
    fn test_prolog_and_comments_dropped() {
        let root = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- note -->\n<r><!-- inner --><?pi x?></r>",
        )
        .unwrap();
        assert_eq!(root.name, "r");
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse("<a><b>").unwrap_err();
        assert!(matches!(
            err,
            TokenizerError::UnexpectedEof { .. } | TokenizerError::Xml(_)
        ));
    }

    #[test]
    fn test_mismatched_end_tag() {
        assert!(matches!(parse("<a><b></a>"), Err(TokenizerError::Xml(_))));
    }

    #[test]
    fn test_content_after_root_rejected() {
        let err = parse("<a/><b/>").unwrap_err();
        assert!(matches!(err, TokenizerError::TrailingContent { ref found } if found == "<b>"));

        let err = parse("<a></a>garbage").unwrap_err();
        assert!(matches!(err, TokenizerError::TrailingContent { .. }));
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_whitespace_and_comments_after_root_allowed() {
        let root = parse("<a><b/></a>\n  <!-- trailer -->\n").unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.elements().count(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse("   "), Err(TokenizerError::NoRootElement)));
    }
}
