//! Namespace-aware XML reading for package parts
//!
//! Parts are parsed into a small owned element tree. Elements and attributes
//! are matched by namespace URI plus local name; prefixes are never compared
//! because producers are free to choose them.

use crate::package::{Package, PartError};
use crate::problem::Problem;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use thiserror::Error;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A part that is not well-formed XML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (at byte {position})")]
pub struct XmlParseError {
    pub message: String,
    pub position: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    namespace: Option<String>,
    name: String,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// True when the element has local name `name` in any of `namespaces`
    pub fn is(&self, namespaces: &[&str], name: &str) -> bool {
        self.name == name
            && self
                .namespace
                .as_deref()
                .is_some_and(|ns| namespaces.contains(&ns))
    }

    /// Value of an unqualified attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespace-qualified attribute
    pub fn attribute_ns(&self, namespaces: &[&str], name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| {
                a.name == name
                    && a.namespace
                        .as_deref()
                        .is_some_and(|ns| namespaces.contains(&ns))
            })
            .map(|a| a.value.as_str())
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn children_named<'a>(
        &'a self,
        namespaces: &'a [&'a str],
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.is(namespaces, name))
    }

    pub fn child(&self, namespaces: &[&str], name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(namespaces, name))
    }

    /// Character data directly inside this element (CDATA included)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// This element and all of its descendants, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

/// Parse raw part bytes into an element tree.
pub fn parse_xml(bytes: &[u8]) -> Result<XmlDocument, XmlParseError> {
    let mut reader = NsReader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    let fail = |message: String, position: u64| XmlParseError { message, position };

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| fail(e.to_string(), position(&reader)))?;

        match event {
            Event::Start(e) => {
                let element = start_element(&reader, &e)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = start_element(&reader, &e)?;
                close_element(element, &mut stack, &mut root, position(&reader))?;
            }
            Event::End(e) => {
                let element = stack.pop().ok_or_else(|| {
                    fail(
                        format!(
                            "unexpected closing tag '{}'",
                            String::from_utf8_lossy(e.name().as_ref())
                        ),
                        position(&reader),
                    )
                })?;
                close_element(element, &mut stack, &mut root, position(&reader))?;
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| fail(e.to_string(), position(&reader)))?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if !text.trim().is_empty() => {
                        return Err(fail(
                            "text outside of the root element".to_string(),
                            position(&reader),
                        ));
                    }
                    None => {}
                }
            }
            Event::CData(c) => match stack.last_mut() {
                Some(current) => current.text.push_str(&String::from_utf8_lossy(&c)),
                None => {
                    return Err(fail(
                        "CDATA outside of the root element".to_string(),
                        position(&reader),
                    ));
                }
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(fail(
            format!("unclosed element '{}'", open.name),
            position(&reader),
        ));
    }

    root.map(|root| XmlDocument { root })
        .ok_or_else(|| fail("no element found".to_string(), position(&reader)))
}

fn start_element<R>(reader: &NsReader<R>, e: &BytesStart) -> Result<XmlElement, XmlParseError> {
    let position = position(reader);
    let (ns, local) = reader.resolve_element(e.name());
    let namespace = resolved_namespace(ns, e.name().as_ref(), position)?;

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlParseError {
            message: err.to_string(),
            position,
        })?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (ns, attr_local) = reader.resolve_attribute(attr.key);
        let attr_namespace = resolved_namespace(ns, attr.key.as_ref(), position)?;
        let value = attr.unescape_value().map_err(|err| XmlParseError {
            message: err.to_string(),
            position,
        })?;
        attributes.push(XmlAttribute {
            namespace: attr_namespace,
            name: String::from_utf8_lossy(attr_local.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }

    Ok(XmlElement {
        namespace,
        name: String::from_utf8_lossy(local.as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn position<R>(reader: &NsReader<R>) -> u64 {
    reader.buffer_position()
}

fn resolved_namespace(
    ns: ResolveResult,
    qname: &[u8],
    position: u64,
) -> Result<Option<String>, XmlParseError> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Ok(Some(XML_NAMESPACE.to_string())),
        ResolveResult::Unknown(prefix) => Err(XmlParseError {
            message: format!(
                "unbound namespace prefix '{}' in '{}'",
                String::from_utf8_lossy(&prefix),
                String::from_utf8_lossy(qname)
            ),
            position,
        }),
    }
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    position: u64,
) -> Result<(), XmlParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlParseError {
            message: format!("junk after document element: '{}'", element.name),
            position,
        });
    }
    *root = Some(element);
    Ok(())
}

/// Read and parse a part of the package.
///
/// `Ok(None)` means the part does not exist; read and parse failures come
/// back as the matching [`Problem`] so callers can record it and move on.
pub fn load_xml(package: &Package, part: &str) -> Result<Option<XmlDocument>, Problem> {
    let bytes = match package.read_part(part) {
        Ok(bytes) => bytes,
        Err(PartError::Missing) => return Ok(None),
        Err(PartError::Unreadable(message)) => {
            return Err(Problem::UnreadablePart {
                part: part.to_string(),
                message,
            });
        }
    };

    parse_xml(bytes).map(Some).map_err(|e| Problem::MalformedXml {
        part: part.to_string(),
        message: e.to_string(),
    })
}
