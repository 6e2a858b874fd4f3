//! Minimal RDF/XML reader
//!
//! Authority records are only inspected for their `rdf:type` statements
//! and the subject of the first description, so this collects exactly that
//! instead of building a graph.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::reader::NsReader;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfType {
    pub resource: String,
    /// Stated directly on a `rdf:Description` child of the root
    pub top_level: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RdfDocument {
    /// `rdf:about` of the root's first child
    pub subject: Option<String>,
    /// `rdf:type` resources in document order
    pub types: Vec<RdfType>,
}

impl RdfDocument {
    pub fn parse(xml: &str) -> Result<Self, quick_xml::Error> {
        let mut reader = NsReader::from_str(xml);
        let mut buf = Vec::new();
        // one entry per open element: whether it is a rdf:Description
        let mut open: Vec<bool> = Vec::new();
        let mut seen_first_child = false;
        let mut document = RdfDocument::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    document.inspect(&reader, &e, &open, &mut seen_first_child)?;
                    open.push(is_rdf(&reader, e.name(), b"Description"));
                }
                Event::Empty(e) => {
                    document.inspect(&reader, &e, &open, &mut seen_first_child)?;
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Eof => break,
                _ => (),
            }
            buf.clear();
        }

        Ok(document)
    }

    fn inspect(
        &mut self,
        reader: &NsReader<&[u8]>,
        element: &BytesStart,
        open: &[bool],
        seen_first_child: &mut bool,
    ) -> Result<(), quick_xml::Error> {
        if open.len() == 1 && !*seen_first_child {
            *seen_first_child = true;
            self.subject = rdf_attribute(reader, element, b"about")?;
        }
        if is_rdf(reader, element.name(), b"type")
            && let Some(resource) = rdf_attribute(reader, element, b"resource")?
        {
            self.types.push(RdfType {
                resource,
                top_level: open.len() == 2 && open[1],
            });
        }
        Ok(())
    }

    /// First `rdf:type` resource in the document.
    pub fn first_type(&self) -> Option<&str> {
        self.types.first().map(|t| t.resource.as_str())
    }

    pub fn has_type(&self, resource: &str) -> bool {
        self.types.iter().any(|t| t.resource == resource)
    }

    pub fn has_top_level_type(&self, resource: &str) -> bool {
        self.types
            .iter()
            .any(|t| t.top_level && t.resource == resource)
    }
}

fn is_rdf_namespace(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(ns)) if *ns == RDF_NS.as_bytes())
}

fn is_rdf(reader: &NsReader<&[u8]>, name: QName, local: &[u8]) -> bool {
    let (ns, local_name) = reader.resolve_element(name);
    is_rdf_namespace(&ns) && local_name.as_ref() == local
}

fn rdf_attribute(
    reader: &NsReader<&[u8]>,
    element: &BytesStart,
    local: &[u8],
) -> Result<Option<String>, quick_xml::Error> {
    for attribute in element.attributes() {
        let attribute = attribute?;
        let (ns, name) = reader.resolve_attribute(attribute.key);
        if is_rdf_namespace(&ns) && name.as_ref() == local {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
