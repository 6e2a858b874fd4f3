//! The CMI document of one run
//!
//! `CmiDocument` owns everything that ends up in the output file: the file
//! description, the edition registry and the correspondence entries. It
//! also remembers which authority references were already written, so the
//! resolver can reuse them instead of asking the registry again.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::authority::{EntityKind, KnownAuthorities};
use crate::correspondent::{Correspondent, Place};
use crate::edition::{EditionRegistry, EditionType};
use crate::entry::{CorrespDate, CorrespondenceAction, CorrespondenceEntry, LetterKey};
use crate::error::CmiError;
use crate::header::FileDescription;
use crate::ids::IdGenerator;

pub const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct CmiDocument {
    file_description: FileDescription,
    editions: EditionRegistry,
    entries: Vec<CorrespondenceEntry>,
    references: HashMap<String, EntityKind>,
    ids: IdGenerator,
}

impl CmiDocument {
    pub fn new(file_description: FileDescription) -> Self {
        Self::with_parts(file_description, EditionRegistry::new(), IdGenerator::random())
    }

    pub fn with_parts(
        file_description: FileDescription,
        editions: EditionRegistry,
        ids: IdGenerator,
    ) -> Self {
        Self {
            file_description,
            editions,
            entries: Vec::new(),
            references: HashMap::new(),
            ids,
        }
    }

    pub fn file_description(&self) -> &FileDescription {
        &self.file_description
    }

    pub fn editions(&self) -> &EditionRegistry {
        &self.editions
    }

    pub fn editions_mut(&mut self) -> &mut EditionRegistry {
        &mut self.editions
    }

    pub fn entries(&self) -> &[CorrespondenceEntry] {
        &self.entries
    }

    /// Register an edition unconditionally and return its ID.
    pub fn add_edition(&mut self, title: &str, kind: EditionType) -> String {
        self.editions.add(title, kind)
    }

    /// Attach an entry, assigning its IDs. Entries without actions are
    /// dropped; returns whether the entry was attached.
    pub fn add_entry(&mut self, mut entry: CorrespondenceEntry) -> bool {
        if !entry.has_actions() {
            return false;
        }

        for action in &mut entry.actions {
            action.id = self.ids.prefixed_id(action.side.column());
            for correspondent in &action.correspondents {
                if let Some(reference) = &correspondent.reference {
                    self.references
                        .entry(reference.clone())
                        .or_insert(correspondent.kind);
                }
            }
        }
        entry.id = self.ids.prefixed_id("letter");
        if let Some(note) = entry.note.as_mut() {
            note.id = self.ids.prefixed_id("note");
        }

        self.entries.push(entry);
        true
    }

    /// Serialize the document.
    pub fn finalize(&self) -> Result<String, quick_xml::Error> {
        let mut xml = TeiWriter::new();
        xml.declaration()?;
        xml.comment(&format!(" Generated with csv2cmi {} ", VERSION))?;
        xml.start("TEI", &[("xmlns", TEI_NS)])?;

        xml.start("teiHeader", &[])?;
        xml.start("fileDesc", &[])?;
        self.write_title_stmt(&mut xml)?;
        self.write_publication_stmt(&mut xml)?;
        self.write_source_desc(&mut xml)?;
        xml.end("fileDesc")?;
        xml.start("profileDesc", &[])?;
        for entry in &self.entries {
            write_entry(&mut xml, entry)?;
        }
        xml.end("profileDesc")?;
        xml.end("teiHeader")?;

        xml.start("text", &[])?;
        xml.start("body", &[])?;
        xml.empty("p", &[])?;
        xml.end("body")?;
        xml.end("text")?;

        xml.end("TEI")?;
        Ok(xml.into_string())
    }

    /// Serialize and write to `path`.
    pub fn save(&self, path: &Path) -> Result<(), CmiError> {
        let xml = self.finalize()?;
        std::fs::write(path, xml).map_err(|source| CmiError::OutputNotWritable {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_title_stmt(&self, xml: &mut TeiWriter) -> Result<(), quick_xml::Error> {
        let description = &self.file_description;
        xml.start("titleStmt", &[])?;
        xml.text_element(
            "title",
            &[("xml:id", description.title_id.as_str())],
            &description.title,
        )?;
        for editor in &description.editors {
            match &editor.email {
                Some(email) => {
                    xml.start("editor", &[])?;
                    if let Some(name) = &editor.name {
                        xml.text(name)?;
                    }
                    xml.text_element("email", &[], email)?;
                    xml.end("editor")?;
                }
                None => xml.text_element("editor", &[], editor.name.as_deref().unwrap_or(""))?,
            }
        }
        xml.end("titleStmt")
    }

    fn write_publication_stmt(&self, xml: &mut TeiWriter) -> Result<(), quick_xml::Error> {
        let description = &self.file_description;
        xml.start("publicationStmt", &[])?;
        for publisher in &description.publishers {
            xml.text_element("publisher", &[], publisher)?;
        }
        xml.text_element("idno", &[("type", "url")], &description.file_url)?;
        xml.empty("date", &[("when", description.date.as_str())])?;
        xml.start("availability", &[])?;
        xml.text_element(
            "licence",
            &[("target", description.license.url())],
            description.license.text(),
        )?;
        xml.end("availability")?;
        xml.end("publicationStmt")
    }

    fn write_source_desc(&self, xml: &mut TeiWriter) -> Result<(), quick_xml::Error> {
        xml.start("sourceDesc", &[])?;
        for edition in self.editions.editions() {
            xml.text_element(
                "bibl",
                &[("type", edition.kind.as_str()), ("xml:id", edition.id.as_str())],
                &edition.title,
            )?;
        }
        xml.end("sourceDesc")
    }
}

impl KnownAuthorities for CmiDocument {
    fn kind_of(&self, uri: &str) -> Option<EntityKind> {
        self.references.get(uri).copied()
    }
}

fn write_entry(xml: &mut TeiWriter, entry: &CorrespondenceEntry) -> Result<(), quick_xml::Error> {
    let line = entry.line.map(|line| line.to_string());
    let sources = entry.source_pointers();

    let mut attributes: Vec<(&str, &str)> = Vec::new();
    if let Some(line) = &line {
        attributes.push(("n", line.as_str()));
    }
    if let Some(sources) = &sources {
        attributes.push(("source", sources.as_str()));
    }
    match &entry.key {
        Some(LetterKey::Key(key)) => attributes.push(("key", key.as_str())),
        Some(LetterKey::Ref(uri)) => attributes.push(("ref", uri.as_str())),
        None => {}
    }
    attributes.push(("xml:id", entry.id.as_str()));

    xml.start("correspDesc", &attributes)?;
    for action in &entry.actions {
        write_action(xml, action)?;
    }
    if let Some(note) = &entry.note {
        xml.text_element("note", &[("xml:id", note.id.as_str())], &note.text)?;
    }
    xml.end("correspDesc")
}

fn write_action(xml: &mut TeiWriter, action: &CorrespondenceAction) -> Result<(), quick_xml::Error> {
    xml.start(
        "correspAction",
        &[("xml:id", action.id.as_str()), ("type", action.side.action_type())],
    )?;
    for correspondent in &action.correspondents {
        write_correspondent(xml, correspondent)?;
    }
    if let Some(place) = &action.place {
        write_place(xml, place)?;
    }
    if let Some(date) = &action.date {
        write_date(xml, date)?;
    }
    xml.end("correspAction")
}

fn write_correspondent(
    xml: &mut TeiWriter,
    correspondent: &Correspondent,
) -> Result<(), quick_xml::Error> {
    let mut attributes: Vec<(&str, &str)> = Vec::new();
    if let Some(reference) = &correspondent.reference {
        attributes.push(("ref", reference.as_str()));
    }
    if correspondent.conjecture {
        attributes.push(("evidence", "conjecture"));
    }
    xml.text_element(
        correspondent.kind.element_name(),
        &attributes,
        &correspondent.name,
    )
}

fn write_place(xml: &mut TeiWriter, place: &Place) -> Result<(), quick_xml::Error> {
    let mut attributes: Vec<(&str, &str)> = Vec::new();
    if place.conjecture {
        attributes.push(("evidence", "conjecture"));
    }
    if let Some(reference) = &place.reference {
        attributes.push(("ref", reference.as_str()));
    }
    xml.text_element("placeName", &attributes, &place.name)
}

fn write_date(xml: &mut TeiWriter, date: &CorrespDate) -> Result<(), quick_xml::Error> {
    let attributes = date
        .normalized
        .as_ref()
        .map(|normalized| normalized.attributes())
        .unwrap_or_default();
    xml.text_element("date", &attributes, date.text.as_deref().unwrap_or(""))
}

/// Thin layer over the quick-xml writer; empty text yields an empty element.
struct TeiWriter {
    writer: Writer<Vec<u8>>,
}

impl TeiWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn declaration(&mut self) -> Result<(), quick_xml::Error> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn comment(&mut self, text: &str) -> Result<(), quick_xml::Error> {
        self.writer
            .write_event(Event::Comment(BytesText::new(text)))
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), quick_xml::Error> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(element))
    }

    fn end(&mut self, name: &str) -> Result<(), quick_xml::Error> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), quick_xml::Error> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(element))
    }

    fn text(&mut self, text: &str) -> Result<(), quick_xml::Error> {
        self.writer.write_event(Event::Text(BytesText::new(text)))
    }

    fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), quick_xml::Error> {
        if text.is_empty() {
            return self.empty(name, attributes);
        }
        self.start(name, attributes)?;
        self.text(text)?;
        self.end(name)
    }

    fn into_string(self) -> String {
        String::from_utf8_lossy(&self.writer.into_inner()).into_owned()
    }
}
