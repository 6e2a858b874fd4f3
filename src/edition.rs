//! Edition registry
//!
//! Keeps one `<bibl>` per distinct edition title and hands out its ID.
//! Titles are compared exactly after trimming surrounding whitespace.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::EditionSection;
use crate::ids::IdGenerator;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EditionType {
    #[default]
    Print,
    Hybrid,
    Online,
}

impl EditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditionType::Print => "print",
            EditionType::Hybrid => "hybrid",
            EditionType::Online => "online",
        }
    }
}

impl fmt::Display for EditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown edition type {0:?}, expected print, hybrid or online")]
pub struct UnknownEditionType(pub String);

impl FromStr for EditionType {
    type Err = UnknownEditionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "print" => Ok(EditionType::Print),
            "hybrid" => Ok(EditionType::Hybrid),
            "online" => Ok(EditionType::Online),
            other => Err(UnknownEditionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edition {
    pub id: String,
    pub title: String,
    pub kind: EditionType,
}

pub struct EditionRegistry {
    editions: Vec<Edition>,
    /// Shared generator, only used when IDs are not seeded by title
    ids: Option<IdGenerator>,
}

impl EditionRegistry {
    /// Registry whose IDs are derived from the edition titles, so the same
    /// table always yields the same edition IDs.
    pub fn new() -> Self {
        Self {
            editions: Vec::new(),
            ids: None,
        }
    }

    /// Registry drawing all IDs from one generator.
    pub fn with_generator(ids: IdGenerator) -> Self {
        Self {
            editions: Vec::new(),
            ids: Some(ids),
        }
    }

    pub fn editions(&self) -> &[Edition] {
        &self.editions
    }

    pub fn get_id_by_title(&self, title: &str) -> Option<&str> {
        let title = title.trim();
        self.editions
            .iter()
            .find(|edition| edition.title == title)
            .map(|edition| edition.id.as_str())
    }

    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.editions
            .iter()
            .find(|edition| edition.id == id)
            .map(|edition| edition.title.as_str())
    }

    /// Register a new edition, even if the title is already known.
    pub fn add(&mut self, title: &str, kind: EditionType) -> String {
        let title = title.trim();
        let id = match self.ids.as_mut() {
            Some(ids) => ids.uuid(),
            None => IdGenerator::seeded(title).uuid(),
        };
        self.editions.push(Edition {
            id: id.clone(),
            title: title.to_string(),
            kind,
        });
        id
    }

    pub fn get_or_create(&mut self, title: &str, kind: EditionType) -> String {
        if let Some(id) = self.get_id_by_title(title) {
            return id.to_string();
        }
        tracing::info!("Created edition \"{}\"", title.trim());
        self.add(title, kind)
    }

    /// Swap short titles used in the table for the full titles configured
    /// in sections named after them.
    pub fn replace_short_titles(&mut self, sections: &BTreeMap<String, EditionSection>) {
        for edition in &mut self.editions {
            let Some(section) = sections.get(&edition.title) else {
                continue;
            };
            let (Some(title), Some(kind)) = (&section.title, &section.kind) else {
                tracing::warn!(
                    "Incomplete section {} in configuration. Title and type must be set.",
                    edition.title
                );
                continue;
            };
            match kind.parse::<EditionType>() {
                Ok(kind) => {
                    tracing::debug!("Replacing short title {} by {}", edition.title, title);
                    edition.title = title.clone();
                    edition.kind = kind;
                }
                Err(e) => tracing::warn!("Section {}: {}", edition.title, e),
            }
        }
    }
}

impl Default for EditionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
