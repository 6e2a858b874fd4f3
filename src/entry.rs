//! Correspondence entries (`<correspDesc>`) and their actions.
//!
//! IDs are left empty by the builders and assigned by the document when an
//! entry is attached.

use crate::correspondent::{Correspondent, Place};
use crate::date::NormalizedDate;

/// The two sides of a letter, named after their table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Sender,
    Addressee,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Sender, Side::Addressee];

    /// Column prefix in the letter table, also used as ID prefix.
    pub fn column(&self) -> &'static str {
        match self {
            Side::Sender => "sender",
            Side::Addressee => "addressee",
        }
    }

    /// Value of `correspAction/@type`.
    pub fn action_type(&self) -> &'static str {
        match self {
            Side::Sender => "sent",
            Side::Addressee => "received",
        }
    }
}

/// Content of a `<date>` element: parsed attributes, free text, or both.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CorrespDate {
    pub normalized: Option<NormalizedDate>,
    pub text: Option<String>,
}

impl CorrespDate {
    pub fn is_empty(&self) -> bool {
        self.normalized.is_none() && self.text.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrespondenceAction {
    pub id: String,
    pub side: Side,
    pub correspondents: Vec<Correspondent>,
    pub place: Option<Place>,
    pub date: Option<CorrespDate>,
}

impl CorrespondenceAction {
    pub fn new(side: Side) -> Self {
        Self {
            id: String::new(),
            side,
            correspondents: Vec::new(),
            place: None,
            date: None,
        }
    }
}

/// Identifier of the letter within its edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LetterKey {
    /// Written as `@key`
    Key(String),
    /// URL of the letter, written as `@ref`
    Ref(String),
}

impl LetterKey {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http") {
            LetterKey::Ref(raw.to_string())
        } else {
            LetterKey::Key(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CorrespondenceEntry {
    pub id: String,
    /// Line in the letter table
    pub line: Option<u64>,
    /// IDs of the editions the letter is documented in
    pub sources: Vec<String>,
    pub key: Option<LetterKey>,
    pub actions: Vec<CorrespondenceAction>,
    pub note: Option<Note>,
}

impl CorrespondenceEntry {
    /// Entries without any action carry no correspondence information.
    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Value of `@source`: edition IDs as space separated pointers.
    pub fn source_pointers(&self) -> Option<String> {
        if self.sources.is_empty() {
            return None;
        }
        Some(
            self.sources
                .iter()
                .map(|id| format!("#{}", id))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_key() {
        assert_eq!(
            LetterKey::parse(" https://example.org/letter/1 "),
            LetterKey::Ref("https://example.org/letter/1".to_string())
        );
        assert_eq!(LetterKey::parse("42"), LetterKey::Key("42".to_string()));
    }

    #[test]
    fn test_source_pointers() {
        let mut entry = CorrespondenceEntry::default();
        assert_eq!(entry.source_pointers(), None);

        entry.sources = vec!["a-1".to_string(), "b-2".to_string()];
        assert_eq!(entry.source_pointers().as_deref(), Some("#a-1 #b-2"));
    }

    #[test]
    fn test_sides() {
        assert_eq!(Side::Sender.action_type(), "sent");
        assert_eq!(Side::Addressee.action_type(), "received");
        assert_eq!(Side::Addressee.column(), "addressee");
    }
}
