//! Letter table conversion
//!
//! Reads the letter table row by row and attaches one `<correspDesc>` per
//! row to the document. Problems within a row are logged with its line
//! number and only degrade the affected field.

use std::io::Read;

use serde::Deserialize;

use crate::authority::AuthorityResolver;
use crate::config::Config;
use crate::correspondent::{CellOrigin, build_correspondents, build_place, split_cell};
use crate::date::normalize_date;
use crate::document::CmiDocument;
use crate::entry::{CorrespDate, CorrespondenceAction, CorrespondenceEntry, LetterKey, Note, Side};
use crate::error::CmiError;

/// One row of the letter table. Empty cells and missing columns are `None`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LetterRecord {
    pub sender: Option<String>,
    #[serde(rename = "senderID")]
    pub sender_id: Option<String>,
    #[serde(rename = "senderPlace")]
    pub sender_place: Option<String>,
    #[serde(rename = "senderPlaceID")]
    pub sender_place_id: Option<String>,
    #[serde(rename = "senderDate")]
    pub sender_date: Option<String>,
    #[serde(rename = "senderDateText")]
    pub sender_date_text: Option<String>,
    pub addressee: Option<String>,
    #[serde(rename = "addresseeID")]
    pub addressee_id: Option<String>,
    #[serde(rename = "addresseePlace")]
    pub addressee_place: Option<String>,
    #[serde(rename = "addresseePlaceID")]
    pub addressee_place_id: Option<String>,
    #[serde(rename = "addresseeDate")]
    pub addressee_date: Option<String>,
    #[serde(rename = "addresseeDateText")]
    pub addressee_date_text: Option<String>,
    pub edition: Option<String>,
    pub key: Option<String>,
    pub note: Option<String>,
}

/// The cells describing one side of a letter.
#[derive(Debug, Clone, Copy)]
pub struct SideFields<'a> {
    pub names: Option<&'a str>,
    pub ids: Option<&'a str>,
    pub place: Option<&'a str>,
    pub place_id: Option<&'a str>,
    pub date: Option<&'a str>,
    pub date_text: Option<&'a str>,
}

impl<'a> SideFields<'a> {
    /// An action is only written for a side with a name, place or date.
    pub fn has_information(&self) -> bool {
        self.names.is_some() || self.place.is_some() || self.date.is_some()
    }
}

impl LetterRecord {
    pub fn side(&self, side: Side) -> SideFields<'_> {
        match side {
            Side::Sender => SideFields {
                names: self.sender.as_deref(),
                ids: self.sender_id.as_deref(),
                place: self.sender_place.as_deref(),
                place_id: self.sender_place_id.as_deref(),
                date: self.sender_date.as_deref(),
                date_text: self.sender_date_text.as_deref(),
            },
            Side::Addressee => SideFields {
                names: self.addressee.as_deref(),
                ids: self.addressee_id.as_deref(),
                place: self.addressee_place.as_deref(),
                place_id: self.addressee_place_id.as_deref(),
                date: self.addressee_date.as_deref(),
                date_text: self.addressee_date_text.as_deref(),
            },
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConvertOptions {
    /// Keep rows without an edition
    pub include_unedited: bool,
    /// Copy the `note` column
    pub transfer_notes: bool,
    /// Write the table line as `@n`
    pub line_numbers: bool,
    /// Separator of multiple values within one cell
    pub delimiter: Option<char>,
}

pub struct Converter<'a> {
    config: &'a Config,
    options: ConvertOptions,
    resolver: &'a AuthorityResolver,
}

impl<'a> Converter<'a> {
    pub fn new(config: &'a Config, options: ConvertOptions, resolver: &'a AuthorityResolver) -> Self {
        Self {
            config,
            options,
            resolver,
        }
    }

    /// Convert a whole letter table into entries of `document`, then apply
    /// the configured full edition titles.
    pub async fn convert<R: Read>(
        &self,
        document: &mut CmiDocument,
        input: R,
    ) -> Result<(), CmiError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        tracing::debug!("Recognized columns: {:?}", headers);
        let has_column = |name: &str| headers.iter().any(|h| h == name);
        if !(has_column("sender") && has_column("addressee")) {
            return Err(CmiError::MissingColumn("sender/addressee"));
        }
        let has_edition_column = has_column("edition");
        let edition_type = self.config.edition_type();

        let default_sources = if has_edition_column {
            Vec::new()
        } else {
            let title = self.config.edition.title.clone().unwrap_or_else(|| {
                tracing::warn!("No edition stated. Please set manually.");
                String::new()
            });
            vec![document.add_edition(&title, edition_type)]
        };

        for result in reader.records() {
            let record = result?;
            let line = end_line(&record);
            let letter: LetterRecord = record.deserialize(Some(&headers))?;

            let sources = if has_edition_column {
                let editions = letter.edition.as_deref().unwrap_or_default();
                if editions.trim().is_empty() && !self.options.include_unedited {
                    tracing::debug!("Skipping unedited letter in line {}", line);
                    continue;
                }
                split_cell(editions, self.options.delimiter)
                    .into_iter()
                    .map(str::trim)
                    .filter(|title| !title.is_empty())
                    .map(|title| document.editions_mut().get_or_create(title, edition_type))
                    .collect()
            } else {
                default_sources.clone()
            };

            let entry = self.build_entry(document, &letter, line, sources).await;
            if !document.add_entry(entry) {
                tracing::info!("No correspondence information in line {}", line);
            }
        }

        document
            .editions_mut()
            .replace_short_titles(&self.config.editions);
        Ok(())
    }

    /// Build the entry for one row.
    pub async fn build_entry(
        &self,
        document: &CmiDocument,
        letter: &LetterRecord,
        line: u64,
        sources: Vec<String>,
    ) -> CorrespondenceEntry {
        // keys belong to a titled edition
        let edited = sources.iter().any(|id| {
            document
                .editions()
                .title_of(id)
                .is_some_and(|title| !title.is_empty())
        });
        let key = letter
            .key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .and_then(|key| {
                if !edited {
                    tracing::error!("Key without edition in line {}", line);
                    None
                } else {
                    Some(LetterKey::parse(key))
                }
            });

        let mut actions = Vec::with_capacity(2);
        for side in Side::ALL {
            match self.build_action(document, letter.side(side), side, line).await {
                Some(action) => actions.push(action),
                None => tracing::info!("No information on {} in line {}", side.column(), line),
            }
        }

        let note = if self.options.transfer_notes {
            letter.note.as_ref().map(|text| Note {
                id: String::new(),
                text: text.clone(),
            })
        } else {
            None
        };

        CorrespondenceEntry {
            id: String::new(),
            line: self.options.line_numbers.then_some(line),
            sources,
            key,
            actions,
            note,
        }
    }

    async fn build_action(
        &self,
        document: &CmiDocument,
        fields: SideFields<'_>,
        side: Side,
        line: u64,
    ) -> Option<CorrespondenceAction> {
        if !fields.has_information() {
            return None;
        }
        let origin = CellOrigin {
            line,
            column: side.column(),
        };

        let mut action = CorrespondenceAction::new(side);
        if let Some(names) = fields.names {
            action.correspondents = build_correspondents(
                names,
                fields.ids,
                self.options.delimiter,
                self.resolver,
                document,
                origin,
            )
            .await;
        }
        action.place = build_place(fields.place.unwrap_or_default(), fields.place_id, origin);
        action.date = build_date(fields.date, fields.date_text, origin);
        Some(action)
    }
}

/// Line on which a record ends, so that quoted cells spanning several
/// lines report their last line.
fn end_line(record: &csv::StringRecord) -> u64 {
    let start = record.position().map(|p| p.line()).unwrap_or_default();
    let breaks: usize = record.iter().map(|field| field.matches('\n').count()).sum();
    start + breaks as u64
}

/// Date element of an action: parsed attributes from the date column and
/// free text from the date text column.
fn build_date(raw: Option<&str>, text: Option<&str>, origin: CellOrigin<'_>) -> Option<CorrespDate> {
    let mut date = CorrespDate::default();

    if let Some(raw) = raw {
        match normalize_date(raw) {
            Ok(Some(normalized)) => {
                if normalized.uncertain {
                    tracing::info!("Added @cert to <date> from line {}", origin.line);
                }
                date.normalized = Some(normalized);
            }
            Ok(None) => date.text = non_empty(raw),
            Err(e) => tracing::warn!(
                "Could not parse {}Date in line {}: {}",
                origin.column,
                origin.line,
                e
            ),
        }
    }
    if let Some(text) = text.and_then(non_empty) {
        date.text = Some(text);
    }

    (!date.is_empty()).then_some(date)
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
