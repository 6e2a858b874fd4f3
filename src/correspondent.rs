//! Correspondents and places of a letter
//!
//! Name cells may list several correspondents separated by the extra
//! delimiter; the matching ID cell is split the same way and paired by
//! position.

use crate::authority::{AuthorityError, AuthorityResolver, EntityKind, KnownAuthorities};

/// Where a cell came from, for log messages.
#[derive(Debug, Clone, Copy)]
pub struct CellOrigin<'a> {
    pub line: u64,
    pub column: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correspondent {
    pub name: String,
    pub kind: EntityKind,
    pub reference: Option<String>,
    /// Name was given in square brackets
    pub conjecture: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub name: String,
    pub reference: Option<String>,
    pub conjecture: bool,
}

pub fn split_cell(cell: &str, delimiter: Option<char>) -> Vec<&str> {
    match delimiter {
        Some(delimiter) => cell.split(delimiter).collect(),
        None => vec![cell],
    }
}

/// Remove one pair of enclosing square brackets. Returns the inner text and
/// whether brackets were found.
pub fn strip_conjecture(text: &str) -> (&str, bool) {
    match text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => (inner, true),
        None => (text, false),
    }
}

pub async fn build_correspondents(
    names: &str,
    ids: Option<&str>,
    delimiter: Option<char>,
    resolver: &AuthorityResolver,
    known: &dyn KnownAuthorities,
    origin: CellOrigin<'_>,
) -> Vec<Correspondent> {
    let names = split_cell(names, delimiter);
    let ids = ids.map(|ids| split_cell(ids, delimiter)).unwrap_or_default();

    if !ids.is_empty() && ids.len() != names.len() {
        tracing::warn!(
            "{} and {}ID in line {} list {} names but {} IDs",
            origin.column,
            origin.column,
            origin.line,
            names.len(),
            ids.len()
        );
    }

    let mut correspondents = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        let id = ids.get(index).map(|id| id.trim()).filter(|id| !id.is_empty());
        let (kind, reference) = match id {
            Some(id) => resolve(id, resolver, known, origin).await,
            None => {
                tracing::debug!("ID for \"{}\" missing in line {}", name, origin.line);
                (EntityKind::default(), None)
            }
        };

        let (text, conjecture) = strip_conjecture(name);
        if conjecture {
            tracing::info!(
                "Added @evidence to <{}> from line {}",
                kind.element_name(),
                origin.line
            );
        }

        correspondents.push(Correspondent {
            name: text.to_string(),
            kind,
            reference,
            conjecture,
        });
    }
    correspondents
}

async fn resolve(
    id: &str,
    resolver: &AuthorityResolver,
    known: &dyn KnownAuthorities,
    origin: CellOrigin<'_>,
) -> (EntityKind, Option<String>) {
    match resolver.resolve(id, known).await {
        Ok(resolution) => {
            if let Some(warning) = &resolution.warning {
                tracing::warn!("{}ID in line {}: {}", origin.column, origin.line, warning);
            }
            (resolution.kind, resolution.reference)
        }
        Err(e @ AuthorityError::Unprocessable(_)) => {
            tracing::warn!("{}ID in line {}: {}", origin.column, origin.line, e);
            (EntityKind::default(), None)
        }
        Err(e) => {
            tracing::error!("{}ID in line {}: {}", origin.column, origin.line, e);
            (EntityKind::default(), None)
        }
    }
}

/// Build a place from its name and GeoNames URI. Returns `None` when there
/// is nothing to write.
pub fn build_place(name: &str, geonames: Option<&str>, origin: CellOrigin<'_>) -> Option<Place> {
    let (text, conjecture) = strip_conjecture(name.trim());
    if conjecture {
        tracing::info!("Added @evidence to <placeName> from line {}", origin.line);
    }

    let reference = geonames
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .and_then(|uri| {
            if uri.contains("www.geonames.org") {
                Some(uri.to_string())
            } else {
                tracing::warn!(
                    "\"{}\" in line {} is a non-standard GeoNames ID",
                    uri,
                    origin.line
                );
                None
            }
        });

    if text.is_empty() && reference.is_none() && !conjecture {
        return None;
    }
    Some(Place {
        name: text.to_string(),
        reference,
        conjecture,
    })
}
