//! GND (Gemeinsame Normdatei) of the Deutsche Nationalbibliothek

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::rdf::RdfDocument;
use super::{AuthorityError, AuthorityRegistry, Classification, EntityKind, fetch_record};

const CORPORATE_LIKE: [&str; 3] = ["Corporate", "Company", "ReligiousAdministrativeUnit"];
const PERSON_LIKE: [&str; 4] = ["DifferentiatedPerson", "Royal", "Family", "Legendary"];
const UNDIFFERENTIATED: &str = "UndifferentiatedPerson";

pub struct Gnd;

#[async_trait]
impl AuthorityRegistry for Gnd {
    fn name(&self) -> &'static str {
        "GND"
    }

    fn handles(&self, uri: &str) -> bool {
        uri.contains("gnd")
    }

    async fn lookup(&self, client: &Client, uri: &str) -> Result<Classification, AuthorityError> {
        let url = format!("{}/about/rdf", uri.trim_end_matches('/'));
        let record = fetch_record(client, self.name(), &url).await?;
        report_redirect(uri, &record);
        classify(uri, &record)
    }
}

/// Merged records answer with the surviving ID.
fn report_redirect(uri: &str, record: &RdfDocument) {
    let Some(current) = record.subject.as_deref() else {
        return;
    };
    if let (Ok(requested), Ok(answered)) = (Url::parse(uri), Url::parse(current))
        && requested.path() != answered.path()
    {
        tracing::info!("{} returns new ID {}", uri, current);
    }
}

/// Only the first `rdf:type` counts; GND lists the most specific one first.
fn classify(uri: &str, record: &RdfDocument) -> Result<Classification, AuthorityError> {
    let rdf_type = record
        .first_type()
        .ok_or_else(|| AuthorityError::Unprocessable(uri.to_string()))?;

    if CORPORATE_LIKE.iter().any(|marker| rdf_type.contains(marker)) {
        Ok(Classification::Entity(EntityKind::Organization))
    } else if PERSON_LIKE.iter().any(|marker| rdf_type.contains(marker)) {
        Ok(Classification::Entity(EntityKind::Person))
    } else if rdf_type.contains(UNDIFFERENTIATED) {
        Ok(Classification::UndifferentiatedPerson)
    } else {
        Err(AuthorityError::Unprocessable(uri.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::rdf::RdfType;

    const GNDO: &str = "https://d-nb.info/standards/elementset/gnd#";

    fn record(types: &[&str]) -> RdfDocument {
        RdfDocument {
            subject: Some("https://d-nb.info/gnd/118540238".to_string()),
            types: types
                .iter()
                .map(|t| RdfType {
                    resource: format!("{}{}", GNDO, t),
                    top_level: true,
                })
                .collect(),
        }
    }

    fn classified(types: &[&str]) -> Option<Classification> {
        classify("https://d-nb.info/gnd/118540238", &record(types)).ok()
    }

    #[test]
    fn test_corporate_bodies() {
        for t in [
            "CorporateBody",
            "Company",
            "ReligiousAdministrativeUnit",
        ] {
            assert_eq!(
                classified(&[t]),
                Some(Classification::Entity(EntityKind::Organization)),
                "{t}"
            );
        }
    }

    #[test]
    fn test_person_like() {
        for t in [
            "DifferentiatedPerson",
            "RoyalOrMemberOfARoyalHouse",
            "Family",
            "LegendaryFigure",
        ] {
            assert_eq!(
                classified(&[t]),
                Some(Classification::Entity(EntityKind::Person)),
                "{t}"
            );
        }
    }

    #[test]
    fn test_undifferentiated_person() {
        assert_eq!(
            classified(&["UndifferentiatedPerson"]),
            Some(Classification::UndifferentiatedPerson)
        );
    }

    #[test]
    fn test_only_first_type_counts() {
        assert_eq!(
            classified(&["PlaceOrGeographicName", "CorporateBody"]),
            None
        );
        assert!(matches!(
            classify("https://d-nb.info/gnd/1", &RdfDocument::default()),
            Err(AuthorityError::Unprocessable(_))
        ));
    }
}
