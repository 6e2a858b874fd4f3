//! VIAF (Virtual International Authority File)

use async_trait::async_trait;
use reqwest::Client;

use super::rdf::RdfDocument;
use super::{AuthorityError, AuthorityRegistry, Classification, EntityKind, fetch_record};

const ORGANIZATION: &str = "http://schema.org/Organization";
const PERSON: &str = "http://schema.org/Person";

pub struct Viaf;

#[async_trait]
impl AuthorityRegistry for Viaf {
    fn name(&self) -> &'static str {
        "VIAF"
    }

    fn handles(&self, uri: &str) -> bool {
        uri.contains("viaf")
    }

    async fn lookup(&self, client: &Client, uri: &str) -> Result<Classification, AuthorityError> {
        let url = format!("{}/rdf.xml", uri.trim_end_matches('/'));
        let record = fetch_record(client, self.name(), &url).await?;
        classify(uri, &record)
    }
}

/// VIAF clusters state their schema.org type on the top-level description.
fn classify(uri: &str, record: &RdfDocument) -> Result<Classification, AuthorityError> {
    if record.has_top_level_type(ORGANIZATION) {
        Ok(Classification::Entity(EntityKind::Organization))
    } else if record.has_top_level_type(PERSON) {
        Ok(Classification::Entity(EntityKind::Person))
    } else {
        Err(AuthorityError::Unprocessable(uri.to_string()))
    }
}
