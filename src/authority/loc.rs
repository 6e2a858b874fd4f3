//! Library of Congress linked data service (id.loc.gov)

use async_trait::async_trait;
use reqwest::Client;

use super::rdf::RdfDocument;
use super::{AuthorityError, AuthorityRegistry, Classification, EntityKind, fetch_record};

const ORGANIZATION: &str = "http://id.loc.gov/ontologies/bibframe/Organization";
const PERSON: &str = "http://id.loc.gov/ontologies/bibframe/Person";

pub struct Loc;

#[async_trait]
impl AuthorityRegistry for Loc {
    fn name(&self) -> &'static str {
        "LOC"
    }

    fn handles(&self, uri: &str) -> bool {
        uri.contains("loc")
    }

    async fn lookup(&self, client: &Client, uri: &str) -> Result<Classification, AuthorityError> {
        let url = format!("{}.rdf", uri.trim_end_matches('/'));
        let record = fetch_record(client, self.name(), &url).await?;
        classify(uri, &record)
    }
}

/// The bibframe type may sit anywhere in the record.
fn classify(uri: &str, record: &RdfDocument) -> Result<Classification, AuthorityError> {
    if record.has_type(ORGANIZATION) {
        Ok(Classification::Entity(EntityKind::Organization))
    } else if record.has_type(PERSON) {
        Ok(Classification::Entity(EntityKind::Person))
    } else {
        Err(AuthorityError::Unprocessable(uri.to_string()))
    }
}
