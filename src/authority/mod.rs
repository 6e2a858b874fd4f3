//! Authority file resolution
//!
//! Correspondents may carry an identifier from an authority file. The
//! identifier is turned into a canonical URI, looked up once in the
//! registry it belongs to, and the record's `rdf:type` decides whether the
//! name is written as `<persName>` or `<orgName>`.
//!
//! Registries are strategies behind [`AuthorityRegistry`], tried in order:
//! VIAF, GND, Library of Congress.

pub mod gnd;
pub mod loc;
pub mod rdf;
pub mod viaf;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use self::rdf::RdfDocument;

/// Namespace for bare GND control numbers
pub const GND_NAMESPACE: &str = "https://d-nb.info/gnd/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("csv2cmi/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    #[default]
    Person,
    Organization,
}

impl EntityKind {
    /// TEI element naming an entity of this kind.
    pub fn element_name(&self) -> &'static str {
        match self {
            EntityKind::Person => "persName",
            EntityKind::Organization => "orgName",
        }
    }
}

/// What a registry record says about the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Entity(EntityKind),
    /// A name record not tied to one individual
    UndifferentiatedPerson,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityWarning {
    #[error("{0} links to undifferentiated Person")]
    UndifferentiatedPerson(String),
}

/// Outcome of a successful lookup. `reference` is what may be written as
/// `@ref`; it is empty when the record cannot identify a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub kind: EntityKind,
    pub reference: Option<String>,
    pub warning: Option<AuthorityWarning>,
}

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("Authority file not found: {url} ({status})")]
    NotFound { url: String, status: StatusCode },
    #[error("Failed to reach {registry} ({reason})")]
    Unreachable {
        registry: &'static str,
        reason: String,
    },
    #[error("Invalid authority URI {0}")]
    InvalidUri(String),
    #[error("Malformed authority record {url}: {reason}")]
    Malformed { url: String, reason: String },
    #[error("{0} links to unprocessable authority file")]
    Unprocessable(String),
    #[error("No proper authority record for {0}")]
    UnknownRegistry(String),
}

/// References already written to the output, with the kind they were
/// resolved to.
pub trait KnownAuthorities {
    fn kind_of(&self, uri: &str) -> Option<EntityKind>;
}

/// One authority registry.
#[async_trait]
pub trait AuthorityRegistry: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `uri` belongs to this registry
    fn handles(&self, uri: &str) -> bool;

    async fn lookup(&self, client: &Client, uri: &str) -> Result<Classification, AuthorityError>;
}

pub struct AuthorityResolver {
    client: Client,
    registries: Vec<Box<dyn AuthorityRegistry>>,
}

impl AuthorityResolver {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::with_registries(
            client,
            vec![
                Box::new(viaf::Viaf),
                Box::new(gnd::Gnd),
                Box::new(loc::Loc),
            ],
        ))
    }

    pub fn with_registries(client: Client, registries: Vec<Box<dyn AuthorityRegistry>>) -> Self {
        Self { client, registries }
    }

    /// Resolve an identifier from the table. References the document
    /// already holds are reused without another lookup.
    pub async fn resolve(
        &self,
        identifier: &str,
        known: &dyn KnownAuthorities,
    ) -> Result<Resolution, AuthorityError> {
        let uri = normalize_identifier(identifier);

        if let Some(kind) = known.kind_of(&uri) {
            tracing::debug!("Reusing {} for {}", kind.element_name(), uri);
            return Ok(Resolution {
                kind,
                reference: Some(uri),
                warning: None,
            });
        }

        let registry = self
            .registries
            .iter()
            .find(|registry| registry.handles(&uri))
            .ok_or_else(|| AuthorityError::UnknownRegistry(uri.clone()))?;

        tracing::debug!("Looking up {} in {}", uri, registry.name());
        let resolution = match registry.lookup(&self.client, &uri).await? {
            Classification::Entity(kind) => Resolution {
                kind,
                reference: Some(uri),
                warning: None,
            },
            Classification::UndifferentiatedPerson => Resolution {
                kind: EntityKind::Person,
                reference: None,
                warning: Some(AuthorityWarning::UndifferentiatedPerson(uri)),
            },
        };
        Ok(resolution)
    }
}

/// Turn a table cell into an authority URI. Bare GND control numbers
/// (digits, possibly with a two character check suffix like `-2` or `X`)
/// are completed to a GND URI; everything else is used as is.
pub fn normalize_identifier(identifier: &str) -> String {
    let identifier = identifier.trim();
    let chars: Vec<char> = identifier.chars().collect();
    let is_control_number = !identifier.starts_with("http")
        && chars.len() > 2
        && chars[..chars.len() - 2].iter().all(|c| c.is_ascii_digit());

    if is_control_number {
        tracing::debug!("Assigning ID {} to GND", identifier);
        format!("{}{}", GND_NAMESPACE, identifier)
    } else {
        identifier.to_string()
    }
}

/// Fetch and read an RDF/XML record.
pub(crate) async fn fetch_record(
    client: &Client,
    registry: &'static str,
    url: &str,
) -> Result<RdfDocument, AuthorityError> {
    let parsed = Url::parse(url).map_err(|_| AuthorityError::InvalidUri(url.to_string()))?;

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| AuthorityError::Unreachable {
            registry,
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(AuthorityError::NotFound {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| AuthorityError::Unreachable {
            registry,
            reason: e.to_string(),
        })?;

    RdfDocument::parse(&body).map_err(|e| AuthorityError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
