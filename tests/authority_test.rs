use std::collections::HashMap;

use csv2cmi::authority::{
    AuthorityError, AuthorityResolver, AuthorityWarning, EntityKind, KnownAuthorities,
};
use csv2cmi::correspondent::{CellOrigin, build_correspondents};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Known(HashMap<String, EntityKind>);

impl KnownAuthorities for Known {
    fn kind_of(&self, uri: &str) -> Option<EntityKind> {
        self.0.get(uri).copied()
    }
}

fn nothing_known() -> Known {
    Known(HashMap::new())
}

fn rdf_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/rdf+xml")
}

const VIAF_ORGANIZATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="http://viaf.org/viaf/1">
    <rdf:type rdf:resource="http://schema.org/Organization"/>
  </rdf:Description>
</rdf:RDF>"#;

const VIAF_NESTED_PERSON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="http://viaf.org/viaf/2">
    <rdf:type rdf:resource="http://schema.org/Place"/>
    <contains>
      <rdf:Description>
        <rdf:type rdf:resource="http://schema.org/Person"/>
      </rdf:Description>
    </contains>
  </rdf:Description>
</rdf:RDF>"#;

const GND_UNDIFFERENTIATED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="https://d-nb.info/gnd/1">
    <rdf:type rdf:resource="https://d-nb.info/standards/elementset/gnd#UndifferentiatedPerson"/>
  </rdf:Description>
</rdf:RDF>"#;

const GND_CORPORATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="https://d-nb.info/gnd/2">
    <rdf:type rdf:resource="https://d-nb.info/standards/elementset/gnd#CorporateBody"/>
    <rdf:type rdf:resource="https://d-nb.info/standards/elementset/gnd#DifferentiatedPerson"/>
  </rdf:Description>
</rdf:RDF>"#;

const LOC_PERSON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:madsrdf="http://www.loc.gov/mads/rdf/v1#">
  <madsrdf:PersonalName rdf:about="http://id.loc.gov/authorities/names/n1">
    <madsrdf:identifiesRWO>
      <rdf:Description>
        <rdf:type rdf:resource="http://id.loc.gov/ontologies/bibframe/Person"/>
      </rdf:Description>
    </madsrdf:identifiesRWO>
  </madsrdf:PersonalName>
</rdf:RDF>"#;

#[tokio::test]
async fn test_viaf_organization() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/viaf/1/rdf.xml"))
        .respond_with(rdf_response(VIAF_ORGANIZATION))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resolver = AuthorityResolver::new().expect("client builds");
    let uri = format!("{}/viaf/1", mock_server.uri());
    let resolution = resolver
        .resolve(&uri, &nothing_known())
        .await
        .expect("VIAF record resolves");

    assert_eq!(resolution.kind, EntityKind::Organization);
    assert_eq!(resolution.reference, Some(uri));
    assert_eq!(resolution.warning, None);
}

#[tokio::test]
async fn test_viaf_only_top_level_types_count() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/viaf/2/rdf.xml"))
        .respond_with(rdf_response(VIAF_NESTED_PERSON))
        .mount(&mock_server)
        .await;

    let resolver = AuthorityResolver::new().expect("client builds");
    let result = resolver
        .resolve(&format!("{}/viaf/2", mock_server.uri()), &nothing_known())
        .await;

    assert!(matches!(result, Err(AuthorityError::Unprocessable(_))));
}

#[tokio::test]
async fn test_gnd_undifferentiated_person_drops_reference() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gnd/1/about/rdf"))
        .respond_with(rdf_response(GND_UNDIFFERENTIATED))
        .mount(&mock_server)
        .await;

    let resolver = AuthorityResolver::new().expect("client builds");
    let uri = format!("{}/gnd/1", mock_server.uri());
    let resolution = resolver
        .resolve(&uri, &nothing_known())
        .await
        .expect("GND record resolves");

    assert_eq!(resolution.kind, EntityKind::Person);
    assert_eq!(resolution.reference, None);
    assert_eq!(
        resolution.warning,
        Some(AuthorityWarning::UndifferentiatedPerson(uri))
    );
}

#[tokio::test]
async fn test_gnd_first_type_decides() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gnd/2/about/rdf"))
        .respond_with(rdf_response(GND_CORPORATE))
        .mount(&mock_server)
        .await;

    let resolver = AuthorityResolver::new().expect("client builds");
    let resolution = resolver
        .resolve(&format!("{}/gnd/2", mock_server.uri()), &nothing_known())
        .await
        .expect("GND record resolves");

    assert_eq!(resolution.kind, EntityKind::Organization);
}

#[tokio::test]
async fn test_loc_type_anywhere_in_record() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loc/names/n1.rdf"))
        .respond_with(rdf_response(LOC_PERSON))
        .mount(&mock_server)
        .await;

    let resolver = AuthorityResolver::new().expect("client builds");
    let resolution = resolver
        .resolve(&format!("{}/loc/names/n1", mock_server.uri()), &nothing_known())
        .await
        .expect("LOC record resolves");

    assert_eq!(resolution.kind, EntityKind::Person);
    assert!(resolution.reference.is_some());
}

#[tokio::test]
async fn test_missing_record() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/viaf/404/rdf.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let resolver = AuthorityResolver::new().expect("client builds");
    let result = resolver
        .resolve(&format!("{}/viaf/404", mock_server.uri()), &nothing_known())
        .await;

    match result {
        Err(AuthorityError::NotFound { status, .. }) => assert_eq!(status.as_u16(), 404),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_record() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gnd/3/about/rdf"))
        .respond_with(rdf_response("<rdf:RDF><broken></rdf:RDF>"))
        .mount(&mock_server)
        .await;

    let resolver = AuthorityResolver::new().expect("client builds");
    let result = resolver
        .resolve(&format!("{}/gnd/3", mock_server.uri()), &nothing_known())
        .await;

    assert!(result.is_err());
}

// nothing listens on port 1
const CLOSED_PORT: &str = "http://127.0.0.1:1";

#[tokio::test]
async fn test_unreachable_registry() {
    let resolver = AuthorityResolver::new().expect("client builds");
    let result = resolver
        .resolve(&format!("{}/viaf/1", CLOSED_PORT), &nothing_known())
        .await;

    match result {
        Err(AuthorityError::Unreachable { registry, .. }) => assert_eq!(registry, "VIAF"),
        other => panic!("expected Unreachable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_registry_falls_back_to_person() {
    let resolver = AuthorityResolver::new().expect("client builds");
    let origin = CellOrigin {
        line: 2,
        column: "sender",
    };

    let uri = format!("{}/viaf/1", CLOSED_PORT);

    let correspondents = build_correspondents(
        "Academy",
        Some(uri.as_str()),
        None,
        &resolver,
        &nothing_known(),
        origin,
    )
    .await;

    assert_eq!(correspondents.len(), 1);
    assert_eq!(correspondents[0].name, "Academy");
    assert_eq!(correspondents[0].kind, EntityKind::Person);
    assert_eq!(correspondents[0].reference, None);
}
