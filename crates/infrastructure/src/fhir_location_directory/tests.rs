use httpmock::prelude::*;
use locus_application::LocationDirectory;
use locus_core::NonEmptyString;
use locus_domain::{FeedKey, LocationId, Page, PageRequest};
use serde_json::{Value, json};
use url::Url;

use super::FhirLocationDirectory;
use crate::HttpApiClient;

fn directory(base_url: &str) -> FhirLocationDirectory {
    let base_url = match Url::parse(base_url) {
        Ok(url) => url,
        Err(error) => panic!("invalid test base url '{base_url}': {error}"),
    };
    let client = HttpApiClient::new(reqwest::Client::new(), base_url, None, 2, 1);

    match FhirLocationDirectory::new(client, "ws/fhir2/R4") {
        Ok(directory) => directory,
        Err(error) => panic!("failed to build directory: {error}"),
    }
}

fn bundle(entries: &[(&str, &str)], next: Option<&str>) -> Value {
    let link: Vec<Value> = next
        .map(|url| json!({"relation": "next", "url": url}))
        .into_iter()
        .chain(std::iter::once(json!({"relation": "self", "url": "http://ignored/self"})))
        .collect();
    let entry: Vec<Value> = entries
        .iter()
        .map(|(id, name)| json!({"resource": {"resourceType": "Location", "id": id, "name": name}}))
        .collect();

    json!({
        "resourceType": "Bundle",
        "type": "searchset",
        "total": 3,
        "meta": {"lastUpdated": "2024-01-10T08:00:00.000+00:00"},
        "link": link,
        "entry": entry,
    })
}

fn ids(page: &Page) -> Vec<&str> {
    page.locations
        .iter()
        .map(|location| location.id().as_str())
        .collect()
}

#[tokio::test]
async fn first_page_carries_summary_count_tag_and_name_filter() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/openmrs/ws/fhir2/R4/Location")
            .query_param("_summary", "data")
            .query_param("_count", "50")
            .query_param("_tag", "Login Location")
            .query_param("name:contains", "lab");
        then.status(200).json_body(bundle(
            &[("lab-1", "Laboratory"), ("lab-2", "Lab Annex")],
            Some("http://backend.internal/openmrs/ws/fhir2/R4?_getpages=abc&_getpagesoffset=50"),
        ));
    });

    let directory = directory(&server.url("/openmrs"));
    let key = FeedKey::new(NonEmptyString::new("Login Location").ok(), 50, "lab");
    let page = directory
        .fetch_page(&PageRequest::Initial { key, offset: 0 })
        .await;

    mock.assert_calls(1);
    let Ok(page) = page else {
        panic!("expected a page");
    };
    assert_eq!(ids(&page), vec!["lab-1", "lab-2"]);
    assert_eq!(page.total, Some(3));
    assert!(page.has_next());
}

#[test]
fn empty_search_sends_no_name_filter() {
    let directory = directory("http://localhost:8080/openmrs");

    let url = directory.search_url(&FeedKey::new(None, 50, "   "), 0);

    assert_eq!(
        url.as_str(),
        "http://localhost:8080/openmrs/ws/fhir2/R4/Location?_summary=data&_count=50"
    );
}

#[test]
fn later_initial_pages_carry_the_offset() {
    let directory = directory("http://localhost:8080/openmrs");

    let url = directory.search_url(&FeedKey::new(None, 25, "ward"), 50);

    assert_eq!(
        url.query(),
        Some("_summary=data&_count=25&_getpagesoffset=50&name%3Acontains=ward")
    );
}

#[tokio::test]
async fn continuation_link_from_foreign_origin_is_rebased() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/openmrs/ws/fhir2/R4")
            .query_param("_getpages", "abc")
            .query_param("_getpagesoffset", "50");
        then.status(200).json_body(bundle(&[("c", "Ward C")], None));
    });

    let directory = directory(&server.url("/openmrs"));
    let page = directory
        .fetch_page(&PageRequest::Continuation {
            link: "http://backend.internal:9000/openmrs/ws/fhir2/R4?_getpages=abc&_getpagesoffset=50"
                .to_owned(),
        })
        .await;

    mock.assert_calls(1);
    assert!(page.is_ok_and(|page| ids(&page) == vec!["c"]));
}

#[tokio::test]
async fn entries_without_identifier_are_dropped() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/openmrs/ws/fhir2/R4/Location");
        then.status(200).json_body(json!({
            "resourceType": "Bundle",
            "entry": [
                {"resource": {"name": "No id"}},
                {"resource": {"id": "b"}},
                {"fullUrl": "http://ignored"}
            ]
        }));
    });

    let directory = directory(&server.url("/openmrs"));
    let page = directory
        .fetch_page(&PageRequest::Initial {
            key: FeedKey::new(None, 0, ""),
            offset: 0,
        })
        .await;

    let Ok(page) = page else {
        panic!("expected a page");
    };
    assert_eq!(ids(&page), vec!["b"]);
    assert_eq!(page.locations.first().map(|location| location.name()), Some("b"));
    assert_eq!(page.total, None);
}

#[tokio::test]
async fn location_is_found_by_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/openmrs/ws/fhir2/R4/Location")
            .query_param("_id", "default");
        then.status(200)
            .json_body(bundle(&[("default", "Main Entrance")], None));
    });

    let directory = directory(&server.url("/openmrs"));
    let Ok(location_id) = LocationId::new("default") else {
        panic!("valid location id");
    };

    let location = directory.find_location(&location_id).await;

    mock.assert_calls(1);
    assert!(location.is_ok_and(|location| {
        location.is_some_and(|location| location.name() == "Main Entrance")
    }));
}

#[tokio::test]
async fn unknown_location_id_resolves_to_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/openmrs/ws/fhir2/R4/Location");
        then.status(200).json_body(json!({"resourceType": "Bundle", "total": 0}));
    });

    let directory = directory(&server.url("/openmrs"));
    let Ok(location_id) = LocationId::new("missing") else {
        panic!("valid location id");
    };

    assert_eq!(directory.find_location(&location_id).await, Ok(None));
}

#[tokio::test]
async fn relative_continuation_link_stays_on_the_location_endpoint() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/openmrs/ws/fhir2/R4/Location")
            .query_param("_getpages", "xyz")
            .query_param("_getpagesoffset", "50");
        then.status(200).json_body(bundle(&[("d", "Ward D")], None));
    });

    let directory = directory(&server.url("/openmrs"));
    let page = directory
        .fetch_page(&PageRequest::Continuation {
            link: "?_getpages=xyz&_getpagesoffset=50".to_owned(),
        })
        .await;

    mock.assert_calls(1);
    assert!(page.is_ok_and(|page| ids(&page) == vec!["d"]));
}
