//! End-to-end dispatch tests against a mock Capstan server.

use capstan_api::{Client, Error, Related, Request, Resource};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{any, body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Organization {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
}

impl Resource for Organization {
    const KIND: &'static str = "organizations";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<Related<Organization>>,
}

impl Resource for Project {
    const KIND: &'static str = "projects";
    const RELATIONSHIPS: &'static [&'static str] = &["organization"];
}

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .address(server.uri())
        .token("test-token")
        .build()
        .unwrap()
}

#[tokio::test]
async fn not_found_maps_to_dedicated_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"status": "404", "title": "not found"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute::<Organization>(Request::get("/api/v2/organizations/nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound));
}

#[tokio::test]
async fn unexpected_status_carries_code_and_body() {
    let server = MockServer::start().await;
    // expect(1) doubles as a no-retry check.
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute_list::<Organization>(Request::get("/api/v2/organizations"))
        .await
        .unwrap_err();

    match err {
        Error::UnexpectedStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn connection_failure_maps_to_transport_error() {
    // Nothing listens on the discard port, so the connection is refused
    // before any HTTP exchange takes place.
    let client = Client::builder()
        .address("http://127.0.0.1:9")
        .token("test-token")
        .build()
        .unwrap();

    let err = client
        .execute::<Organization>(Request::get("/api/v2/organizations/org-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn single_resource_decodes_into_caller_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations/org-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "type": "organizations",
                "id": "org-1",
                "attributes": {"name": "acme"}
            }
        })))
        .mount(&server)
        .await;

    let org: Organization = client_for(&server)
        .execute(Request::get("/api/v2/organizations/org-1"))
        .await
        .unwrap();

    assert_eq!(org.id.as_deref(), Some("org-1"));
    assert_eq!(org.name, "acme");
}

#[tokio::test]
async fn list_preserves_length_and_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"type": "organizations", "id": "org-3", "attributes": {"name": "c"}},
                {"type": "organizations", "id": "org-1", "attributes": {"name": "a"}},
                {"type": "organizations", "id": "org-2", "attributes": {"name": "b"}}
            ]
        })))
        .mount(&server)
        .await;

    let orgs: Vec<Organization> = client_for(&server)
        .execute_list(Request::get("/api/v2/organizations"))
        .await
        .unwrap();

    let ids: Vec<_> = orgs.iter().map(|o| o.id.as_deref().unwrap()).collect();
    assert_eq!(ids, ["org-3", "org-1", "org-2"]);
}

#[tokio::test]
async fn payload_is_sent_as_document_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/projects"))
        .and(body_json(json!({
            "data": {
                "type": "projects",
                "attributes": {"name": "vault"},
                "relationships": {
                    "organization": {"data": {"type": "organizations", "id": "org-1"}}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "type": "projects",
                "id": "prj-1",
                "attributes": {"name": "vault", "created_at": "2024-03-01T12:00:00Z"},
                "relationships": {
                    "organization": {"data": {"type": "organizations", "id": "org-1"}}
                }
            }
        })))
        .mount(&server)
        .await;

    let new_project = Project {
        id: None,
        name: "vault".to_string(),
        created_at: None,
        organization: Some(Related::new("org-1")),
    };
    let created: Project = client_for(&server)
        .execute(Request::post("/api/v2/projects").payload(&new_project))
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("prj-1"));
    assert_eq!(created.organization, Some(Related::new("org-1")));
    assert_eq!(
        created.created_at.unwrap(),
        "2024-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap()
    );
}

#[tokio::test]
async fn payload_takes_precedence_over_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/organizations"))
        .and(body_json(json!({
            "data": {"type": "organizations", "attributes": {"name": "acme"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"type": "organizations", "id": "org-1", "attributes": {"name": "acme"}}
        })))
        .mount(&server)
        .await;

    let org = Organization {
        id: None,
        name: "acme".to_string(),
    };
    let request = Request::post("/api/v2/organizations")
        .raw_body(&b"ignored"[..])
        .payload(&org);

    let created: Organization = client_for(&server).execute(request).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("org-1"));
}

#[tokio::test]
async fn raw_body_is_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/configuration-versions/cv-1/upload"))
        .and(body_string("raw archive bytes"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .execute_raw(
            Request::post("/api/v2/configuration-versions/cv-1/upload")
                .raw_body(&b"raw archive bytes"[..]),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn authorization_is_always_overwritten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations/org-1"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "organizations", "id": "org-1", "attributes": {"name": "acme"}}
        })))
        .mount(&server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer forged"));

    let org: Organization = client_for(&server)
        .execute(Request::get("/api/v2/organizations/org-1").headers(headers))
        .await
        .unwrap();

    assert_eq!(org.name, "acme");
}

#[tokio::test]
async fn default_content_type_is_the_document_media_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations/org-1"))
        .and(header("Content-Type", "application/vnd.api+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "organizations", "id": "org-1", "attributes": {"name": "acme"}}
        })))
        .mount(&server)
        .await;

    let org: Organization = client_for(&server)
        .execute(Request::get("/api/v2/organizations/org-1"))
        .await
        .unwrap();

    assert_eq!(org.name, "acme");
}

#[tokio::test]
async fn caller_content_type_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/configuration-versions/cv-1/upload"))
        .and(header("Content-Type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));

    let response = client_for(&server)
        .execute_raw(
            Request::post("/api/v2/configuration-versions/cv-1/upload")
                .headers(headers)
                .raw_body(&b"archive"[..]),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn query_parameters_are_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations"))
        .and(query_param("page[size]", "20"))
        .and(query_param("page[number]", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let orgs: Vec<Organization> = client_for(&server)
        .execute_list(
            Request::get("/api/v2/organizations")
                .query("page[size]", "20")
                .query("page[number]", "2"),
        )
        .await
        .unwrap();

    assert!(orgs.is_empty());
}

#[tokio::test]
async fn raw_execution_leaves_the_body_to_the_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/runs/run-1/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("run log line 1\nrun log line 2"))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .execute_raw(Request::get("/api/v2/runs/run-1/logs"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert_eq!(body, "run log line 1\nrun log line 2");
}

#[tokio::test]
async fn kind_mismatch_yields_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations/org-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "teams", "id": "team-1", "attributes": {"name": "ops"}}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute::<Organization>(Request::get("/api/v2/organizations/org-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn unencodable_payload_fails_before_any_request() {
    #[derive(Serialize, Deserialize)]
    struct Label(String);

    impl Resource for Label {
        const KIND: &'static str = "labels";
    }

    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .execute_raw(Request::post("/api/v2/labels").payload(&Label("urgent".to_string())))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Encode(_)));
}
