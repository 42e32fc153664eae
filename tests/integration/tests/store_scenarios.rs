//! Store integration scenarios.
//!
//! Each test runs the full client stack over HTTP against a mock store and
//! checks the requests the store received.

use confidant_client::ClientError;
use confidant_integration_tests::{
    bodies, client, credentials, granted, hits, mount, pending, service,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_resolve_names_against_store() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/v1/credentials",
        200,
        json!({"credentials": [
            {"id": "1", "name": "included"},
            {"id": "2", "name": "excluded"},
        ]}),
    )
    .await;
    let client = client(&server);

    let found = client
        .find_credentials_by_name(&names(&["included"]))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "1");

    match client
        .find_credentials_by_name(&names(&["included", "missing"]))
        .await
    {
        Err(ClientError::UnresolvedCredentials { names }) => assert_eq!(names, vec!["missing"]),
        other => panic!("expected UnresolvedCredentials, got {other:?}"),
    }
}

#[tokio::test]
async fn test_assign_credential_end_to_end() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/v1/services/billing", 200, service("billing")).await;
    mount(&server, "GET", "/v1/credentials", 200, credentials()).await;
    mount(&server, "PUT", "/v1/grants/billing", 200, granted()).await;
    mount(
        &server,
        "PUT",
        "/v1/services/billing",
        200,
        json!({
            "id": "billing", "enabled": true, "revision": 8, "account": "team-a",
            "credentials": [{"id": "1", "name": "initial"}, {"id": "2", "name": "new"}],
        }),
    )
    .await;
    let client = client(&server);

    let updated = client.assign_credential("billing", "new").await.unwrap();
    assert_eq!(updated.revision, 8);
    assert_eq!(updated.credentials.len(), 2);

    let submitted = bodies(&server, "PUT", "/v1/services/billing").await;
    assert_eq!(submitted.len(), 1);
    let mut ids: Vec<&str> = submitted[0]["credentials"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(submitted[0]["blind_credentials"], json!([]));
    assert_eq!(submitted[0]["account"], "team-a");
    assert_eq!(submitted[0]["enabled"], true);

    // Once before submitting, once after for the nonzero revision.
    assert_eq!(hits(&server, "PUT", "/v1/grants/billing").await, 2);

    // The cached copy reflects the submit; no further fetch.
    let cached = client.get_service("billing").await.unwrap();
    assert_eq!(cached.revision, 8);
    assert_eq!(hits(&server, "GET", "/v1/services/billing").await, 1);
}

#[tokio::test]
async fn test_disable_submits_empty_credentials() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/v1/services/billing", 200, service("billing")).await;
    mount(
        &server,
        "PUT",
        "/v1/services/billing",
        200,
        json!({"id": "billing", "enabled": false, "revision": 8, "credentials": []}),
    )
    .await;
    let client = client(&server);

    let disabled = client.disable_service("billing").await.unwrap();
    assert!(!disabled.enabled);

    let submitted = bodies(&server, "PUT", "/v1/services/billing").await;
    assert_eq!(
        submitted[0],
        json!({
            "credentials": [],
            "blind_credentials": [],
            "account": "team-a",
            "enabled": false,
        })
    );
    assert_eq!(hits(&server, "PUT", "/v1/grants/billing").await, 0);
}

#[tokio::test]
async fn test_error_shaped_success_is_an_error() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/v1/services/billing", 200, service("billing")).await;
    mount(&server, "PUT", "/v1/grants/billing", 200, granted()).await;
    mount(
        &server,
        "PUT",
        "/v1/services/billing",
        200,
        json!({"error": "some failure"}),
    )
    .await;
    let client = client(&server);

    match client.enable_service("billing").await {
        Err(ClientError::Store(message)) => assert_eq!(message, "some failure"),
        other => panic!("expected Store error, got {other:?}"),
    }
    // The failed submit leaves the fetched snapshot cached.
    assert_eq!(client.directory().cached("billing").unwrap().revision, 7);
}

#[tokio::test]
async fn test_create_service_flow() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/v1/services/payments", 404, json!({})).await;
    mount(&server, "GET", "/v1/roles", 200, json!({"roles": ["payments", "billing"]})).await;
    mount(&server, "GET", "/v1/credentials", 200, credentials()).await;
    mount(&server, "PUT", "/v1/grants/payments", 200, granted()).await;
    mount(
        &server,
        "PUT",
        "/v1/services/payments",
        200,
        json!({
            "result": true,
            "service": {"id": "payments", "enabled": true, "revision": 1,
                        "credentials": [{"id": "2", "name": "new"}, {"id": "3", "name": "other"}]},
        }),
    )
    .await;
    let client = client(&server);

    let created = client
        .create_service("payments", &names(&["new", "other"]))
        .await
        .unwrap();
    assert_eq!(created.id, "payments");
    assert_eq!(created.credentials.len(), 2);

    let submitted = bodies(&server, "PUT", "/v1/services/payments").await;
    assert_eq!(submitted[0]["credentials"], json!(["2", "3"]));
    assert_eq!(submitted[0]["enabled"], true);
    assert_eq!(hits(&server, "PUT", "/v1/grants/payments").await, 1);
}

#[tokio::test]
async fn test_create_existing_service_reports_already_exists() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/v1/services/billing", 200, service("billing")).await;
    mount(&server, "PUT", "/v1/grants/billing", 200, granted()).await;
    let client = client(&server);

    assert!(matches!(
        client.create_service("billing", &[]).await,
        Err(ClientError::AlreadyExists(ref name)) if name == "billing"
    ));
    assert_eq!(hits(&server, "PUT", "/v1/grants/billing").await, 1);
    assert_eq!(hits(&server, "PUT", "/v1/services/billing").await, 0);
}

#[tokio::test]
async fn test_create_rejects_invalid_role() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/v1/services/rogue", 404, json!({})).await;
    mount(&server, "GET", "/v1/roles", 200, json!({"roles": ["billing"]})).await;
    let client = client(&server);

    assert!(matches!(
        client.create_service("rogue", &[]).await,
        Err(ClientError::InvalidRole(_))
    ));
}

#[tokio::test]
async fn test_missing_service() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/v1/services/ghost", 404, json!({})).await;
    let client = client(&server);

    match client.get_service("ghost").await {
        Err(ClientError::ServiceNotFound(name)) => assert_eq!(name, "ghost"),
        other => panic!("expected ServiceNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_codes() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/v1/roles", 403, json!({})).await;
    Mock::given(method("GET"))
        .and(path("/v1/services"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;
    let client = client(&server);

    assert!(matches!(client.list_roles().await, Err(ClientError::Forbidden)));
    match client.list_services().await {
        Err(ClientError::RequestFailed { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_grants_become_complete_after_polling() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/grants/billing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending()))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    mount(&server, "PUT", "/v1/grants/billing", 200, granted()).await;
    let client = client(&server);

    let grants = client.ensure_grants("billing").await.unwrap();
    assert!(grants.is_complete());
    assert_eq!(hits(&server, "PUT", "/v1/grants/billing").await, 4);
}

#[tokio::test]
async fn test_grants_terminal_error_stops_retrying() {
    let server = MockServer::start().await;
    mount(
        &server,
        "PUT",
        "/v1/grants/billing",
        200,
        json!({"error": "id provided does not exist"}),
    )
    .await;
    let client = client(&server);

    assert!(matches!(
        client.ensure_grants("billing").await,
        Err(ClientError::TerminalGrant { .. })
    ));
    assert_eq!(hits(&server, "PUT", "/v1/grants/billing").await, 1);
}

#[tokio::test]
async fn test_grants_time_out_after_ten_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/grants/billing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending()))
        .expect(10)
        .mount(&server)
        .await;
    let client = client(&server);

    match client.ensure_grants("billing").await {
        Err(ClientError::GrantTimeout { service, attempts }) => {
            assert_eq!(service, "billing");
            assert_eq!(attempts, 10);
        }
        other => panic!("expected GrantTimeout, got {other:?}"),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_get_grants_single_fetch() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/v1/grants/billing",
        200,
        json!({"grants": {"encrypt_grant": true, "decrypt_grant": false}}),
    )
    .await;
    let client = client(&server);

    let grants = client.get_grants("billing").await.unwrap();
    assert!(grants.encrypt_grant);
    assert!(!grants.decrypt_grant);
    assert_eq!(hits(&server, "GET", "/v1/grants/billing").await, 1);
}
