//! CLI routing integration tests.
//!
//! Commands are parsed and dispatched through `confidant_cli::run` against a
//! mock store, using a config file with the local encryptor.

use clap::Parser;
use confidant_cli::{run, Cli};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOCAL_KEY: &str = "4f1c2a0b9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c4b3a29180716f5e4d3c2b1a090";

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("confidant.json5");
    std::fs::write(
        &path,
        format!(
            r#"{{
                store: {{ url: "http://unused.invalid" }},
                auth: {{
                    from: "cli-tests",
                    to: "confidant-testing",
                    encryptor: "local",
                    local_key: "{LOCAL_KEY}",
                }},
                grants: {{ max_attempts: 2, retry_interval_secs: 0 }},
            }}"#
        ),
    )
    .unwrap();
    path
}

fn cli(config: &Path, server: &MockServer, args: &[&str]) -> Cli {
    let mut argv = vec![
        "confidant".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "--url".to_string(),
        server.uri(),
    ];
    argv.extend(args.iter().map(|s| s.to_string()));
    Cli::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn test_whoami() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let server = MockServer::start().await;

    run(cli(&config, &server, &["whoami"])).await.unwrap();
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_roles_check_routes_to_store() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"roles": ["billing"]})))
        .expect(2)
        .mount(&server)
        .await;

    run(cli(&config, &server, &["roles", "check", "billing"]))
        .await
        .unwrap();
    assert!(run(cli(&config, &server, &["roles", "check", "rogue"]))
        .await
        .is_err());
    server.verify().await;
}

#[tokio::test]
async fn test_service_disable_routes_to_store() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/services/billing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "billing", "enabled": true, "revision": 2,
            "credentials": [{"id": "1", "name": "db"}],
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/services/billing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "billing", "enabled": false, "revision": 3, "credentials": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    run(cli(&config, &server, &["service", "disable", "billing"]))
        .await
        .unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_grants_ensure_uses_configured_attempts() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/grants/billing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grants": {"encrypt_grant": true, "decrypt_grant": false},
        })))
        .expect(2)
        .mount(&server)
        .await;

    let err = run(cli(&config, &server, &["grants", "ensure", "billing"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("after 2 attempts"));
    server.verify().await;
}

#[tokio::test]
async fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("confidant.json5");
    std::fs::write(&path, r#"{ auth: { encryptor: "local" } }"#).unwrap();
    let server = MockServer::start().await;

    let err = run(cli(&path, &server, &["roles", "list"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to initialize client"));
}
