use gee_client::{EarthEngine, HttpEarthEngine, ServiceAccountCredentials};
use log::LevelFilter;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_FILE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/service_account.json"
);

fn load_credentials(server: &MockServer) -> ServiceAccountCredentials {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();

    let mut credentials =
        ServiceAccountCredentials::from_file(KEY_FILE).expect("Failed to load key file");
    credentials.token_uri = Some(format!("{}/token", server.uri()));
    credentials
}

/// The private-key flow exchanges a signed assertion for a token and
/// uses that token for subsequent calls.
#[tokio::test]
async fn test_service_account_flow() {
    let server = MockServer::start().await;
    let credentials = load_credentials(&server);

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion=ey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "service-token",
            "expires_in": 3599,
            "token_type": "Bearer",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/gee-test/algorithms"))
        .and(header("authorization", "Bearer service-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"algorithms": []})))
        .expect(1)
        .mount(&server)
        .await;

    let engine = HttpEarthEngine::new(&server.uri(), "gee-test", Duration::from_secs(5))
        .expect("Failed to create engine");

    engine
        .authenticate_via_private_key(&credentials)
        .await
        .expect("Authentication failed");
    engine.initialize().await.expect("Initialization failed");
}

#[tokio::test]
async fn test_rejected_assertion() {
    let server = MockServer::start().await;
    let credentials = load_credentials(&server);

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = HttpEarthEngine::new(&server.uri(), "gee-test", Duration::from_secs(5))
        .expect("Failed to create engine");

    let err = engine
        .authenticate_via_private_key(&credentials)
        .await
        .expect_err("Authentication should fail");
    assert!(err.to_string().contains("invalid_grant"));

    // No token was installed
    assert!(engine.initialize().await.is_err());
}
