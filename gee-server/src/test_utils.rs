use crate::config::GeeConfig;
use crate::create_app;
use crate::credentials::tests::test_service_account;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use gee_client::{EngineType, HttpEarthEngine, MockEarthEngine};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::MockServer;

/// Test fixture running the application against a recording Earth Engine.
///
/// `engine` shares its call log with every session the jobs create, so tests
/// can assert on the calls a request caused. `ee_mock` backs the configured
/// Earth Engine API URL; [`TestFixture::with_http_engine`] routes the jobs to it.
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///     fixture.engine.fail_on(MockStep::Initialize, "quota exceeded");
///
///     let response = fixture.post("/preview", &preview_request_json()).await;
///
///     response.assert_status(StatusCode::BAD_GATEWAY);
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub config: GeeConfig,
    /// Handle on the recording engine used by the jobs
    pub engine: MockEarthEngine,
    /// Mock server for the Earth Engine REST API
    pub ee_mock: MockServer,
}

impl TestFixture {
    /// Creates a fixture whose jobs run on a [`MockEarthEngine`]
    pub async fn new() -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let ee_mock = MockServer::start().await;
        let config = GeeConfig::for_test_with_mock(&ee_mock);
        let engine = MockEarthEngine::new();
        let state = AppState::with_engine(
            config.clone(),
            EngineType::Mock(engine.clone()),
            Some(test_service_account()),
        );

        Self {
            app: create_app(state),
            config,
            engine,
            ee_mock,
        }
    }

    /// Creates a fixture whose jobs call the Earth Engine REST API served by `ee_mock`
    pub async fn with_http_engine() -> Self {
        let mut fixture = Self::new().await;
        let ee = &fixture.config.earth_engine;
        let engine = HttpEarthEngine::new(
            &ee.api_url,
            &ee.project,
            Duration::from_secs(ee.query_timeout),
        )
        .expect("Failed to create HTTP engine");
        let state = AppState::with_engine(
            fixture.config.clone(),
            EngineType::Http(engine),
            Some(test_service_account()),
        );
        fixture.app = create_app(state);
        fixture
    }

    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    pub fn request_builder(&self, method: Method, uri: impl AsRef<str>) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json")
    }

    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn post<T: Serialize>(&self, uri: impl AsRef<str>, body: &T) -> TestResponse {
        self.post_with_headers(uri, body, &[]).await
    }

    pub async fn post_with_headers<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let mut builder = self.request_builder(Method::POST, uri);

        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Non-JSON bodies (e.g. axum rejections) become an empty object
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse { status, json }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub json: Value,
}

impl TestResponse {
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}

mod tests {
    use super::*;
    use crate::credentials::SEPAL_USER_HEADER;
    use crate::models::tests::preview_request_json;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_openapi_documents_endpoints() {
        let fixture = TestFixture::new().await;

        let response = fixture.get("/openapi.json").await;

        response.assert_ok();
        assert!(response.json["paths"]["/preview"]["post"].is_object());
        assert!(response.json["paths"]["/health"]["get"].is_object());
    }

    #[tokio::test]
    async fn test_preview_against_earth_engine_api() {
        let fixture = TestFixture::with_http_engine().await;
        let user = json!({
            "username": "alice",
            "googleTokens": {"accessToken": "ya29.alice", "accessTokenExpiryDate": 4102444800000i64}
        })
        .to_string();

        Mock::given(method("GET"))
            .and(path("/v1/projects/test-project/algorithms"))
            .and(header("authorization", "Bearer ya29.alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"algorithms": []})))
            .expect(1)
            .mount(&fixture.ee_mock)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/test-project/maps"))
            .and(header("authorization", "Bearer ya29.alice"))
            .and(body_partial_json(json!({
                "bandIds": ["red", "green", "blue"],
                "visualizationOptions": {"ranges": [{"min": 0.0, "max": 3000.0}], "gamma": {"value": 1.5}}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "projects/test-project/maps/abc"})),
            )
            .expect(1)
            .mount(&fixture.ee_mock)
            .await;

        let response = fixture
            .post_with_headers(
                "/preview",
                &preview_request_json(),
                &[(SEPAL_USER_HEADER, user.as_str())],
            )
            .await;

        response.assert_ok();
        assert_eq!(response.json["mapId"], "projects/test-project/maps/abc");
        assert_eq!(
            response.json["urlFormat"],
            format!(
                "{}/v1/projects/test-project/maps/abc/tiles/{{z}}/{{x}}/{{y}}",
                fixture.ee_mock.uri()
            )
        );
    }

    #[tokio::test]
    async fn test_rejected_token_is_initialization_failure() {
        let fixture = TestFixture::with_http_engine().await;
        let user = json!({
            "googleTokens": {"accessToken": "ya29.expired", "accessTokenExpiryDate": 0}
        })
        .to_string();

        Mock::given(method("GET"))
            .and(path("/v1/projects/test-project/algorithms"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Request had invalid authentication credentials"))
            .expect(1)
            .mount(&fixture.ee_mock)
            .await;

        let response = fixture
            .post_with_headers(
                "/preview",
                &preview_request_json(),
                &[(SEPAL_USER_HEADER, user.as_str())],
            )
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        assert_eq!(response.json["error"], "initialization");
    }

    #[tokio::test]
    async fn test_extreme_token_expiry_dates_reach_earth_engine() {
        for expiry in [i64::MAX, i64::MIN] {
            let fixture = TestFixture::with_http_engine().await;
            let user = json!({
                "googleTokens": {"accessToken": "ya29.alice", "accessTokenExpiryDate": expiry}
            })
            .to_string();

            Mock::given(method("GET"))
                .and(path("/v1/projects/test-project/algorithms"))
                .and(header("authorization", "Bearer ya29.alice"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"algorithms": []})))
                .expect(1)
                .mount(&fixture.ee_mock)
                .await;
            Mock::given(method("POST"))
                .and(path("/v1/projects/test-project/maps"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"name": "projects/test-project/maps/abc"})),
                )
                .mount(&fixture.ee_mock)
                .await;

            let response = fixture
                .post_with_headers(
                    "/preview",
                    &preview_request_json(),
                    &[(SEPAL_USER_HEADER, user.as_str())],
                )
                .await;

            response.assert_ok();
        }
    }
}
