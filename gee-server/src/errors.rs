use crate::auth::AuthError;
use crate::ee::QueryError;
use crate::jobs::JobError;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use log::warn;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// Error body returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// Kind of failure, e.g. `authentication`
    #[serde(rename = "error")]
    pub kind: &'static str,
    pub detail: String,
    #[serde(skip)]
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a kind, detail message and status code
    pub fn new<S: ToString>(kind: &'static str, detail: S, status_code: StatusCode) -> Self {
        Self {
            kind,
            detail: detail.to_string(),
            status_code,
        }
    }

    /// Create new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(kind: &'static str, detail: S) -> Self {
        Self::new(kind, detail, StatusCode::BAD_REQUEST)
    }

    /// Create new Unauthorized Error (401) with a detail message
    pub fn unauthorized<S: ToString>(kind: &'static str, detail: S) -> Self {
        Self::new(kind, detail, StatusCode::UNAUTHORIZED)
    }

    /// Create new Bad Gateway (502) with a detail message
    pub fn bad_gateway<S: ToString>(kind: &'static str, detail: S) -> Self {
        Self::new(kind, detail, StatusCode::BAD_GATEWAY)
    }
}

impl From<JobError> for ApiError {
    fn from(error: JobError) -> Self {
        match error {
            JobError::MalformedCredentials(e) => Self::bad_request("malformed_credentials", e),
            JobError::Auth(e @ AuthError::Authentication(_)) => Self::unauthorized("authentication", e),
            JobError::Auth(e @ AuthError::Initialization(_)) => Self::bad_gateway("initialization", e),
            JobError::Query(e @ QueryError::Engine(_)) => Self::bad_gateway("query", e),
            JobError::Query(e) => Self::bad_request("invalid_request", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        warn!("Request failed with {}: {}", self.status_code, self.detail);
        let body = json!({
            "error": self.kind,
            "detail": self.detail,
        });
        (self.status_code, Json(body)).into_response()
    }
}
