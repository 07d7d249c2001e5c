use crate::credentials::RequestContext;
use crate::errors::ApiError;
use crate::models::PreviewRequest;
use crate::openapi::PREVIEW_TAG;
use crate::state::AppState;
use axum::extract::{Json, State};
use gee_client::MapResult;
use http::HeaderMap;
use log::debug;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Map created for a preview
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MapResponse {
    /// Earth Engine map resource name
    pub map_id: String,
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders
    pub url_format: String,
}

impl From<MapResult> for MapResponse {
    fn from(map: MapResult) -> Self {
        Self {
            map_id: map.map_id,
            url_format: map.url_format,
        }
    }
}

#[utoipa::path(
    post,
    path = "/preview",
    tag = PREVIEW_TAG,
    request_body = PreviewRequest,
    params(
        ("sepal-user" = Option<String>, Header, description = "JSON encoded SEPAL user, optionally with Google tokens"),
    ),
    responses(
        (status = 200, description = "Preview map created", body = MapResponse),
        (status = 400, description = "Malformed credentials or invalid recipe", body = ApiError),
        (status = 401, description = "Earth Engine authentication failed", body = ApiError),
        (status = 502, description = "Earth Engine initialization or query failed", body = ApiError),
    )
)]
pub(super) async fn preview_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<MapResponse>, ApiError> {
    debug!(
        "Preview requested for project {}",
        state.config.earth_engine.project
    );
    let context = RequestContext::new(headers);
    let map = state
        .preview
        .submit(&context, request, state.engine.as_ref())
        .await?;
    Ok(Json(map.into()))
}
