use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const PREVIEW_TAG: &str = "Preview API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = PREVIEW_TAG, description = "Earth Engine image previews"),
    ),
    info(
        title = "SEPAL Earth Engine API",
        description = "Earth Engine jobs run on behalf of SEPAL users",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
