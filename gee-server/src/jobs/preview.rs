use crate::auth::EeAuth;
use crate::ee::aoi::to_geometry;
use crate::ee::collection::{all_scenes, selected_scenes};
use crate::ee::mosaic::to_mosaic;
use crate::ee::{QueryError, Reflectance};
use crate::jobs::{Job, JobError, Worker};
use crate::models::{PreviewRequest, Sources};
use async_trait::async_trait;
use gee_client::{EarthEngine, MapResult, ServiceAccountCredentials, VisParams};
use log::debug;
use std::sync::Arc;

pub const PREVIEW_JOB_NAME: &str = "EE Image preview";

/// Expands the data-set shorthands of the sources, keeping the order of
/// the source groups and of the data sets within each group
pub fn extract_data_sets(sources: &Sources) -> Vec<String> {
    sources
        .values()
        .flat_map(|data_set| match data_set.as_str() {
            "LANDSAT_TM" => vec!["LANDSAT_4".to_string(), "LANDSAT_5".to_string()],
            "LANDSAT_TM_T2" => vec!["LANDSAT_4_T2".to_string(), "LANDSAT_5_T2".to_string()],
            other => vec![other.to_string()],
        })
        .collect()
}

pub fn preview_vis_params() -> VisParams {
    VisParams {
        bands: vec!["red".to_string(), "green".to_string(), "blue".to_string()],
        min: 0.0,
        max: 3000.0,
        gamma: 1.5,
    }
}

/// Builds the mosaic of a recipe and creates a map of it
pub struct PreviewWorker {
    country_table: String,
}

impl PreviewWorker {
    pub fn new(country_table: impl Into<String>) -> Self {
        Self {
            country_table: country_table.into(),
        }
    }
}

#[async_trait]
impl Worker for PreviewWorker {
    type Input = PreviewRequest;
    type Output = MapResult;

    async fn run(
        &self,
        input: PreviewRequest,
        engine: &dyn EarthEngine,
    ) -> Result<MapResult, JobError> {
        let model = input.recipe.model;
        debug!("EE Image preview: {:?}", model);

        let region = to_geometry(&model.aoi, &self.country_table)?;
        let reflectance = Reflectance::from_corrections(&model.composite_options.corrections);
        let collection = if model.scene_selection_options.use_all_scenes() {
            let data_sets = extract_data_sets(&model.sources);
            all_scenes(&region, &data_sets, reflectance, &model.dates)?
        } else {
            selected_scenes(reflectance, &model.scenes)?
        };
        let image = to_mosaic(&region, collection);

        let map = engine
            .get_map(&image, &preview_vis_params())
            .await
            .map_err(QueryError::Engine)?;
        Ok(map)
    }
}

/// The preview job: Earth Engine authentication, then the preview worker
pub fn preview_job(
    service_account: Option<Arc<ServiceAccountCredentials>>,
    country_table: &str,
) -> Job<PreviewWorker> {
    Job::new(PREVIEW_JOB_NAME, file!(), PreviewWorker::new(country_table))
        .before(EeAuth::new(service_account))
}
