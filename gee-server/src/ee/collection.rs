//! Image collections of the optical data sets, with bands renamed to common names

use crate::ee::{QueryError, Reflectance};
use crate::models::{Dates, Scenes};
use gee_client::{Collection, Filter, Geometry};
use log::debug;

/// Band names shared by every data set after selection
pub const BAND_NAMES: [&str; 6] = ["blue", "green", "red", "nir", "swir1", "swir2"];

const OLI_BANDS: [&str; 6] = ["B2", "B3", "B4", "B5", "B6", "B7"];
const TM_BANDS: [&str; 6] = ["B1", "B2", "B3", "B4", "B5", "B7"];
const MSI_BANDS: [&str; 6] = ["B2", "B3", "B4", "B8A", "B11", "B12"];

/// Landsat TOA reflectance is stored as 0..1, everything else as 0..10000
const TOA_SCALE: f64 = 10000.0;

const SCENE_ID_PROPERTY: &str = "system:index";

#[derive(Debug, Clone, PartialEq)]
pub struct DataSetSpec {
    pub collection_id: String,
    pub bands: [&'static str; 6],
    pub scale: Option<f64>,
}

/// Collection and bands of a data set, e.g. `LANDSAT_8` or `LANDSAT_7_T2`
pub fn data_set_spec(data_set: &str, reflectance: Reflectance) -> Result<DataSetSpec, QueryError> {
    let (sensor, tier) = match data_set.strip_suffix("_T2") {
        Some(sensor) => (sensor, "T2"),
        None => (data_set, "T1"),
    };
    let unsupported = || QueryError::UnsupportedDataSet(data_set.to_string());

    if sensor == "SENTINEL_2" {
        if tier == "T2" {
            return Err(unsupported());
        }
        let collection_id = match reflectance {
            Reflectance::Sr => "COPERNICUS/S2_SR",
            Reflectance::Toa => "COPERNICUS/S2",
        };
        return Ok(DataSetSpec {
            collection_id: collection_id.to_string(),
            bands: MSI_BANDS,
            scale: None,
        });
    }

    let (satellite, bands) = match sensor {
        "LANDSAT_8" => ("LC08", OLI_BANDS),
        "LANDSAT_7" => ("LE07", TM_BANDS),
        "LANDSAT_5" => ("LT05", TM_BANDS),
        "LANDSAT_4" => ("LT04", TM_BANDS),
        _ => return Err(unsupported()),
    };
    let (suffix, scale) = match reflectance {
        Reflectance::Sr => ("SR", None),
        Reflectance::Toa => ("TOA", Some(TOA_SCALE)),
    };
    Ok(DataSetSpec {
        collection_id: format!("LANDSAT/{}/C01/{}_{}", satellite, tier, suffix),
        bands,
        scale,
    })
}

fn load(spec: &DataSetSpec, filter: Filter) -> Collection {
    Collection::load(spec.collection_id.as_str())
        .filter(filter)
        .select(&spec.bands, &BAND_NAMES, spec.scale)
}

/// Every scene of the data sets intersecting `region` within the date range
pub fn all_scenes(
    region: &Geometry,
    data_sets: &[String],
    reflectance: Reflectance,
    dates: &Dates,
) -> Result<Collection, QueryError> {
    if data_sets.is_empty() {
        return Err(QueryError::InvalidRequest("No data sets selected".to_string()));
    }
    let (start, end) = dates
        .range()
        .ok_or_else(|| QueryError::InvalidRequest("Date range out of bounds".to_string()))?;
    if start >= end {
        return Err(QueryError::InvalidRequest(format!(
            "Season ends ({}) before it starts ({})",
            end, start
        )));
    }

    let collections = data_sets
        .iter()
        .map(|data_set| {
            let spec = data_set_spec(data_set, reflectance)?;
            debug!("Loading all scenes of {} from {}", data_set, spec.collection_id);
            let filter = Filter::And(vec![
                Filter::Bounds(region.clone()),
                Filter::DateRange { start, end },
            ]);
            Ok(load(&spec, filter))
        })
        .collect::<Result<Vec<_>, QueryError>>()?;
    Ok(Collection::merge(collections))
}

/// The listed scenes, grouped by data set in the order the data sets first appear
pub fn selected_scenes(reflectance: Reflectance, scenes: &Scenes) -> Result<Collection, QueryError> {
    let mut by_data_set: Vec<(&str, Vec<String>)> = Vec::new();
    for scene in scenes.values() {
        match by_data_set
            .iter_mut()
            .find(|(data_set, _)| *data_set == scene.data_set)
        {
            Some((_, ids)) => ids.push(scene.id.clone()),
            None => by_data_set.push((scene.data_set.as_str(), vec![scene.id.clone()])),
        }
    }
    if by_data_set.is_empty() {
        return Err(QueryError::InvalidRequest("No scenes selected".to_string()));
    }

    let collections = by_data_set
        .into_iter()
        .map(|(data_set, ids)| {
            let spec = data_set_spec(data_set, reflectance)?;
            debug!("Loading {} selected scenes from {}", ids.len(), spec.collection_id);
            let filter = Filter::InList {
                field: SCENE_ID_PROPERTY.to_string(),
                values: ids,
            };
            Ok(load(&spec, filter))
        })
        .collect::<Result<Vec<_>, QueryError>>()?;
    Ok(Collection::merge(collections))
}
