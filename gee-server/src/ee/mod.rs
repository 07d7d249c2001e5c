//! Builders turning a mosaic recipe into Earth Engine expressions

pub mod aoi;
pub mod collection;
pub mod mosaic;

use gee_client::EeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unsupported data set '{0}'")]
    UnsupportedDataSet(String),
    #[error("Invalid preview request: {0}")]
    InvalidRequest(String),
    #[error("Earth Engine query failed: {0}")]
    Engine(#[from] EeError),
}

/// Surface reflectance or top of atmosphere collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflectance {
    Sr,
    Toa,
}

impl Reflectance {
    pub fn from_corrections<S: AsRef<str>>(corrections: &[S]) -> Self {
        if corrections.iter().any(|c| c.as_ref() == "SR") {
            Reflectance::Sr
        } else {
            Reflectance::Toa
        }
    }
}
