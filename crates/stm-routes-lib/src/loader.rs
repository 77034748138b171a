//! Dataset loading from a remote URL or a local file

use crate::{FeatureCollection, OverlayError, Result};
use geojson::GeoJson;
use std::fmt;
use std::path::PathBuf;

/// STM bus routes, published as static GeoJSON
pub const DEFAULT_DATASET_URL: &str = "https://johnincog.github.io/iitc-plugins/stm_routes.geojson";

/// Where the dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Url(String),
    File(PathBuf),
}

impl Default for DatasetSource {
    fn default() -> Self {
        DatasetSource::Url(DEFAULT_DATASET_URL.to_string())
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Url(url) => write!(f, "{url}"),
            DatasetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetch and parse the dataset.
///
/// A single attempt: no retry, no timeout beyond the HTTP client's defaults. Non-2xx
/// responses are errors.
pub async fn fetch_dataset(source: &DatasetSource) -> Result<FeatureCollection> {
    tracing::info!("Loading STM routes from {}", source);

    let text = match source {
        DatasetSource::Url(url) => {
            let response = reqwest::get(url.as_str()).await?.error_for_status()?;
            response.text().await?
        }
        DatasetSource::File(path) => tokio::fs::read_to_string(path).await?,
    };

    let collection = parse_dataset(&text)?;
    tracing::debug!("Parsed {} features from {}", collection.features.len(), source);
    Ok(collection)
}

/// Parse a GeoJSON document into a feature collection.
///
/// A lone `Feature` is wrapped into a one-feature collection; a bare `Geometry` has no
/// properties to take a route id from and is rejected.
pub fn parse_dataset(text: &str) -> Result<FeatureCollection> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(OverlayError::UnsupportedDocument("Geometry")),
    }
}
