//! STM Routes Library - Route Grouping and Highlighting for Transit Overlays
//!
//! This library turns a GeoJSON feature collection of transit route geometries into
//! map segments grouped by route, and keeps exactly one route highlighted at a time
//! when the user clicks a segment. Drawing and layer management belong to the host
//! map application, which plugs in through the collaborator traits below.
//!
//! # Architecture
//!
//! - **[`RouteProperties`]**: Optional-field property record with the id/label extractors
//! - **[`RouteIndex`]**: Route id to the ordered segment handles of that route
//! - **[`Highlighter`]**: The `Idle` / `Highlighted(route)` state machine
//! - **[`Overlay`]**: The single extension instance: config, index, highlight state and layer
//! - **[`SegmentDrawer`]** / **[`LayerRegistry`]** / **[`SegmentHandle`]**: Host collaborators
//! - **[`fetch_dataset`]**: Async loading of the dataset from a URL or a local file
//! - **[`BootHooks`]**: Run setup now, or once the host signals readiness
//!
//! # Lifecycle
//!
//! Every successful load rebuilds the index and forgets the active route. A failed load
//! leaves the previous render, index and highlight state exactly as they were.

mod boot;
mod highlight;
mod index;
mod loader;
mod overlay;
mod properties;
mod render;
mod segment;
mod style;
pub mod utils;

#[cfg(test)]
mod testing;

// Public API exports
pub use boot::BootHooks;
pub use highlight::{HighlightState, Highlighter, StyleFailure, StyleReport};
pub use index::RouteIndex;
pub use loader::{DEFAULT_DATASET_URL, DatasetSource, fetch_dataset, parse_dataset};
pub use overlay::{Overlay, OverlayConfig};
pub use properties::{JsonObject, RouteProperties};
pub use render::{LayerRegistry, RenderSummary, SegmentDrawer};
pub use segment::{ClickAction, RouteLabel, SegmentHandle};
pub use style::{Rgb, SegmentStyle, StyleKind, StylePresets};

pub use geojson::{Feature, FeatureCollection};

/// Errors raised while loading the dataset
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Dataset request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON parsing error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Unsupported GeoJSON document: expected a FeatureCollection or Feature, got {0}")]
    UnsupportedDocument(&'static str),
}

/// Failure to restyle a single segment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("Segment is no longer part of a drawn layer")]
    Detached,

    #[error("Layer lock poisoned")]
    Poisoned,
}

/// Failure reported by the host's layer management
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Layer control is not available")]
    LayerControlUnavailable,

    #[error("Layer is not registered with the map")]
    UnknownLayer,

    #[error("Layer group already registered: {0}")]
    DuplicateGroup(String),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
