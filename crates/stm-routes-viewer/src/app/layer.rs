//! GeoJSON drawing layer
//!
//! This is the host side of the overlay's segment handles: a layer owns the projected
//! geometry, current style, label and click binding of every drawn feature, and a
//! [`SegmentRef`] is an index into it.

use geo::LineString;
use std::sync::{Arc, RwLock};
use stm_routes_lib::{
    ClickAction, Feature, FeatureCollection, RouteLabel, SegmentDrawer, SegmentHandle,
    SegmentStyle, StyleError, utils,
};

/// One drawn feature
#[derive(Debug, Clone)]
pub struct DrawnSegment {
    /// Polylines in lon/lat
    pub lines: Vec<LineString<f64>>,
    pub style: SegmentStyle,
    pub label: Option<RouteLabel>,
    pub click: Option<ClickAction>,
}

/// Open popup of a layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Popup {
    pub segment: usize,
    pub anchor: walkers::Position,
}

/// Aggregate layer of one rendered dataset
#[derive(Debug, Default)]
pub struct GeoJsonLayer {
    pub segments: Vec<DrawnSegment>,
    pub popup: Option<Popup>,
    /// Where the user clicked last; used to place the next popup
    pub click_anchor: Option<walkers::Position>,
}

impl GeoJsonLayer {
    pub fn close_popup(&mut self) {
        self.popup = None;
        self.click_anchor = None;
    }
}

pub type SharedLayer = Arc<RwLock<GeoJsonLayer>>;

/// Handle to a segment of a [`GeoJsonLayer`]
#[derive(Debug, Clone)]
pub struct SegmentRef {
    pub layer: SharedLayer,
    pub index: usize,
}

impl SegmentRef {
    fn with_segment(&self, f: impl FnOnce(&mut DrawnSegment)) {
        match self.layer.write() {
            Ok(mut layer) => {
                if let Some(segment) = layer.segments.get_mut(self.index) {
                    f(segment);
                }
            }
            Err(_) => tracing::warn!("Layer lock poisoned, dropping update of segment {}", self.index),
        }
    }
}

impl SegmentHandle for SegmentRef {
    fn set_style(&self, style: &SegmentStyle) -> Result<(), StyleError> {
        let mut layer = self.layer.write().map_err(|_| StyleError::Poisoned)?;
        let segment = layer
            .segments
            .get_mut(self.index)
            .ok_or(StyleError::Detached)?;
        segment.style = *style;
        Ok(())
    }

    fn bind_label(&self, label: RouteLabel) {
        self.with_segment(|segment| segment.label = Some(label));
    }

    fn bind_click(&self, action: ClickAction) {
        self.with_segment(|segment| segment.click = Some(action));
    }

    fn open_label(&self) {
        let Ok(mut layer) = self.layer.write() else {
            return;
        };
        let Some(segment) = layer.segments.get(self.index) else {
            return;
        };

        // Fall back to the segment's first vertex when the open was not triggered by a click
        let first_vertex = segment
            .lines
            .first()
            .and_then(|line| line.0.first())
            .map(|c| walkers::lat_lon(c.y, c.x));

        if let Some(anchor) = layer.click_anchor.take().or(first_vertex) {
            layer.popup = Some(Popup {
                segment: self.index,
                anchor,
            });
        }
    }
}

/// Draws every feature with a usable geometry into a fresh [`GeoJsonLayer`]
#[derive(Debug, Default)]
pub struct LayerDrawer;

impl SegmentDrawer for LayerDrawer {
    type Segment = SegmentRef;
    type Layer = SharedLayer;

    fn draw(
        &mut self,
        collection: &FeatureCollection,
        style: &dyn Fn(&Feature) -> SegmentStyle,
        on_each: &mut dyn FnMut(&Feature, &Self::Segment),
    ) -> SharedLayer {
        profiling::scope!("LayerDrawer::draw");

        let mut drawn_features = Vec::new();
        let mut segments = Vec::new();
        for feature in &collection.features {
            let lines = utils::feature_lines(feature);
            if lines.is_empty() {
                continue;
            }
            segments.push(DrawnSegment {
                lines,
                style: style(feature),
                label: None,
                click: None,
            });
            drawn_features.push(feature);
        }

        let skipped = collection.features.len() - drawn_features.len();
        if skipped > 0 {
            tracing::debug!("Skipped {} features without drawable geometry", skipped);
        }

        let layer: SharedLayer = Arc::new(RwLock::new(GeoJsonLayer {
            segments,
            ..Default::default()
        }));
        for (index, feature) in drawn_features.into_iter().enumerate() {
            let segment = SegmentRef {
                layer: layer.clone(),
                index,
            };
            on_each(feature, &segment);
        }
        layer
    }
}
