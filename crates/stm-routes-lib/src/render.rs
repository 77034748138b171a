//! Dataset rendering: drawing collaborators and the grouping of segments into routes

use crate::{
    ClickAction, FeatureCollection, HostError, Overlay, RouteLabel, RouteProperties,
    SegmentHandle, SegmentStyle, utils,
};
use geo::Rect;
use geojson::Feature;

/// Map-drawing collaborator
///
/// Draws a whole feature collection as one aggregate layer. For every feature it
/// actually draws, it calls `on_each` exactly once with the feature and the handle of
/// the segment created for it, in feature order.
pub trait SegmentDrawer {
    type Segment: SegmentHandle;
    type Layer: Clone;

    fn draw(
        &mut self,
        collection: &FeatureCollection,
        style: &dyn Fn(&Feature) -> SegmentStyle,
        on_each: &mut dyn FnMut(&Feature, &Self::Segment),
    ) -> Self::Layer;
}

/// Layer-registration collaborator
pub trait LayerRegistry<L> {
    /// Register a named, toggleable layer group with the host's layer control
    fn add_layer_group(&mut self, name: &str, layer: L, visible: bool) -> Result<(), HostError>;

    /// Put a layer straight on the map, bypassing the layer control
    fn attach(&mut self, layer: L);

    /// Take a layer off the map (and out of the layer control)
    fn remove_layer(&mut self, layer: &L) -> Result<(), HostError>;
}

/// What a render produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    /// Features in the collection
    pub features: usize,
    /// Segments the drawer created
    pub segments: usize,
    /// Distinct route ids indexed
    pub routes: usize,
    /// Drawn segments without a route id (not indexed)
    pub unindexed: usize,
    /// Lon/lat bounds of all drawn segments
    pub bounds: Option<Rect<f64>>,
}

impl<S, L> Overlay<S, L>
where
    S: SegmentHandle,
    L: Clone,
{
    /// Replace the displayed dataset with `collection`.
    ///
    /// The previous layer is removed (failures ignored), the index and highlight state
    /// are reset, every drawn feature is grouped by its route id, and the new layer is
    /// registered with the layer control, falling back to direct attachment.
    pub fn render<D, R>(
        &mut self,
        collection: &FeatureCollection,
        drawer: &mut D,
        registry: &mut R,
    ) -> RenderSummary
    where
        D: SegmentDrawer<Segment = S, Layer = L>,
        R: LayerRegistry<L>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("overlay::render");

        if let Some(previous) = self.layer.take()
            && let Err(e) = registry.remove_layer(&previous)
        {
            tracing::debug!("Ignoring failure to remove previous layer: {}", e);
        }

        self.index.clear();
        self.highlighter.reset();

        let mut summary = RenderSummary {
            features: collection.features.len(),
            ..Default::default()
        };

        let config = &self.config;
        let index = &mut self.index;
        let default_style = config.styles.default;

        let layer = drawer.draw(collection, &|_| default_style, &mut |feature, segment| {
            let properties = RouteProperties::from_feature(feature);
            let route_id = properties.route_id();

            summary.segments += 1;
            if !index.add(route_id, segment.clone()) {
                summary.unindexed += 1;
            }

            let bounds = utils::lines_bounds(&utils::feature_lines(feature));
            summary.bounds = match (summary.bounds, bounds) {
                (Some(a), Some(b)) => Some(utils::union(a, b)),
                (a, b) => a.or(b),
            };

            segment.bind_label(RouteLabel::new(
                route_id,
                properties.route_label(),
                &config.placeholder_title,
                &config.attribution,
            ));
            segment.bind_click(ClickAction {
                route_id: route_id.to_string(),
            });
        });
        summary.routes = self.index.route_count();

        if let Err(e) = registry.add_layer_group(&self.config.layer_name, layer.clone(), true) {
            tracing::error!("Layer control registration failed ({}), attaching to map", e);
            registry.attach(layer.clone());
        }
        self.layer = Some(layer);

        tracing::info!(
            "Rendered {} segments across {} routes ({} without route id)",
            summary.segments,
            summary.routes,
            summary.unindexed
        );
        summary
    }
}
