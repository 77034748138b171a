//! The overlay instance: one per host map, owned by the host's UI loop
//!
//! The host keeps a single [`Overlay`] and hands it out by `&mut` to its load and click
//! handlers. Because every transition needs exclusive access, no handler can observe a
//! half-built index or a half-applied highlight.

use crate::{
    ClickAction, FeatureCollection, HighlightState, Highlighter, LayerRegistry, OverlayError,
    RenderSummary, RouteIndex, SegmentDrawer, SegmentHandle, StylePresets, StyleReport,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Presentation settings of the overlay
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverlayConfig {
    /// Name of the layer group in the host's layer control
    pub layer_name: String,
    /// Popup title for segments with neither route id nor name
    pub placeholder_title: String,
    /// Second popup line naming the data source
    pub attribution: String,
    pub styles: StylePresets,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            layer_name: "STM Routes (Local)".to_string(),
            placeholder_title: "STM route".to_string(),
            attribution: "STM Open Data".to_string(),
            styles: StylePresets::default(),
        }
    }
}

/// Route index, highlight state and displayed layer of one map
pub struct Overlay<S, L> {
    pub(crate) config: OverlayConfig,
    pub(crate) index: RouteIndex<S>,
    pub(crate) highlighter: Highlighter,
    /// Layer installed by the last successful render
    pub(crate) layer: Option<L>,
}

impl<S, L> Overlay<S, L>
where
    S: SegmentHandle,
    L: Clone,
{
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            index: RouteIndex::new(),
            highlighter: Highlighter::new(),
            layer: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    #[inline]
    pub fn index(&self) -> &RouteIndex<S> {
        &self.index
    }

    #[inline]
    pub fn state(&self) -> &HighlightState {
        self.highlighter.state()
    }

    #[inline]
    pub fn active_route(&self) -> Option<&str> {
        self.highlighter.active_route()
    }

    /// The layer currently displayed, if any render succeeded
    #[inline]
    pub fn layer(&self) -> Option<&L> {
        self.layer.as_ref()
    }

    /// Highlight a route; see [`Highlighter::highlight`]
    pub fn highlight(&mut self, route_id: &str) -> StyleReport {
        self.highlighter
            .highlight(route_id, &self.index, &self.config.styles)
    }

    /// Return the active route to the default style
    pub fn clear_highlight(&mut self) -> StyleReport {
        self.highlighter.clear(&self.index, &self.config.styles)
    }

    /// Host-dispatched click on `segment`: highlight its route, then show its label
    pub fn handle_click(&mut self, segment: &S, action: &ClickAction) -> StyleReport {
        let report = self.highlight(&action.route_id);
        segment.open_label();
        report
    }

    /// Finish a load cycle.
    ///
    /// A parsed dataset replaces the current render. A failure is logged and leaves the
    /// current layer, index and highlight state untouched.
    pub fn apply_load<D, R>(
        &mut self,
        result: Result<FeatureCollection, OverlayError>,
        drawer: &mut D,
        registry: &mut R,
    ) -> Option<RenderSummary>
    where
        D: SegmentDrawer<Segment = S, Layer = L>,
        R: LayerRegistry<L>,
    {
        match result {
            Ok(collection) => Some(self.render(&collection, drawer, registry)),
            Err(e) => {
                tracing::error!("STM load error: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegmentStyle;
    use crate::testing::{FakeDrawer, FakeLayer, FakeRegistry, FakeSegment, sample_collection};

    fn rendered() -> (Overlay<FakeSegment, FakeLayer>, FakeDrawer, FakeRegistry) {
        let mut overlay = Overlay::new(OverlayConfig::default());
        let mut drawer = FakeDrawer::default();
        let mut registry = FakeRegistry::default();
        overlay.render(&sample_collection(), &mut drawer, &mut registry);
        (overlay, drawer, registry)
    }

    #[test]
    fn test_click_highlights_whole_route() {
        let (mut overlay, drawer, _) = rendered();

        // Clicking the second segment of route 10 highlights the first as well
        let clicked = &drawer.segments[2];
        let action = clicked.click().unwrap();
        let report = overlay.handle_click(clicked, &action);

        assert_eq!(overlay.active_route(), Some("10"));
        assert_eq!(report.styled, 2);
        assert_eq!(drawer.segments[0].style(), Some(SegmentStyle::HIGHLIGHTED));
        assert_eq!(drawer.segments[2].style(), Some(SegmentStyle::HIGHLIGHTED));
        assert_eq!(drawer.segments[1].style(), Some(SegmentStyle::DEFAULT));
        assert!(clicked.0.borrow().label_open);
        assert!(!drawer.segments[0].0.borrow().label_open);
    }

    #[test]
    fn test_click_on_unnamed_segment_only_opens_label() {
        let (mut overlay, drawer, _) = rendered();
        overlay.highlight("24");

        let unnamed = &drawer.segments[4];
        let action = unnamed.click().unwrap();
        let report = overlay.handle_click(unnamed, &action);

        assert_eq!(report.attempted(), 0);
        assert_eq!(overlay.active_route(), Some("24"));
        assert!(unnamed.0.borrow().label_open);
    }

    #[test]
    fn test_consecutive_clicks_switch_routes() {
        let (mut overlay, drawer, _) = rendered();

        for segment in [&drawer.segments[0], &drawer.segments[3], &drawer.segments[1]] {
            let action = segment.click().unwrap();
            overlay.handle_click(segment, &action);
        }

        assert_eq!(overlay.active_route(), Some("24"));
        let highlighted: Vec<bool> = drawer
            .segments
            .iter()
            .map(|s| s.style() == Some(SegmentStyle::HIGHLIGHTED))
            .collect();
        assert_eq!(highlighted, vec![false, true, false, false, false]);
    }

    #[test]
    fn test_failed_load_keeps_previous_render() {
        let (mut overlay, mut drawer, mut registry) = rendered();
        overlay.highlight("10");

        let error = OverlayError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "network down",
        ));
        let summary = overlay.apply_load(Err(error), &mut drawer, &mut registry);

        assert!(summary.is_none());
        assert_eq!(overlay.index().get("10").len(), 2);
        assert_eq!(overlay.active_route(), Some("10"));
        assert_eq!(overlay.layer().map(|l| l.id), Some(0));
        assert!(registry.removed.is_empty());
        assert_eq!(drawer.layers_drawn, 1);
    }

    #[test]
    fn test_successful_load_renders() {
        let mut overlay: Overlay<FakeSegment, FakeLayer> = Overlay::new(OverlayConfig::default());
        let mut drawer = FakeDrawer::default();
        let mut registry = FakeRegistry::default();

        let summary = overlay
            .apply_load(Ok(sample_collection()), &mut drawer, &mut registry)
            .unwrap();

        assert_eq!(summary.routes, 3);
        assert_eq!(overlay.state(), &HighlightState::Idle);
    }

    #[test]
    fn test_clear_highlight() {
        let (mut overlay, drawer, _) = rendered();
        overlay.highlight("51");
        let report = overlay.clear_highlight();

        assert_eq!(report.styled, 1);
        assert_eq!(overlay.active_route(), None);
        assert_eq!(drawer.segments[3].style(), Some(SegmentStyle::DEFAULT));
        assert!(overlay.clear_highlight().is_clean());
    }

    #[test]
    fn test_custom_config() {
        let config = OverlayConfig {
            layer_name: "Bus".into(),
            ..Default::default()
        };
        let overlay: Overlay<FakeSegment, FakeLayer> = Overlay::new(config);
        assert_eq!(overlay.config().layer_name, "Bus");
        assert_eq!(overlay.config().placeholder_title, "STM route");
    }
}
