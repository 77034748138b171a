//! Single-route highlight state machine
//!
//! At most one route is highlighted. Every transition restyles through the
//! [`RouteIndex`], so the index is the only source of truth for which segments
//! belong to the active route.
//!
//! Styling is best-effort: a segment that refuses a style is logged and recorded in the
//! returned [`StyleReport`], and the remaining segments are still processed.

use crate::{RouteIndex, SegmentHandle, SegmentStyle, StyleError, StyleKind, StylePresets};

/// Current highlight state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HighlightState {
    #[default]
    Idle,
    Highlighted(String),
}

impl HighlightState {
    /// The highlighted route id, if any
    pub fn active_route(&self) -> Option<&str> {
        match self {
            HighlightState::Idle => None,
            HighlightState::Highlighted(route_id) => Some(route_id),
        }
    }
}

/// One segment that could not be restyled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleFailure {
    pub route_id: String,
    /// Position of the segment within its route
    pub position: usize,
    pub kind: StyleKind,
    pub error: StyleError,
}

/// Outcome of a restyling pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleReport {
    /// Segments successfully restyled
    pub styled: usize,
    pub failures: Vec<StyleFailure>,
}

impl StyleReport {
    /// True when every attempted segment accepted its style
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of segments touched, successfully or not
    #[inline]
    pub fn attempted(&self) -> usize {
        self.styled + self.failures.len()
    }

    fn merge(&mut self, other: StyleReport) {
        self.styled += other.styled;
        self.failures.extend(other.failures);
    }
}

/// Tracks the active route and restyles segments on every transition
#[derive(Debug, Default)]
pub struct Highlighter {
    state: HighlightState,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    #[inline]
    pub fn active_route(&self) -> Option<&str> {
        self.state.active_route()
    }

    /// Forget the active route without touching any segment.
    ///
    /// Only valid when the segments it styled are gone, i.e. right after the index has
    /// been discarded for a new render.
    pub(crate) fn reset(&mut self) {
        self.state = HighlightState::Idle;
    }

    /// Return the active route (if any) to the default style and go `Idle`.
    ///
    /// A route id that is no longer indexed simply has no segments to restore.
    pub fn clear<S: SegmentHandle>(
        &mut self,
        index: &RouteIndex<S>,
        presets: &StylePresets,
    ) -> StyleReport {
        let HighlightState::Highlighted(route_id) = std::mem::take(&mut self.state) else {
            return StyleReport::default();
        };

        tracing::debug!("Clearing highlight of route {}", route_id);
        apply_style(&route_id, index.get(&route_id), presets, StyleKind::Default)
    }

    /// Highlight every segment of `route_id`, clearing the previous route first.
    ///
    /// Empty or unknown route ids leave the state untouched. Highlighting the route that
    /// is already active clears and reapplies it, which ends in the same styles.
    pub fn highlight<S: SegmentHandle>(
        &mut self,
        route_id: &str,
        index: &RouteIndex<S>,
        presets: &StylePresets,
    ) -> StyleReport {
        if route_id.is_empty() || !index.contains(route_id) {
            tracing::trace!("Ignoring highlight of unknown route {:?}", route_id);
            return StyleReport::default();
        }

        let mut report = self.clear(index, presets);
        self.state = HighlightState::Highlighted(route_id.to_string());

        let segments = index.get(route_id);
        tracing::debug!(
            "Highlighting route {} ({} segments)",
            route_id,
            segments.len()
        );
        report.merge(apply_style(
            route_id,
            segments,
            presets,
            StyleKind::Highlighted,
        ));
        report
    }
}

/// Style every segment, collecting failures instead of stopping at the first one
fn apply_style<S: SegmentHandle>(
    route_id: &str,
    segments: &[S],
    presets: &StylePresets,
    kind: StyleKind,
) -> StyleReport {
    let style: &SegmentStyle = presets.get(kind);
    let mut report = StyleReport::default();

    for (position, segment) in segments.iter().enumerate() {
        match segment.set_style(style) {
            Ok(()) => report.styled += 1,
            Err(error) => {
                tracing::error!(
                    "Failed to apply {:?} style to segment {} of route {}: {}",
                    kind,
                    position,
                    route_id,
                    error
                );
                report.failures.push(StyleFailure {
                    route_id: route_id.to_string(),
                    position,
                    kind,
                    error,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSegment;

    fn build_index() -> (RouteIndex<FakeSegment>, Vec<FakeSegment>) {
        let segments: Vec<FakeSegment> = (0..5).map(|_| FakeSegment::default()).collect();
        for segment in &segments {
            segment.set_style(&SegmentStyle::DEFAULT).unwrap();
        }

        let mut index = RouteIndex::new();
        index.add("10", segments[0].clone());
        index.add("10", segments[1].clone());
        index.add("24", segments[2].clone());
        index.add("51", segments[3].clone());
        index.add("51", segments[4].clone());
        (index, segments)
    }

    fn styles(segments: &[FakeSegment]) -> Vec<Option<SegmentStyle>> {
        segments.iter().map(FakeSegment::style).collect()
    }

    #[test]
    fn test_highlight_styles_route() {
        let (index, segments) = build_index();
        let presets = StylePresets::default();
        let mut highlighter = Highlighter::new();

        let report = highlighter.highlight("10", &index, &presets);

        assert_eq!(highlighter.active_route(), Some("10"));
        assert_eq!(report.styled, 2);
        assert!(report.is_clean());
        assert_eq!(segments[0].style(), Some(SegmentStyle::HIGHLIGHTED));
        assert_eq!(segments[1].style(), Some(SegmentStyle::HIGHLIGHTED));
        assert_eq!(segments[2].style(), Some(SegmentStyle::DEFAULT));
    }

    #[test]
    fn test_switching_routes_is_exclusive() {
        let (index, segments) = build_index();
        let presets = StylePresets::default();
        let mut highlighter = Highlighter::new();

        highlighter.highlight("10", &index, &presets);
        let before_third = segments[2].0.borrow().style_calls;
        highlighter.highlight("51", &index, &presets);

        assert_eq!(highlighter.state(), &HighlightState::Highlighted("51".into()));
        assert_eq!(segments[0].style(), Some(SegmentStyle::DEFAULT));
        assert_eq!(segments[1].style(), Some(SegmentStyle::DEFAULT));
        assert_eq!(segments[3].style(), Some(SegmentStyle::HIGHLIGHTED));
        assert_eq!(segments[4].style(), Some(SegmentStyle::HIGHLIGHTED));
        // Route 24 was never touched
        assert_eq!(segments[2].0.borrow().style_calls, before_third);
    }

    #[test]
    fn test_rehighlight_is_idempotent() {
        let (index, segments) = build_index();
        let presets = StylePresets::default();
        let mut highlighter = Highlighter::new();

        highlighter.highlight("10", &index, &presets);
        let once = styles(&segments);
        let report = highlighter.highlight("10", &index, &presets);

        assert_eq!(styles(&segments), once);
        assert_eq!(highlighter.active_route(), Some("10"));
        // Cleared and reapplied, not short-circuited
        assert_eq!(report.styled, 4);
    }

    #[test]
    fn test_clear_when_idle_is_noop() {
        let (index, segments) = build_index();
        let presets = StylePresets::default();
        let mut highlighter = Highlighter::new();

        let before: Vec<usize> = segments.iter().map(|s| s.0.borrow().style_calls).collect();
        let report = highlighter.clear(&index, &presets);
        let after: Vec<usize> = segments.iter().map(|s| s.0.borrow().style_calls).collect();

        assert_eq!(report, StyleReport::default());
        assert_eq!(before, after);
        assert_eq!(highlighter.state(), &HighlightState::Idle);
    }

    #[test]
    fn test_clear_restores_default() {
        let (index, segments) = build_index();
        let presets = StylePresets::default();
        let mut highlighter = Highlighter::new();

        highlighter.highlight("24", &index, &presets);
        let report = highlighter.clear(&index, &presets);

        assert_eq!(report.styled, 1);
        assert_eq!(highlighter.active_route(), None);
        assert!(styles(&segments).iter().all(|s| *s == Some(SegmentStyle::DEFAULT)));
    }

    #[test]
    fn test_unknown_or_empty_route_is_ignored() {
        let (index, segments) = build_index();
        let presets = StylePresets::default();
        let mut highlighter = Highlighter::new();

        highlighter.highlight("10", &index, &presets);
        assert_eq!(highlighter.highlight("", &index, &presets).attempted(), 0);
        assert_eq!(highlighter.highlight("999", &index, &presets).attempted(), 0);

        // The previous highlight survives
        assert_eq!(highlighter.active_route(), Some("10"));
        assert_eq!(segments[0].style(), Some(SegmentStyle::HIGHLIGHTED));
    }

    #[test]
    fn test_failing_segment_does_not_block_others() {
        let (index, segments) = build_index();
        let presets = StylePresets::default();
        let mut highlighter = Highlighter::new();

        segments[3].fail_with(StyleError::Detached);
        let report = highlighter.highlight("51", &index, &presets);

        assert_eq!(highlighter.active_route(), Some("51"));
        assert_eq!(report.styled, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].position, 0);
        assert_eq!(report.failures[0].kind, StyleKind::Highlighted);
        assert_eq!(segments[4].style(), Some(SegmentStyle::HIGHLIGHTED));
    }

    #[test]
    fn test_clear_tolerates_discarded_route() {
        let (mut index, _segments) = build_index();
        let presets = StylePresets::default();
        let mut highlighter = Highlighter::new();

        highlighter.highlight("10", &index, &presets);
        index.clear();
        let report = highlighter.clear(&index, &presets);

        assert_eq!(report.attempted(), 0);
        assert_eq!(highlighter.state(), &HighlightState::Idle);
    }
}
