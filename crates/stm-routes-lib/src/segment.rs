//! Segment handles owned by the host's drawing layer

use crate::{SegmentStyle, StyleError};

/// A drawn segment, as handed out by the host's [`SegmentDrawer`](crate::SegmentDrawer)
///
/// Handles are cheap references into the host's layer; cloning one must not duplicate the
/// drawn geometry. Restyling goes through `&self` for the same reason.
pub trait SegmentHandle: Clone {
    /// Apply a stroke style to every line of the segment
    fn set_style(&self, style: &SegmentStyle) -> Result<(), StyleError>;

    /// Attach the popup label shown when the segment is clicked
    fn bind_label(&self, label: RouteLabel);

    /// Attach the action the host dispatches back to the overlay on click
    fn bind_click(&self, action: ClickAction);

    /// Show the previously bound label
    fn open_label(&self);
}

/// Click binding of a segment: which route to highlight
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClickAction {
    pub route_id: String,
}

/// Popup text of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLabel {
    /// Bold first line: route id and name
    pub title: String,
    /// Small second line: data source
    pub attribution: String,
}

impl RouteLabel {
    /// Build the label for a route.
    ///
    /// The title is the id followed by the name when both exist, whichever one exists
    /// otherwise, and `placeholder` when neither does.
    pub fn new(route_id: &str, route_label: &str, placeholder: &str, attribution: &str) -> Self {
        let title = match (route_id.is_empty(), route_label.is_empty()) {
            (false, false) => format!("{route_id} {route_label}"),
            (false, true) => route_id.to_string(),
            (true, false) => route_label.to_string(),
            (true, true) => placeholder.to_string(),
        };
        Self {
            title,
            attribution: attribution.to_string(),
        }
    }
}
