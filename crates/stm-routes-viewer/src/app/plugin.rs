//! Walkers plugin drawing the route overlay and hit-testing clicks
//!
//! The plugin is rebuilt every frame from the visible layers. It never mutates the
//! overlay itself: a click is reported through a shared slot and dispatched by the app
//! after the map has been drawn, so the layer locks are never held during restyling.

use crate::app::layer::{GeoJsonLayer, SharedLayer};
use egui::{Color32, Pos2, Stroke};
use std::sync::{Arc, RwLock};
use stm_routes_lib::SegmentStyle;
use walkers::{Plugin, Projector};

/// Extra pick distance around a stroke, in screen pixels
const CLICK_TOLERANCE: f32 = 6.0;

/// Result of a primary click on the map
#[derive(Debug, Clone)]
pub enum MapClick {
    /// The click landed on a segment
    Segment {
        layer: SharedLayer,
        index: usize,
        position: walkers::Position,
    },
    /// The click landed on empty map
    Empty,
}

/// Shared slot the plugin writes the frame's click into
pub type ClickSlot = Arc<RwLock<Option<MapClick>>>;

/// Plugin for drawing route segments and their popups
pub struct RoutesPlugin {
    layers: Vec<SharedLayer>,
    clicks: ClickSlot,
}

impl RoutesPlugin {
    pub fn new(layers: Vec<SharedLayer>, clicks: ClickSlot) -> Self {
        Self { layers, clicks }
    }

    /// Draw one layer and return its closest segment to `click`, if within tolerance
    fn draw_layer(
        layer: &GeoJsonLayer,
        projector: &Projector,
        painter: &egui::Painter,
        click: Option<Pos2>,
    ) -> Option<(f32, usize)> {
        let mut best: Option<(f32, usize)> = None;

        // Thicker (highlighted) strokes go on top
        let mut order: Vec<usize> = (0..layer.segments.len()).collect();
        order.sort_by(|&a, &b| {
            layer.segments[a]
                .style
                .weight
                .total_cmp(&layer.segments[b].style.weight)
        });

        for index in order {
            let segment = &layer.segments[index];
            let stroke = to_stroke(&segment.style);

            for line in &segment.lines {
                let points: Vec<Pos2> = line
                    .coords()
                    .map(|c| project(projector, walkers::lat_lon(c.y, c.x)))
                    .collect();

                match points.as_slice() {
                    [] => continue,
                    [single] => {
                        painter.circle_filled(*single, stroke.width + 1.0, stroke.color);
                    }
                    _ => {
                        painter.add(egui::Shape::line(points.clone(), stroke));
                    }
                }

                if let Some(click) = click {
                    let distance = distance_to_polyline(click, &points);
                    let tolerance = stroke.width / 2.0 + CLICK_TOLERANCE;
                    if distance <= tolerance && best.is_none_or(|(d, _)| distance < d) {
                        best = Some((distance, index));
                    }
                }
            }
        }

        best
    }

    /// Draw the open popup of a layer, if any
    fn draw_popup(layer: &GeoJsonLayer, projector: &Projector, ui: &egui::Ui) {
        let Some(popup) = layer.popup else {
            return;
        };
        let Some(label) = layer
            .segments
            .get(popup.segment)
            .and_then(|segment| segment.label.as_ref())
        else {
            return;
        };

        let painter = ui.painter();
        let text_color = ui.visuals().text_color();
        let title = painter.layout_no_wrap(
            label.title.clone(),
            egui::FontId::proportional(14.0),
            text_color,
        );
        let attribution = painter.layout_no_wrap(
            label.attribution.clone(),
            egui::FontId::proportional(10.0),
            ui.visuals().weak_text_color(),
        );

        let padding = egui::vec2(8.0, 6.0);
        let size = egui::vec2(
            title.size().x.max(attribution.size().x),
            title.size().y + attribution.size().y + 2.0,
        ) + padding * 2.0;

        // Popup sits above its anchor, centered horizontally
        let anchor = project(projector, popup.anchor);
        let rect = egui::Rect::from_min_size(
            anchor - egui::vec2(size.x / 2.0, size.y + 10.0),
            size,
        );

        painter.rect_filled(rect, 5.0, ui.visuals().window_fill);
        let title_pos = rect.min + padding;
        let attribution_pos = title_pos + egui::vec2(0.0, title.size().y + 2.0);
        painter.galley(title_pos, title, text_color);
        painter.galley(attribution_pos, attribution, text_color);
    }
}

impl Plugin for RoutesPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RoutesPlugin::run");

        let click = if response.clicked() {
            response.interact_pointer_pos()
        } else {
            None
        };

        let mut hit: Option<(f32, SharedLayer, usize)> = None;
        {
            profiling::scope!("draw_segments");
            let painter = ui.painter();
            for layer in &self.layers {
                let Ok(guard) = layer.read() else {
                    continue;
                };
                if let Some((distance, index)) = Self::draw_layer(&guard, projector, painter, click)
                    && hit.as_ref().is_none_or(|(d, _, _)| distance < *d)
                {
                    hit = Some((distance, layer.clone(), index));
                }
            }
        }

        for layer in &self.layers {
            if let Ok(guard) = layer.read() {
                Self::draw_popup(&guard, projector, ui);
            }
        }

        if let Some(pos) = click {
            let outcome = match hit {
                Some((_, layer, index)) => MapClick::Segment {
                    layer,
                    index,
                    position: projector.unproject(pos.to_vec2()),
                },
                None => MapClick::Empty,
            };
            match self.clicks.write() {
                Ok(mut slot) => *slot = Some(outcome),
                Err(_) => tracing::warn!("Click slot poisoned, dropping click"),
            }
        }
    }
}

/// Convert a WGS84 position to screen space
fn project(projector: &Projector, position: walkers::Position) -> Pos2 {
    let screen_vec = projector.project(position);
    Pos2::new(screen_vec.x, screen_vec.y)
}

/// Screen stroke of a segment style
pub fn to_stroke(style: &SegmentStyle) -> Stroke {
    let color = Color32::from_rgba_unmultiplied(
        style.color.r,
        style.color.g,
        style.color.b,
        style.alpha(),
    );
    Stroke::new(style.weight, color)
}

/// Shortest distance from `p` to a polyline (or to a single point)
pub fn distance_to_polyline(p: Pos2, points: &[Pos2]) -> f32 {
    match points {
        [] => f32::INFINITY,
        [single] => p.distance(*single),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f32::INFINITY, f32::min),
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
