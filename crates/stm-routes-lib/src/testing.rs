//! Recording fakes of the host collaborators, shared by the unit tests

use crate::{
    ClickAction, FeatureCollection, HostError, LayerRegistry, RouteLabel, SegmentDrawer,
    SegmentHandle, SegmentStyle, StyleError,
};
use geojson::Feature;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct FakeSegmentState {
    pub style: Option<SegmentStyle>,
    pub style_calls: usize,
    pub label: Option<RouteLabel>,
    pub click: Option<ClickAction>,
    pub label_open: bool,
    /// When set, `set_style` fails with this error
    pub fail_with: Option<StyleError>,
}

/// Segment handle sharing its state with the drawer that created it
#[derive(Debug, Clone, Default)]
pub struct FakeSegment(pub Rc<RefCell<FakeSegmentState>>);

impl FakeSegment {
    pub fn style(&self) -> Option<SegmentStyle> {
        self.0.borrow().style
    }

    pub fn fail_with(&self, error: StyleError) {
        self.0.borrow_mut().fail_with = Some(error);
    }

    pub fn click(&self) -> Option<ClickAction> {
        self.0.borrow().click.clone()
    }
}

impl SegmentHandle for FakeSegment {
    fn set_style(&self, style: &SegmentStyle) -> Result<(), StyleError> {
        let mut state = self.0.borrow_mut();
        state.style_calls += 1;
        if let Some(error) = state.fail_with.clone() {
            return Err(error);
        }
        state.style = Some(*style);
        Ok(())
    }

    fn bind_label(&self, label: RouteLabel) {
        self.0.borrow_mut().label = Some(label);
    }

    fn bind_click(&self, action: ClickAction) {
        self.0.borrow_mut().click = Some(action);
    }

    fn open_label(&self) {
        self.0.borrow_mut().label_open = true;
    }
}

/// Layer produced by [`FakeDrawer`]: an id plus the segments drawn into it
#[derive(Debug, Clone)]
pub struct FakeLayer {
    pub id: usize,
    pub segments: Vec<FakeSegment>,
}

/// Drawer creating one segment per feature that has a geometry
#[derive(Debug, Default)]
pub struct FakeDrawer {
    pub layers_drawn: usize,
    /// Every segment ever drawn, in drawing order
    pub segments: Vec<FakeSegment>,
}

impl SegmentDrawer for FakeDrawer {
    type Segment = FakeSegment;
    type Layer = FakeLayer;

    fn draw(
        &mut self,
        collection: &FeatureCollection,
        style: &dyn Fn(&Feature) -> SegmentStyle,
        on_each: &mut dyn FnMut(&Feature, &Self::Segment),
    ) -> Self::Layer {
        let mut layer = FakeLayer {
            id: self.layers_drawn,
            segments: Vec::new(),
        };
        self.layers_drawn += 1;

        for feature in &collection.features {
            if feature.geometry.is_none() {
                continue;
            }
            let segment = FakeSegment::default();
            segment.0.borrow_mut().style = Some(style(feature));
            on_each(feature, &segment);
            layer.segments.push(segment.clone());
            self.segments.push(segment);
        }
        layer
    }
}

/// Layer registry recording every call
#[derive(Debug, Default)]
pub struct FakeRegistry {
    /// Registered groups: (name, layer id, visible)
    pub groups: Vec<(String, usize, bool)>,
    /// Layers attached directly to the map
    pub attached: Vec<usize>,
    pub removed: Vec<usize>,
    pub fail_add: bool,
    pub fail_remove: bool,
}

impl LayerRegistry<FakeLayer> for FakeRegistry {
    fn add_layer_group(
        &mut self,
        name: &str,
        layer: FakeLayer,
        visible: bool,
    ) -> Result<(), HostError> {
        if self.fail_add {
            return Err(HostError::LayerControlUnavailable);
        }
        self.groups.push((name.to_string(), layer.id, visible));
        Ok(())
    }

    fn attach(&mut self, layer: FakeLayer) {
        self.attached.push(layer.id);
    }

    fn remove_layer(&mut self, layer: &FakeLayer) -> Result<(), HostError> {
        if self.fail_remove {
            return Err(HostError::UnknownLayer);
        }
        self.removed.push(layer.id);
        self.groups.retain(|(_, id, _)| *id != layer.id);
        self.attached.retain(|id| *id != layer.id);
        Ok(())
    }
}

/// A line feature with the given properties
pub fn line_feature(properties: serde_json::Value, offset: f64) -> Feature {
    let geometry = geojson::Geometry::new(geojson::Value::LineString(vec![
        vec![-73.60 + offset, 45.50],
        vec![-73.58 + offset, 45.52],
    ]));
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: properties.as_object().cloned(),
        foreign_members: None,
    }
}

pub fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Three routes: "10" twice, "24" once, "51" (legacy fields) once, plus one unnamed line
pub fn sample_collection() -> FeatureCollection {
    collection(vec![
        line_feature(json!({"route_id": "10", "route_long_name": "Crémazie"}), 0.0),
        line_feature(json!({"route_id": "24", "route_long_name": "Sherbrooke"}), 0.1),
        line_feature(json!({"route_id": "10", "route_long_name": "Crémazie"}), 0.2),
        line_feature(json!({"NO_LIG": "51", "NOM_LIG": "Edouard-Montpetit"}), 0.3),
        line_feature(json!({"description": "depot access"}), 0.4),
    ])
}
