//! Map layer management: named overlay groups toggled from the sidebar, plus layers
//! attached straight to the map

use crate::app::layer::SharedLayer;
use std::sync::Arc;
use stm_routes_lib::{HostError, LayerRegistry};

/// A named overlay listed in the layer control
pub struct LayerGroup {
    pub name: String,
    pub layer: SharedLayer,
    pub visible: bool,
}

/// All overlays currently on the map
pub struct MapLayers {
    /// Whether the layer control exists; without it groups cannot be registered
    control_enabled: bool,
    groups: Vec<LayerGroup>,
    /// Layers shown unconditionally, without a layer control entry
    attached: Vec<SharedLayer>,
}

impl MapLayers {
    pub fn new(control_enabled: bool) -> Self {
        Self {
            control_enabled,
            groups: Vec::new(),
            attached: Vec::new(),
        }
    }

    #[inline]
    pub fn control_enabled(&self) -> bool {
        self.control_enabled
    }

    pub fn groups(&self) -> &[LayerGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [LayerGroup] {
        &mut self.groups
    }

    /// Number of layers attached outside the layer control
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Layers to draw this frame: visible groups, then attached layers
    pub fn visible_layers(&self) -> Vec<SharedLayer> {
        self.groups
            .iter()
            .filter(|group| group.visible)
            .map(|group| group.layer.clone())
            .chain(self.attached.iter().cloned())
            .collect()
    }

    /// Every layer on the map, visible or not
    pub fn all_layers(&self) -> impl Iterator<Item = &SharedLayer> {
        self.groups
            .iter()
            .map(|group| &group.layer)
            .chain(self.attached.iter())
    }
}

impl LayerRegistry<SharedLayer> for MapLayers {
    fn add_layer_group(
        &mut self,
        name: &str,
        layer: SharedLayer,
        visible: bool,
    ) -> Result<(), HostError> {
        if !self.control_enabled {
            return Err(HostError::LayerControlUnavailable);
        }
        if self.groups.iter().any(|group| group.name == name) {
            return Err(HostError::DuplicateGroup(name.to_string()));
        }

        tracing::debug!("Registered layer group {:?} (visible: {})", name, visible);
        self.groups.push(LayerGroup {
            name: name.to_string(),
            layer,
            visible,
        });
        Ok(())
    }

    fn attach(&mut self, layer: SharedLayer) {
        if !self.attached.iter().any(|l| Arc::ptr_eq(l, &layer)) {
            self.attached.push(layer);
        }
    }

    fn remove_layer(&mut self, layer: &SharedLayer) -> Result<(), HostError> {
        if let Some(pos) = self.groups.iter().position(|g| Arc::ptr_eq(&g.layer, layer)) {
            self.groups.remove(pos);
            return Ok(());
        }
        if let Some(pos) = self.attached.iter().position(|l| Arc::ptr_eq(l, layer)) {
            self.attached.remove(pos);
            return Ok(());
        }
        Err(HostError::UnknownLayer)
    }
}
