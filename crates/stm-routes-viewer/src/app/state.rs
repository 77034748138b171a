//! Application state management
//!
//! This module owns the overlay together with the host collaborators it draws through,
//! and runs the asynchronous dataset load.

use crate::app::layer::{LayerDrawer, SegmentRef, SharedLayer};
use crate::app::layers::MapLayers;
use crate::app::plugin::MapClick;
use crate::app::settings::Settings;
use std::sync::Arc;
use stm_routes_lib::{
    DatasetSource, FeatureCollection, Overlay, OverlayConfig, OverlayError, RenderSummary,
    fetch_dataset,
};
use tokio::sync::RwLock;

/// Main application state
pub struct AppState {
    /// The route overlay: index, highlight state and current layer
    pub overlay: Overlay<SegmentRef, SharedLayer>,

    /// Layers on the map, with the layer control entries
    pub layers: MapLayers,

    pub drawer: LayerDrawer,

    /// Dataset loading state
    pub loader: DatasetLoader,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Summary of the last successful render
    pub last_render: Option<RenderSummary>,

    /// Zoom to the rendered dataset on the next frame
    pub pending_fit_bounds: bool,

    /// Used to wake the UI when a background load finishes
    pub egui_ctx: Option<egui::Context>,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Case-insensitive filter of the route list
    pub route_filter: String,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "OpenTopoMap" => Self::OpenTopoMap,
            _ => Self::OpenStreetMap,
        }
    }
}

/// Outcome of the most recent load, shown in the sidebar
#[derive(Clone, Debug, PartialEq)]
pub enum LoadStatus {
    NotStarted,
    Loading,
    Loaded { features: usize, millis: f64 },
    Failed(String),
}

/// Result of a background load, picked up by the UI loop
pub type LoadSlot = Arc<RwLock<Option<Result<FeatureCollection, OverlayError>>>>;

/// Dataset loading state and operations
pub struct DatasetLoader {
    /// Where the dataset is fetched from
    pub source: DatasetSource,

    pub status: LoadStatus,

    /// Filled by the load task, drained by [`AppState::process_load_result`]
    results: LoadSlot,

    started_at: Option<instant::Instant>,
}

impl DatasetLoader {
    pub fn new(source: DatasetSource) -> Self {
        Self {
            source,
            status: LoadStatus::NotStarted,
            results: Arc::new(RwLock::new(None)),
            started_at: None,
        }
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

impl AppState {
    /// Create new application state from CLI settings
    pub fn new(settings: &Settings) -> Self {
        Self::with_config(
            settings.overlay_config(),
            settings.source(),
            !settings.no_layer_control,
            UiSettings::default(),
        )
    }

    pub fn with_config(
        config: OverlayConfig,
        source: DatasetSource,
        layer_control: bool,
        ui_settings: UiSettings,
    ) -> Self {
        Self {
            overlay: Overlay::new(config),
            layers: MapLayers::new(layer_control),
            drawer: LayerDrawer,
            loader: DatasetLoader::new(source),
            ui_settings,
            last_render: None,
            pending_fit_bounds: false,
            egui_ctx: None,
        }
    }

    /// Fetch the dataset in the background.
    ///
    /// A load already in flight is not restarted. The result is applied by
    /// [`Self::process_load_result`] on a later frame.
    pub fn start_load(&mut self) -> Option<tokio::task::JoinHandle<()>> {
        if self.loader.is_loading() {
            tracing::debug!("Load already in progress, ignoring request");
            return None;
        }
        self.loader.status = LoadStatus::Loading;
        self.loader.started_at = Some(instant::Instant::now());

        let source = self.loader.source.clone();
        let results = self.loader.results.clone();
        let ctx = self.egui_ctx.clone();
        Some(tokio::spawn(async move {
            let result = fetch_dataset(&source).await;
            *results.write().await = Some(result);
            if let Some(ctx) = ctx {
                ctx.request_repaint();
            }
        }))
    }

    /// Apply a finished load, if there is one. Returns whether a result was processed.
    pub fn process_load_result(&mut self) -> bool {
        profiling::scope!("process_load_result");

        // Use try_write for non-blocking UI polling.
        let result = match self.loader.results.try_write() {
            Ok(mut slot) => slot.take(),
            Err(_) => return false,
        };
        let Some(result) = result else {
            return false;
        };

        let millis = self
            .loader
            .started_at
            .take()
            .map(|t| t.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or_default();
        let error = result.as_ref().err().map(ToString::to_string);

        match self
            .overlay
            .apply_load(result, &mut self.drawer, &mut self.layers)
        {
            Some(summary) => {
                self.loader.status = LoadStatus::Loaded {
                    features: summary.features,
                    millis,
                };
                self.pending_fit_bounds = summary.bounds.is_some();
                self.last_render = Some(summary);
            }
            None => {
                self.loader.status = LoadStatus::Failed(error.unwrap_or_default());
            }
        }
        true
    }

    /// Dispatch a map click to the overlay
    pub fn handle_map_click(&mut self, click: MapClick) {
        profiling::scope!("handle_map_click");

        match click {
            MapClick::Segment {
                layer,
                index,
                position,
            } => {
                // The layer lock must be released before the overlay restyles segments
                let action = {
                    let Ok(mut guard) = layer.write() else {
                        tracing::warn!("Layer lock poisoned, ignoring click");
                        return;
                    };
                    let Some(action) = guard.segments.get(index).and_then(|s| s.click.clone())
                    else {
                        return;
                    };
                    guard.click_anchor = Some(position);
                    action
                };

                self.close_popups_except(Some(&layer));
                let segment = SegmentRef { layer, index };
                let report = self.overlay.handle_click(&segment, &action);
                if !report.is_clean() {
                    tracing::warn!(
                        "{} of {} segments could not be restyled",
                        report.failures.len(),
                        report.attempted()
                    );
                }
            }
            MapClick::Empty => self.close_popups_except(None),
        }
    }

    /// Highlight a route picked from the sidebar
    pub fn select_route(&mut self, route_id: &str) {
        self.close_popups_except(None);
        self.overlay.highlight(route_id);
    }

    pub fn clear_selection(&mut self) {
        self.close_popups_except(None);
        self.overlay.clear_highlight();
    }

    fn close_popups_except(&self, keep: Option<&SharedLayer>) {
        for layer in self.layers.all_layers() {
            if keep.is_some_and(|keep| Arc::ptr_eq(keep, layer)) {
                continue;
            }
            if let Ok(mut guard) = layer.write() {
                guard.close_popup();
            }
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            route_filter: String::new(),
        }
    }
}
