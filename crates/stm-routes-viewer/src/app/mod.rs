//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map view with the route overlay drawn on top
//! - Toggleable sidebar with dataset status, layer control and route list
//! - Click a segment to highlight its route, Esc to clear

pub(crate) mod layer;
pub(crate) mod layers;
mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::plugin::{ClickSlot, RoutesPlugin};
use crate::app::settings::Settings;
use crate::app::state::{AppState, TilesProvider, UiSettings};
use eframe::egui;
use std::sync::{Arc, RwLock};
use stm_routes_lib::BootHooks;
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// Persisted settings (UI only, the dataset is always fetched again)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    sidebar_open: bool,
    tiles_provider: String,
    route_filter: String,
}

/// Montréal, where the map opens before the dataset arrives
const MONTREAL: (f64, f64) = (45.5019, -73.5674);

/// Main application structure
pub struct StmRoutesApp {
    /// Application state (overlay, layers, loader, UI settings)
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Setups waiting for the map to be shown once
    boot: BootHooks<AppState>,

    /// Click reported by the map plugin during the last frame
    clicks: ClickSlot,
}

impl StmRoutesApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let ui_settings = if cli_args.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            UiSettings::default()
        } else {
            cc.storage
                .map(Self::load_persisted_settings)
                .unwrap_or_default()
        };

        let mut state = AppState::new(&cli_args);
        state.ui_settings = ui_settings;
        state.egui_ctx = Some(cc.egui_ctx.clone());

        // The load needs a map to draw into, so it waits for the first frame
        let mut boot = BootHooks::new();
        boot.register(&mut state, |state: &mut AppState| {
            state.start_load();
        });

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());

        let mut map_memory = MapMemory::default();
        map_memory.center_at(walkers::lat_lon(MONTREAL.0, MONTREAL.1));
        let _ = map_memory.set_zoom(11.0);

        tracing::info!("Initialized, dataset source: {}", state.loader.source);

        Self {
            state,
            tiles_osm,
            tiles_otm,
            map_memory,
            boot,
            clicks: Arc::new(RwLock::new(None)),
        }
    }

    /// Load persisted UI settings from storage
    fn load_persisted_settings(storage: &dyn eframe::Storage) -> UiSettings {
        if let Some(json) = storage.get_string("persisted_settings")
            && !json.is_empty()
            && let Ok(settings) = serde_json::from_str::<PersistedSettings>(&json)
        {
            tracing::info!("Restored UI settings");
            return UiSettings {
                tiles_provider: TilesProvider::from_name(&settings.tiles_provider),
                sidebar_open: settings.sidebar_open,
                route_filter: settings.route_filter,
            };
        }

        tracing::info!("No persisted settings found, starting fresh");
        UiSettings::default()
    }

    /// Fit the map view to the bounds of the last render
    fn fit_to_bounds(&mut self) {
        let Some(bounds) = self.state.last_render.as_ref().and_then(|r| r.bounds) else {
            return;
        };

        let center = bounds.center();
        let max_span = bounds.width().max(bounds.height()).abs();
        let zoom = if max_span > 0.0 {
            let zoom_estimate = (4.0 * 360.0 / max_span).log2() as f32;
            (zoom_estimate - 0.5).clamp(1.0, 18.0)
        } else {
            14.0
        };

        self.map_memory.center_at(walkers::lat_lon(center.y, center.x));
        let _ = self.map_memory.set_zoom(zoom as f64);

        tracing::trace!(
            "Auto-zoomed to bounds: {:?} - {:?}, zoom: {:.1}",
            bounds.min(),
            bounds.max(),
            zoom
        );
    }

    /// Take the click the plugin reported, if any
    fn take_click(&self) -> Option<plugin::MapClick> {
        match self.clicks.write() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        }
    }
}

#[profiling::all_functions]
impl eframe::App for StmRoutesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // The map is shown from this frame on; run deferred setups
        self.boot.signal_ready(&mut self.state);

        if self.state.process_load_result() {
            ctx.request_repaint();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.state.clear_selection();
        }

        if self.state.pending_fit_bounds {
            self.state.pending_fit_bounds = false;
            self.fit_to_bounds();
        }

        ui_panels::render_sidebar(ctx, &mut self.state);

        let layers = self.state.layers.visible_layers();
        let tiles_provider = self.state.ui_settings.tiles_provider;
        let attribution_text = tiles_provider.attribution();
        let clicks = self.clicks.clone();

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let routes_plugin = RoutesPlugin::new(layers, clicks);

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(MONTREAL.0, MONTREAL.1),
                )
                .with_plugin(routes_plugin);

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        // Clicks are dispatched after drawing so no layer lock is held while restyling
        if let Some(click) = self.take_click() {
            self.state.handle_map_click(click);
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            sidebar_open: self.state.ui_settings.sidebar_open,
            tiles_provider: self.state.ui_settings.tiles_provider.name().to_string(),
            route_filter: self.state.ui_settings.route_filter.clone(),
        };

        if let Ok(json) = serde_json::to_string(&settings) {
            storage.set_string("persisted_settings", json);
            tracing::debug!("Saved settings on exit");
        }
    }
}
