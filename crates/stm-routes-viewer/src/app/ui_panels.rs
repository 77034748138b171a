//! UI panels for the application
//!
//! The sidebar holds the dataset status, the layer control, the route list and the
//! map settings.

use crate::app::state::{AppState, LoadStatus, TilesProvider};
use egui::{RichText, Ui};

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());
    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the sidebar, if open
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    egui::SidePanel::right("main_sidebar")
        .default_width(300.0)
        .min_width(240.0)
        .max_width(450.0)
        .resizable(true)
        .show(ctx, |ui| {
            render_dataset_section(ui, state);
            ui.separator();
            render_layers_section(ui, state);
            ui.separator();
            render_routes_section(ui, state);
            ui.separator();
            render_settings_section(ui, state);
        });
}

fn render_dataset_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🚌 STM Routes");
    ui.label(
        RichText::new(state.loader.source.to_string())
            .small()
            .weak(),
    );
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        match &state.loader.status {
            LoadStatus::NotStarted => {
                ui.label("Waiting for map…");
            }
            LoadStatus::Loading => {
                ui.spinner();
                ui.label("Loading…");
            }
            LoadStatus::Loaded { features, millis } => {
                ui.label(format!("✔ {} features in {:.0} ms", features, millis));
            }
            LoadStatus::Failed(error) => {
                ui.label(RichText::new("⚠ Load failed").color(ui.visuals().warn_fg_color))
                    .on_hover_text(error);
            }
        }
    });

    ui.horizontal(|ui| {
        let reload = ui.add_enabled(!state.loader.is_loading(), egui::Button::new("⟳ Reload"));
        if reload.clicked() {
            state.start_load();
        }
        let fit = ui.add_enabled(
            state.last_render.as_ref().is_some_and(|r| r.bounds.is_some()),
            egui::Button::new("🎯 Fit to Bounds"),
        );
        if fit.clicked() {
            state.pending_fit_bounds = true;
        }
    });

    if let Some(summary) = &state.last_render {
        ui.label(format!(
            "{} segments, {} routes",
            summary.segments, summary.routes
        ));
        if summary.unindexed > 0 {
            ui.label(
                RichText::new(format!("{} segments without route id", summary.unindexed))
                    .small()
                    .weak(),
            );
        }
    }
}

fn render_layers_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("Layers").strong());
    if !state.layers.control_enabled() {
        ui.label(
            RichText::new(format!(
                "Layer control disabled, {} layer(s) attached to the map",
                state.layers.attached_count()
            ))
            .small()
            .weak(),
        );
    }
    for group in state.layers.groups_mut() {
        ui.checkbox(&mut group.visible, group.name.as_str());
    }
}

fn render_routes_section(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("Routes").strong());
        if let Some(active) = state.overlay.active_route() {
            ui.label(RichText::new(format!("({} selected)", active)).small());
        }
    });

    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut state.ui_settings.route_filter)
                .hint_text("Filter")
                .desired_width(160.0),
        );
        let clear = ui.add_enabled(
            state.overlay.active_route().is_some(),
            egui::Button::new("Clear"),
        );
        if clear.clicked() {
            state.clear_selection();
        }
    });

    let filter = state.ui_settings.route_filter.to_lowercase();
    let mut selected = state.overlay.active_route().map(str::to_string);
    let previous = selected.clone();

    egui::ScrollArea::vertical()
        .id_salt("routes_scroll")
        .auto_shrink([false, false])
        .max_height((ui.available_height() - 120.0).max(100.0))
        .show(ui, |ui| {
            for route_id in state.overlay.index().route_ids() {
                let title = route_title(state, route_id);
                if !filter.is_empty() && !title.to_lowercase().contains(&filter) {
                    continue;
                }
                ui.selectable_value(&mut selected, Some(route_id.to_string()), title);
            }
        });

    if selected != previous
        && let Some(route_id) = selected
    {
        state.select_route(&route_id);
    }
}

/// Popup title of a route's first segment
fn route_title(state: &AppState, route_id: &str) -> String {
    state
        .overlay
        .index()
        .get(route_id)
        .first()
        .and_then(|segment| {
            let layer = segment.layer.read().ok()?;
            let label = layer.segments.get(segment.index)?.label.as_ref()?;
            Some(label.title.clone())
        })
        .unwrap_or_else(|| route_id.to_string())
}

fn render_settings_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("Map").strong());
    egui::ComboBox::from_label("Tiles")
        .selected_text(state.ui_settings.tiles_provider.name())
        .show_ui(ui, |ui| {
            for provider in TilesProvider::all() {
                ui.selectable_value(
                    &mut state.ui_settings.tiles_provider,
                    *provider,
                    provider.name(),
                );
            }
        });
    ui.label(RichText::new("Esc clears the highlighted route").small().weak());
}
