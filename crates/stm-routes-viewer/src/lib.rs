//! STM Routes Viewer - Application Library
//!
//! Hosts the route overlay from `stm-routes-lib` on a slippy map: the map draws the
//! overlay's segments, dispatches clicks back to it and lists its layer in a layer
//! control.

mod app;
mod logging;

pub use app::StmRoutesApp;

/// Native entry point
///
/// Must run inside a tokio runtime: the dataset load is spawned onto it.
pub async fn native_main(
    app_name: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>,
) {
    // Before any logging
    logging::setup_logging();

    tracing::info!("{} v{}", app_name, env!("CARGO_PKG_VERSION"));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(app_name),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        app_name,
        native_options,
        Box::new(move |cc| Ok(app_creator(cc))),
    ) {
        tracing::error!("Application exited with error: {}", e);
    }
}
