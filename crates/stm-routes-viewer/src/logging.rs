//! Log output for the native binary

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER_DEBUG: &str =
    "debug,eframe::native=warn,hyper_util=info,walkers=info,egui::context=warn,reqwest::connect=info";
const DEFAULT_FILTER_RELEASE: &str = "info,eframe::native=warn,egui::context=warn";

/// Install the global subscriber: formatted output filtered by `RUST_LOG`, with a
/// default filter when it is unset.
pub fn setup_logging() {
    let default_filter = if cfg!(debug_assertions) {
        DEFAULT_FILTER_DEBUG
    } else {
        DEFAULT_FILTER_RELEASE
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(fmt::layer().with_filter(filter));
    if registry.try_init().is_err() {
        tracing::warn!("A global tracing subscriber was already installed");
    }
}
