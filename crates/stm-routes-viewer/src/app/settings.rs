use clap::Parser;
use std::path::PathBuf;
use stm_routes_lib::{DEFAULT_DATASET_URL, DatasetSource, OverlayConfig};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// STM Routes Viewer - Montréal bus routes on an interactive map, click a route to highlight it
pub struct Settings {
    /// GeoJSON dataset URL
    #[clap(short, long, default_value = DEFAULT_DATASET_URL)]
    pub url: String,

    /// Load the dataset from a local file instead of the URL
    #[clap(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Name of the overlay in the layer control
    #[clap(long, default_value = "STM Routes (Local)")]
    pub layer_name: String,

    /// Run without a layer control; the overlay is attached straight to the map
    #[clap(long, default_value = "false")]
    pub no_layer_control: bool,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse the command line, exiting with clap's message on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Where to load the dataset from; a file takes precedence over the URL
    pub fn source(&self) -> DatasetSource {
        match &self.file {
            Some(path) => DatasetSource::File(path.clone()),
            None => DatasetSource::Url(self.url.clone()),
        }
    }

    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            layer_name: self.layer_name.clone(),
            ..OverlayConfig::default()
        }
    }
}
