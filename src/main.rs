mod app;
mod config;
mod error;
mod selection;
mod upload;

use app::QuestionSetUploader;
use config::AppConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), eframe::Error> {
    init_tracing();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        warn!("Ignoring configuration from environment: {}", e);
        AppConfig::default()
    });
    info!(
        "Server {}, request timeout {:?}",
        config.server_url, config.request_timeout
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([600.0, 600.0])
            .with_min_inner_size([400.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Question Set Uploader",
        options,
        Box::new(|cc| Box::new(QuestionSetUploader::new(cc, config))),
    )
}
