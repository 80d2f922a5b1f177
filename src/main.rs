mod app;
mod config;
mod error;
mod upload;
mod utils;

use anyhow::{anyhow, Context};
use app::{HdrEmojiApp, WorkflowController};
use clap::Parser;
use config::Settings;
use eframe::CreationContext;
use tracing_subscriber::EnvFilter;
use upload::HdrClient;

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    init_tracing(&settings.log_filter);

    let client = HdrClient::new(&settings.server_url).context("invalid --server-url")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let controller = WorkflowController::new(client, runtime.handle().clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([420.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "HDR Emoji Maker",
        options,
        Box::new(move |cc: &CreationContext| Box::new(HdrEmojiApp::new(cc, controller))),
    )
    .map_err(|e| anyhow!("failed to open window: {e}"))?;

    Ok(())
}
