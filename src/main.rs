//! CO₂ & Power Overlay - Main Entry Point
//!
//! Starts the MQTT ingress thread and opens the borderless always-on-top
//! overlay window.

use co2_overlay::{
    config::{self, OverlayConfig},
    frontend::OverlayApp,
    state::DisplayState,
    types::HISTORY_CAPACITY,
    IngressBackend,
};
use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up stderr logging plus a daily log file in the app data directory
///
/// The returned guard must stay alive for buffered file output to be flushed.
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,co2_overlay=debug"));

    let file = match config::ensure_app_data_dir() {
        Ok(dir) => {
            let appender =
                tracing_appender::rolling::daily(dir.join(config::LOG_DIR), "overlay.log");
            Some(tracing_appender::non_blocking(appender))
        }
        Err(e) => {
            eprintln!("File logging disabled: {}", e);
            None
        }
    };

    let (file_layer, guard) = match file {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging();

    tracing::info!("Starting CO₂ & Power Overlay");

    let config = OverlayConfig::load_or_default();
    tracing::info!(
        "Broker {}:{} as {:?}",
        config.broker.host,
        config.broker.port,
        config.broker.client_id
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CO₂ & Power Overlay")
            .with_inner_size(config.window.inner_size())
            .with_position([config.window.offset_x, 0.0])
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_resizable(false)
            .with_taskbar(false),
        ..Default::default()
    };

    eframe::run_native(
        "CO₂ & Power Overlay",
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());

            let state = DisplayState::new(HISTORY_CAPACITY)?;

            let ctx = cc.egui_ctx.clone();
            let (backend, frontend) = IngressBackend::new(config.broker.clone());
            let backend = backend.with_repaint(move || ctx.request_repaint());
            let handle = std::thread::Builder::new()
                .name("mqtt-ingress".to_string())
                .spawn(move || backend.run())?;

            Ok(Box::new(
                OverlayApp::new(frontend, state, config.window.clone()).with_backend_handle(handle),
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
    .context("Overlay window failed")
}
