//! Frontend module for the egui overlay
//!
//! Receives decoded updates from the ingress thread through crossbeam
//! channels, applies them to the [`DisplayState`] it owns, and draws the
//! readings label next to the power sparkline.
//!
//! # Window behavior
//!
//! The viewport is borderless, transparent and always on top. Once the
//! monitor size is known the window moves to the configured offset from the
//! bottom-left corner, and every raise interval it re-asserts its
//! always-on-top level so other windows cannot bury it.

pub mod widgets;

pub use widgets::{co2_color, PowerSparkline, ReadingsLabel};

use crate::backend::{BackendMessage, FrontendReceiver};
use crate::config::WindowConfig;
use crate::state::DisplayState;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Tracks when the window should re-assert always-on-top
#[derive(Debug, Clone)]
pub struct RaiseTimer {
    interval: Duration,
    last: Option<Instant>,
}

impl RaiseTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Whether a raise is due at `now`; marks it done if so
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Apply one backend message to the display state
///
/// Returns true if anything visible changed.
pub fn apply_backend_message(state: &mut DisplayState, msg: BackendMessage) -> bool {
    match msg {
        BackendMessage::Update(update) => {
            state.apply(update);
            true
        }
        BackendMessage::ConnectionStatus(status) => {
            tracing::info!("Broker connection: {}", status);
            state.connection = status;
            true
        }
        BackendMessage::PayloadError { topic, error } => {
            tracing::debug!("Payload on {} skipped: {}", topic, error);
            false
        }
        BackendMessage::Shutdown => {
            tracing::info!("Ingress backend shut down");
            false
        }
    }
}

/// Main application state for the overlay
pub struct OverlayApp {
    frontend: FrontendReceiver,
    state: DisplayState,
    window: WindowConfig,
    raise_timer: RaiseTimer,
    positioned: bool,
    backend_handle: Option<JoinHandle<()>>,
}

impl OverlayApp {
    pub fn new(frontend: FrontendReceiver, state: DisplayState, window: WindowConfig) -> Self {
        let raise_timer = RaiseTimer::new(window.raise_interval());
        Self {
            frontend,
            state,
            window,
            raise_timer,
            positioned: false,
            backend_handle: None,
        }
    }

    /// Join the ingress thread on exit
    pub fn with_backend_handle(mut self, handle: JoinHandle<()>) -> Self {
        self.backend_handle = Some(handle);
        self
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Drain and apply all pending backend messages
    ///
    /// Returns true if the display needs a redraw.
    pub fn process_backend_messages(&mut self) -> bool {
        let mut changed = false;
        for msg in self.frontend.drain() {
            changed |= apply_backend_message(&mut self.state, msg);
        }
        changed
    }

    fn position_window(&mut self, ctx: &egui::Context) {
        if self.positioned {
            return;
        }
        let Some(monitor) = ctx.input(|i| i.viewport().monitor_size) else {
            return;
        };

        let pos = egui::pos2(
            self.window.offset_x,
            (monitor.y - self.window.offset_from_bottom).max(0.0),
        );
        tracing::debug!("Placing overlay at {:?} on {:?} monitor", pos, monitor);
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(pos));
        self.positioned = true;
    }

    fn keep_on_top(&mut self, ctx: &egui::Context) {
        if self.raise_timer.poll(Instant::now()) {
            ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(
                egui::WindowLevel::AlwaysOnTop,
            ));
        }
        ctx.request_repaint_after(self.raise_timer.interval());
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.process_backend_messages() {
            ctx.request_repaint();
        }
        self.position_window(ctx);
        self.keep_on_top(ctx);

        let canvas = egui::vec2(
            self.window.canvas_width as f32,
            self.window.canvas_height as f32,
        );
        let samples = self.state.history_snapshot();

        egui::CentralPanel::default()
            .frame(egui::Frame::new().inner_margin(5.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add(ReadingsLabel::from_state(&self.state).font_size(self.window.font_size))
                        .on_hover_text(self.state.status_text());
                    ui.add(PowerSparkline::new(&samples, canvas));
                });
            });
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        tracing::info!("Overlay closing");
        if !self.frontend.shutdown() {
            tracing::debug!("Ingress backend already stopped");
        }
        if let Some(handle) = self.backend_handle.take() {
            if handle.join().is_err() {
                tracing::error!("Ingress thread panicked");
            }
        }
    }
}
