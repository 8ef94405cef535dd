//! Platform layer: window, event loop and the egui host around one
//! configurator session.
//!
//! - No busy loop: redraws are requested only by input, resize or egui.
//! - Asset loading runs on the event-loop thread right after the first
//!   "Loading…" frame is on screen.
//! - Closing the window tears the session down before exiting.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow};
use asset::{AssetRegistry, FsSource, ModelLoader};
use configurator::{ConfiguratorSession, ConfiguratorView, UiAction};
use renderer::GpuState;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

mod egui_host;
mod ui;

use egui_host::EguiHost;

/// Startup configuration gathered from the command line.
#[derive(Clone, Debug)]
pub struct LaunchOptions {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    pub assets_dir: PathBuf,
    /// Overrides the registry's default wheel style.
    pub wheel: Option<String>,
    /// Overrides the registry's default colour id.
    pub color: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            width: 1280,
            height: 720,
            assets_dir: PathBuf::from("assets"),
            wheel: None,
            color: None,
        }
    }
}

impl LaunchOptions {
    /// Built-in registry with the command-line defaults applied.
    pub fn registry(&self) -> AssetRegistry {
        let mut registry = AssetRegistry::builtin();
        if let Some(wheel) = &self.wheel {
            registry.wheels.default = wheel.clone();
        }
        if let Some(color) = &self.color {
            registry.default_color = color.clone();
        }
        registry
    }
}

struct Running {
    window: Arc<Window>,
    egui: EguiHost,
    session: ConfiguratorSession<GpuState>,
    loader: ModelLoader<FsSource>,
    dragging: bool,
    panning: bool,
    cursor: Option<PhysicalPosition<f64>>,
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, opts: &LaunchOptions) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Car Configurator")
            .with_inner_size(PhysicalSize::new(opts.width, opts.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        let PhysicalSize { width, height } = window.inner_size();
        log::info!("Window created: {}x{}", width, height);

        let gpu = pollster::block_on(GpuState::new(window.clone(), opts.backends))?;
        let session = ConfiguratorSession::new(opts.registry(), gpu, width, height)
            .context("invalid asset registry")?;
        let loader = session.loader(FsSource::new(&opts.assets_dir));
        let egui = EguiHost::new(&window);

        let mut running = Self {
            window,
            egui,
            session,
            loader,
            dragging: false,
            panning: false,
            cursor: None,
        };
        running.frame();
        pollster::block_on(running.session.start(&running.loader));
        running.window.request_redraw();
        Ok(running)
    }

    /// Build the UI from the current view, hand it to the renderer and draw.
    /// Returns the actions the user triggered.
    fn frame(&mut self) -> Vec<UiAction> {
        let view = ConfiguratorView::of(&self.session);
        let mut actions = Vec::new();
        let overlay = self.egui.run_ui(&self.window, |ctx| {
            actions = ui::draw(ctx, &view);
        });
        self.session.scene_mut().surface_mut().set_overlay(overlay);
        self.session.redraw();
        actions
    }

    fn apply(&mut self, actions: Vec<UiAction>) {
        for action in actions {
            log::debug!("UI action: {:?}", action);
            if let Err(err) = pollster::block_on(self.session.handle(action, &self.loader)) {
                log::error!("{}", err);
            }
        }
    }

    fn grabs_pointer(&self, state: ElementState, consumed: bool) -> bool {
        state == ElementState::Pressed && !consumed && !self.egui.wants_pointer()
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        let egui = self.egui.on_window_event(&self.window, &event);
        if egui.repaint {
            self.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Tearing down.");
                self.session.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::info!("Resized: {}x{}", size.width, size.height);
                // The requested frame does the one redraw.
                self.session.resize_viewport(size.width, size.height);
                self.window.request_redraw();
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = self.grabs_pointer(state, egui.consumed);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => {
                self.panning = self.grabs_pointer(state, egui.consumed);
            }
            WindowEvent::MouseWheel { delta, .. } if !egui.consumed => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                if !self.session.zoom(steps) {
                    log::trace!("Zoom ignored ({} step(s))", steps);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last) = self.cursor {
                    let (dx, dy) = ((position.x - last.x) as f32, (position.y - last.y) as f32);
                    if self.dragging {
                        self.session.orbit(dx, dy);
                    } else if self.panning && !self.session.pan(dx, dy) {
                        log::trace!("Pan ignored");
                    }
                }
                self.cursor = Some(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.dragging = false;
                self.panning = false;
                self.cursor = None;
            }
            WindowEvent::RedrawRequested => {
                let actions = self.frame();
                if !actions.is_empty() {
                    self.apply(actions);
                    self.window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

struct App {
    opts: LaunchOptions,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match Running::start(event_loop, &self.opts) {
            Ok(running) => self.running = Some(running),
            Err(err) => {
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if let Some(running) = self.running.as_mut().filter(|r| r.window.id() == id) {
            running.window_event(event_loop, event);
        }
    }
}

/// Open the configurator window and run until it is closed.
pub fn run(opts: LaunchOptions) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow!("Event loop error: {e:?}"))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App {
        opts,
        running: None,
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_override_registry() {
        let opts = LaunchOptions {
            wheel: Some("enkei".into()),
            color: Some("exColor1".into()),
            ..Default::default()
        };
        let registry = opts.registry();
        assert_eq!(registry.wheels.default, "enkei");
        assert_eq!(registry.default_color, "exColor1");
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn unknown_override_fails_validation() {
        let opts = LaunchOptions {
            color: Some("chartreuse".into()),
            ..Default::default()
        };
        assert!(opts.registry().validate().is_err());
    }
}
