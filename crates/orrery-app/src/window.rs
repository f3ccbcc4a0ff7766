//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. Event callbacks
//! only queue input; all state changes happen in the redraw.

use std::path::PathBuf;
use std::sync::Arc;

use orrery_config::Config;
use orrery_input::{InputEvent, InputQueue, RawKeyEvent};
use orrery_orbit::BodyTable;
use orrery_render::{WgpuBackend, init_render_context_blocking};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::frame_timer::FrameTimer;
use crate::orrery::Orrery;

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// The window, its GPU backend, and the orrery it shows.
pub struct AppState {
    config: Config,
    /// Where `config.ron` lives; `None` disables reloading.
    config_dir: Option<PathBuf>,
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
    orrery: Orrery,
    input: InputQueue,
    timer: FrameTimer,
}

impl AppState {
    pub fn new(config: Config, config_dir: Option<PathBuf>, table: BodyTable) -> Self {
        let orrery = Orrery::new(&config, table);
        Self {
            config,
            config_dir,
            window: None,
            backend: None,
            orrery,
            input: InputQueue::new(),
            timer: FrameTimer::new(),
        }
    }

    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) {
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let vsync = self.config.window.vsync;
        let context = match init_render_context_blocking(window.clone(), vsync) {
            Ok(context) => context,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut backend = WgpuBackend::new(context);
        let failed = self.orrery.upload(&mut backend);
        if failed > 0 {
            warn!("{failed} scene resources failed to upload; those draws will be skipped");
        }

        let (width, height) = backend.size();
        self.orrery.resize(width, height);
        info!("Window ready at {width}x{height}");

        window.request_redraw();
        self.backend = Some(backend);
        self.window = Some(window);
        self.timer.reset();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        let dt = self.timer.tick();
        let outcome = self.orrery.frame(dt, &mut self.input, backend);
        if outcome.quit {
            event_loop.exit();
            return;
        }
        if outcome.reload_config {
            self.reload_config();
        }

        let Some(window) = &self.window else {
            return;
        };
        let look = self.orrery.wants_look();
        if look != self.orrery.input().mouse.is_captured() {
            self.orrery.input_mut().mouse.set_captured(window, look);
        }
        window.request_redraw();
    }
}

impl AppState {
    fn reload_config(&mut self) {
        let Some(dir) = &self.config_dir else {
            warn!("No config directory, nothing to reload");
            return;
        };
        match self.config.reload(dir) {
            Ok(Some(config)) => {
                self.orrery.apply_config(&self.config, &config);
                self.config = config;
            }
            Ok(None) => info!("Config unchanged"),
            Err(e) => warn!("Config reload failed, keeping current settings: {e}"),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.init_graphics(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(backend) = &mut self.backend {
                    backend.resize(size.width, size.height);
                }
                self.orrery.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.push(InputEvent::Key(RawKeyEvent::from_winit(&event)));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.push(InputEvent::CursorMoved {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.push(InputEvent::MouseButton { button, state });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.input.push(InputEvent::Wheel(delta));
            }
            WindowEvent::CursorEntered { .. } => self.input.push(InputEvent::CursorEntered),
            WindowEvent::CursorLeft { .. } => self.input.push(InputEvent::CursorLeft),
            WindowEvent::Focused(false) => self.input.push(InputEvent::FocusLost),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.push(InputEvent::RawMotion {
                dx: delta.0,
                dy: delta.1,
            });
        }
    }
}

/// Open the window and run until it closes or Escape is pressed.
#[instrument(skip_all)]
pub fn run(
    config: Config,
    config_dir: Option<PathBuf>,
    table: BodyTable,
) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, config_dir, table);
    event_loop.run_app(&mut app)?;
    info!("Rendered {} frames", app.orrery().frames_rendered());
    Ok(())
}
