//! Everything one frame touches, independent of the window.

use orrery_config::Config;
use orrery_input::{InputQueue, InputState};
use orrery_orbit::{BodyTable, SimClock};
use orrery_player::{FreeFlyController, SimControls};
use orrery_render::{Camera, RenderBackend, ResourceUploader};
use orrery_scene::{FrameStats, RenderPassSequencer, Scene, SceneSettings};
use tracing::{info, instrument, warn};

/// What happened in one [`Orrery::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub stats: FrameStats,
    /// Escape was pressed; the frame was not rendered.
    pub quit: bool,
    /// F5 was pressed; the caller should re-read the config file.
    pub reload_config: bool,
}

/// The simulation, the camera, and the controls that steer them.
pub struct Orrery {
    pub scene: Scene,
    pub clock: SimClock,
    pub camera: Camera,
    controller: FreeFlyController,
    controls: SimControls,
    sequencer: RenderPassSequencer,
    input: InputState,
}

impl Orrery {
    #[instrument(skip_all, fields(bodies = table.len()))]
    pub fn new(config: &Config, table: BodyTable) -> Self {
        let sim = &config.simulation;
        let mut clock = SimClock::with_limits(sim.days_per_second, sim.min_speed, sim.max_speed);
        clock.set_paused(sim.start_paused);

        let controller = FreeFlyController::from_config(&config.camera);
        let aspect = config.window.width.max(1) as f32 / config.window.height.max(1) as f32;
        let camera = controller.initial_camera(&config.camera, aspect);

        let scene = Scene::new(table, SceneSettings::from_config(config));
        info!(
            "Scene ready: {} bodies, {} belts, {:.3} days/s{}",
            scene.table().len(),
            scene.belts().len(),
            clock.speed,
            if clock.paused { " (paused)" } else { "" }
        );

        Self {
            scene,
            clock,
            camera,
            controller,
            controls: SimControls::from_config(sim),
            sequencer: RenderPassSequencer::new(),
            input: InputState::new(),
        }
    }

    /// Upload every mesh, texture, and instance buffer. Returns the number of
    /// resources that failed.
    pub fn upload(&self, uploader: &mut dyn ResourceUploader) -> usize {
        self.scene.upload(uploader)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Whether mouse look is active and the cursor should be grabbed.
    pub fn wants_look(&self) -> bool {
        self.controller.wants_look(&self.input)
    }

    /// Drain input, run the controls, advance the clock by `dt_seconds`, and
    /// render. Transient input is cleared afterwards.
    pub fn frame(
        &mut self,
        dt_seconds: f64,
        queue: &mut InputQueue,
        backend: &mut dyn RenderBackend,
    ) -> FrameOutcome {
        queue.drain_into(&mut self.input);

        let requests = self.controls.update(
            &self.input.keyboard,
            &mut self.clock,
            &mut self.scene.show_labels,
        );
        if requests.quit {
            info!("Quit requested");
            self.input.clear_transients();
            return FrameOutcome {
                quit: true,
                ..FrameOutcome::default()
            };
        }

        self.controller
            .update(&self.input, dt_seconds as f32, &mut self.camera);
        self.clock.advance(dt_seconds);

        let stats = self.sequencer.render_frame(
            &mut self.scene,
            &self.camera,
            self.clock.time_days,
            backend,
        );
        self.input.clear_transients();

        FrameOutcome {
            stats,
            quit: false,
            reload_config: requests.reload_config,
        }
    }

    /// Bring a reloaded config into the running orrery. Simulated time, the
    /// pause state, and the camera pose carry over; the speed is only reset
    /// when `days_per_second` itself changed.
    pub fn apply_config(&mut self, previous: &Config, config: &Config) {
        let sim = &config.simulation;
        let speed = if sim.days_per_second != previous.simulation.days_per_second {
            sim.days_per_second
        } else {
            self.clock.speed
        };
        let mut clock = SimClock::with_limits(speed, sim.min_speed, sim.max_speed);
        clock.time_days = self.clock.time_days;
        clock.paused = self.clock.paused;
        self.clock = clock;

        self.controls = SimControls::from_config(sim);
        self.controller.retune(&config.camera);
        self.controller.clamp_fov(&mut self.camera);
        self.camera.near = config.camera.near;
        self.camera.far = config.camera.far;

        if self.scene.retune(&SceneSettings::from_config(config)) {
            warn!("Mesh, belt, and seed settings take effect on restart");
        }
        if config.window != previous.window || sim.body_table != previous.simulation.body_table {
            warn!("Window and body table settings take effect on restart");
        }
        info!("Applied reloaded config");
    }

    pub fn frames_rendered(&self) -> u64 {
        self.sequencer.frames()
    }
}
