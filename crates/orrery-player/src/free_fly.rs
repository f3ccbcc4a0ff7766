//! Free-fly camera: unrestricted flight through the system.

use glam::{Quat, Vec3};
use orrery_config::CameraConfig;
use orrery_input::InputState;
use orrery_render::Camera;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Field of view multiplier per wheel line; scrolling up narrows the view.
const ZOOM_FACTOR: f32 = 0.9;

/// WASD flight with Space/Ctrl for vertical movement and Shift to boost.
/// Holding the right mouse button turns mouse motion into yaw and pitch;
/// the wheel zooms by changing the field of view.
#[derive(Clone, Debug)]
pub struct FreeFlyController {
    /// Radians; zero looks down -Z.
    pub yaw: f32,
    /// Radians, kept within ±89°.
    pub pitch: f32,
    /// Scene units per second.
    pub move_speed: f32,
    pub boost_multiplier: f32,
    /// Radians per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    pub invert_y: bool,
    min_fov: f32,
    max_fov: f32,
    start_position: Vec3,
    start_yaw: f32,
    start_pitch: f32,
    start_fov: f32,
}

impl Default for FreeFlyController {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl FreeFlyController {
    pub fn from_config(config: &CameraConfig) -> Self {
        let min_fov = config.min_fov_deg.min(config.max_fov_deg).to_radians();
        let max_fov = config.max_fov_deg.max(config.min_fov_deg).to_radians();
        let start_yaw = config.start_yaw_deg.to_radians();
        let start_pitch = config.start_pitch_deg.to_radians().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        Self {
            yaw: start_yaw,
            pitch: start_pitch,
            move_speed: config.move_speed,
            boost_multiplier: config.boost_multiplier,
            mouse_sensitivity: config.mouse_sensitivity,
            invert_y: config.invert_y,
            min_fov,
            max_fov,
            start_position: Vec3::from_array(config.start_position),
            start_yaw,
            start_pitch,
            start_fov: config.fov_deg.to_radians().clamp(min_fov, max_fov),
        }
    }

    /// Take new speeds, sensitivity, fov range, and start pose from `config`
    /// while keeping the current heading.
    pub fn retune(&mut self, config: &CameraConfig) {
        let (yaw, pitch) = (self.yaw, self.pitch);
        *self = Self::from_config(config);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Clamp `camera`'s field of view into the current zoom range.
    pub fn clamp_fov(&self, camera: &mut Camera) {
        camera.fov_y = camera.fov_y.clamp(self.min_fov, self.max_fov);
    }

    /// The start pose as a camera with the configured clip planes.
    pub fn initial_camera(&self, config: &CameraConfig, aspect_ratio: f32) -> Camera {
        let mut camera = Camera {
            aspect_ratio,
            near: config.near,
            far: config.far,
            ..Camera::default()
        };
        self.start_pose(&mut camera);
        camera
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Right button held: mouse motion steers and the cursor should be grabbed.
    pub fn wants_look(&self, input: &InputState) -> bool {
        input.mouse.is_button_pressed(MouseButton::Right)
    }

    /// Apply one frame of input to `camera`.
    pub fn update(&mut self, input: &InputState, dt_seconds: f32, camera: &mut Camera) {
        if input.keyboard.just_pressed(KeyCode::KeyR) {
            self.reset(camera);
            return;
        }
        self.look(input, camera);
        self.zoom(input.mouse.scroll(), camera);
        self.fly(input, dt_seconds, camera);
    }

    /// Back to the configured start pose and field of view.
    pub fn reset(&mut self, camera: &mut Camera) {
        self.yaw = self.start_yaw;
        self.pitch = self.start_pitch;
        self.start_pose(camera);
        log::debug!("Camera reset to {:?}", camera.position);
    }

    /// Writes the start pose into `camera` without touching yaw or pitch.
    fn start_pose(&self, camera: &mut Camera) {
        camera.position = self.start_position;
        camera.rotation =
            Quat::from_rotation_y(self.start_yaw) * Quat::from_rotation_x(self.start_pitch);
        camera.fov_y = self.start_fov;
    }

    fn look(&mut self, input: &InputState, camera: &mut Camera) {
        if !self.wants_look(input) {
            return;
        }
        let delta = input.mouse.delta();
        let dy = if self.invert_y { -delta.y } else { delta.y };
        self.yaw -= delta.x * self.mouse_sensitivity;
        self.pitch = (self.pitch - dy * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        camera.rotation = self.rotation();
    }

    fn zoom(&self, scroll_lines: f32, camera: &mut Camera) {
        if scroll_lines != 0.0 {
            camera.fov_y =
                (camera.fov_y * ZOOM_FACTOR.powf(scroll_lines)).clamp(self.min_fov, self.max_fov);
        }
    }

    fn fly(&self, input: &InputState, dt_seconds: f32, camera: &mut Camera) {
        let keys = &input.keyboard;
        let forward = camera.forward();
        let right = camera.right();

        let mut dir = Vec3::ZERO;
        if keys.is_pressed(KeyCode::KeyW) {
            dir += forward;
        }
        if keys.is_pressed(KeyCode::KeyS) {
            dir -= forward;
        }
        if keys.is_pressed(KeyCode::KeyD) {
            dir += right;
        }
        if keys.is_pressed(KeyCode::KeyA) {
            dir -= right;
        }
        if keys.is_pressed(KeyCode::Space) {
            dir += Vec3::Y;
        }
        if keys.any_pressed(&[KeyCode::ControlLeft, KeyCode::ControlRight]) {
            dir -= Vec3::Y;
        }

        if dir.length_squared() > 1e-6 {
            let mut speed = self.move_speed;
            if keys.any_pressed(&[KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
                speed *= self.boost_multiplier;
            }
            camera.position += dir.normalize() * speed * dt_seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_input::{InputEvent, InputQueue, RawKeyEvent};
    use winit::event::{ElementState, MouseScrollDelta};

    fn setup() -> (FreeFlyController, Camera) {
        let config = CameraConfig {
            start_position: [0.0, 0.0, 0.0],
            start_yaw_deg: 0.0,
            start_pitch_deg: 0.0,
            move_speed: 10.0,
            boost_multiplier: 5.0,
            ..CameraConfig::default()
        };
        let controller = FreeFlyController::from_config(&config);
        let camera = controller.initial_camera(&config, 1.0);
        (controller, camera)
    }

    fn input(events: &[InputEvent]) -> InputState {
        let mut queue = InputQueue::new();
        for &e in events {
            queue.push(e);
        }
        let mut state = InputState::new();
        queue.drain_into(&mut state);
        state
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(RawKeyEvent::code(code, ElementState::Pressed))
    }

    fn right_drag(dx: f64, dy: f64) -> Vec<InputEvent> {
        vec![
            InputEvent::MouseButton {
                button: MouseButton::Right,
                state: ElementState::Pressed,
            },
            InputEvent::CursorMoved { x: 100.0, y: 100.0 },
            InputEvent::CursorMoved {
                x: 100.0 + dx,
                y: 100.0 + dy,
            },
        ]
    }

    #[test]
    fn test_w_moves_forward() {
        let (mut ctl, mut camera) = setup();
        ctl.update(&input(&[key(KeyCode::KeyW)]), 0.5, &mut camera);
        assert!((camera.position - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn test_shift_boosts_and_space_rises() {
        let (mut ctl, mut camera) = setup();
        let state = input(&[key(KeyCode::Space), key(KeyCode::ShiftLeft)]);
        ctl.update(&state, 1.0, &mut camera);
        assert!((camera.position.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_diagonal_is_not_faster() {
        let (mut ctl, mut camera) = setup();
        ctl.update(&input(&[key(KeyCode::KeyW), key(KeyCode::KeyD)]), 1.0, &mut camera);
        assert!((camera.position.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_mouse_motion_without_right_button_does_not_turn() {
        let (mut ctl, mut camera) = setup();
        let before = camera.rotation;
        let state = input(&[
            InputEvent::CursorMoved { x: 0.0, y: 0.0 },
            InputEvent::CursorMoved { x: 300.0, y: 0.0 },
        ]);
        ctl.update(&state, 0.016, &mut camera);
        assert_eq!(camera.rotation, before);
    }

    #[test]
    fn test_right_drag_yaws() {
        let (mut ctl, mut camera) = setup();
        ctl.update(&input(&right_drag(100.0, 0.0)), 0.016, &mut camera);
        assert!((ctl.yaw + 100.0 * ctl.mouse_sensitivity).abs() < 1e-6);
        // Turning left of -Z means facing towards +X.
        assert!(camera.forward().x > 0.0);
    }

    #[test]
    fn test_pitch_clamps() {
        let (mut ctl, mut camera) = setup();
        ctl.update(&input(&right_drag(0.0, -100_000.0)), 0.016, &mut camera);
        assert!((ctl.pitch - PITCH_LIMIT).abs() < 1e-6);
        assert!(camera.forward().y < 1.0);
    }

    #[test]
    fn test_invert_y_flips_pitch() {
        let (mut ctl, mut camera) = setup();
        ctl.invert_y = true;
        ctl.update(&input(&right_drag(0.0, 50.0)), 0.016, &mut camera);
        assert!(ctl.pitch > 0.0);
    }

    #[test]
    fn test_scroll_zoom_stays_in_range() {
        let (mut ctl, mut camera) = setup();
        let start = camera.fov_y;
        let closer = input(&[InputEvent::Wheel(MouseScrollDelta::LineDelta(0.0, 1.0))]);
        ctl.update(&closer, 0.016, &mut camera);
        assert!(camera.fov_y < start);

        let wide = input(&[InputEvent::Wheel(MouseScrollDelta::LineDelta(0.0, -500.0))]);
        ctl.update(&wide, 0.016, &mut camera);
        assert!((camera.fov_y - ctl.max_fov).abs() < 1e-6);

        let narrow = input(&[InputEvent::Wheel(MouseScrollDelta::LineDelta(0.0, 500.0))]);
        ctl.update(&narrow, 0.016, &mut camera);
        assert!((camera.fov_y - ctl.min_fov).abs() < 1e-6);
    }

    #[test]
    fn test_r_resets_pose() {
        let (mut ctl, mut camera) = setup();
        let start = camera.clone();
        ctl.update(&input(&right_drag(40.0, 25.0)), 0.016, &mut camera);
        ctl.update(&input(&[key(KeyCode::KeyW)]), 2.0, &mut camera);
        assert_ne!(camera, start);

        ctl.update(&input(&[key(KeyCode::KeyR)]), 0.016, &mut camera);
        assert_eq!(camera, start);
    }

    #[test]
    fn test_initial_camera_leaves_current_heading_alone() {
        let config = CameraConfig::default();
        let mut ctl = FreeFlyController::from_config(&config);
        let fresh = ctl.initial_camera(&config, 1.0);

        let mut camera = fresh.clone();
        ctl.update(&input(&right_drag(60.0, 30.0)), 0.016, &mut camera);
        let (yaw, pitch) = (ctl.yaw, ctl.pitch);

        let again = ctl.initial_camera(&config, 1.0);
        assert_eq!(again, fresh);
        assert_eq!((ctl.yaw, ctl.pitch), (yaw, pitch));
    }

    #[test]
    fn test_retune_keeps_heading() {
        let (mut ctl, mut camera) = setup();
        ctl.update(&input(&right_drag(80.0, 20.0)), 0.016, &mut camera);
        let (yaw, pitch) = (ctl.yaw, ctl.pitch);

        let config = CameraConfig {
            move_speed: 99.0,
            max_fov_deg: 30.0,
            ..CameraConfig::default()
        };
        ctl.retune(&config);
        assert_eq!((ctl.yaw, ctl.pitch), (yaw, pitch));
        assert_eq!(ctl.move_speed, 99.0);

        camera.fov_y = 1.5;
        ctl.clamp_fov(&mut camera);
        assert!((camera.fov_y - 30f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_default_start_pose_from_config() {
        let config = CameraConfig::default();
        let ctl = FreeFlyController::from_config(&config);
        let camera = ctl.initial_camera(&config, 16.0 / 9.0);
        assert_eq!(camera.position, Vec3::from_array(config.start_position));
        assert!((camera.fov_y - config.fov_deg.to_radians()).abs() < 1e-6);
        assert_eq!(camera.far, config.far);
    }
}
