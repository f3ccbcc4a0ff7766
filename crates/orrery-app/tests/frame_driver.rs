//! Input-to-frame behaviour of the orrery driver without a window.

use orrery_app::{MAX_FRAME_TIME, Orrery};
use orrery_config::Config;
use orrery_input::{InputEvent, InputQueue, RawKeyEvent};
use orrery_orbit::BodyTable;
use orrery_render::{BackendCall, MaterialKey, RecordingBackend};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

fn small_config() -> Config {
    let mut config = Config::default();
    config.simulation.asteroid_count = 10;
    config.simulation.kuiper_count = 10;
    config.render.sphere_subdivisions = 1;
    config
}

fn orrery() -> (Orrery, RecordingBackend) {
    let orrery = Orrery::new(&small_config(), BodyTable::builtin().unwrap());
    let mut backend = RecordingBackend::strict();
    assert_eq!(orrery.upload(&mut backend), 0);
    (orrery, backend)
}

fn tap(queue: &mut InputQueue, code: KeyCode) {
    queue.push(InputEvent::Key(RawKeyEvent::code(code, ElementState::Pressed)));
    queue.push(InputEvent::Key(RawKeyEvent::code(code, ElementState::Released)));
}

#[test]
fn frame_advances_clock_and_presents() {
    let (mut orrery, mut backend) = orrery();
    let mut queue = InputQueue::new();

    let outcome = orrery.frame(0.5, &mut queue, &mut backend);
    assert!(!outcome.quit);
    assert_eq!(outcome.stats.skipped, 0);
    assert!(outcome.stats.draws > 0);
    assert_eq!(backend.frames_presented(), 1);
    assert!((orrery.clock.time_days - 0.5 * orrery.clock.speed).abs() < 1e-12);
}

#[test]
fn pause_key_freezes_time() {
    let (mut orrery, mut backend) = orrery();
    let mut queue = InputQueue::new();

    tap(&mut queue, KeyCode::KeyP);
    orrery.frame(MAX_FRAME_TIME, &mut queue, &mut backend);
    assert!(orrery.clock.paused);
    assert_eq!(orrery.clock.time_days, 0.0);

    orrery.frame(MAX_FRAME_TIME, &mut queue, &mut backend);
    assert_eq!(orrery.clock.time_days, 0.0);
    assert_eq!(backend.frames_presented(), 2);
}

#[test]
fn label_toggle_reaches_the_renderer() {
    let (mut orrery, mut backend) = orrery();
    let mut queue = InputQueue::new();
    fn labels(calls: &[BackendCall]) -> usize {
        calls
            .iter()
            .filter(|c| matches!(c.material(), Some(MaterialKey::Label(_))))
            .count()
    }

    orrery.frame(0.01, &mut queue, &mut backend);
    assert!(labels(&backend.take_calls()) > 0);

    tap(&mut queue, KeyCode::KeyL);
    orrery.frame(0.01, &mut queue, &mut backend);
    assert_eq!(labels(&backend.take_calls()), 0);
}

#[test]
fn escape_quits_without_rendering() {
    let (mut orrery, mut backend) = orrery();
    let mut queue = InputQueue::new();
    tap(&mut queue, KeyCode::Escape);

    let outcome = orrery.frame(0.016, &mut queue, &mut backend);
    assert!(outcome.quit);
    assert_eq!(backend.frames_presented(), 0);
    assert!(queue.is_empty());
}

#[test]
fn held_key_moves_camera_across_frames() {
    let (mut orrery, mut backend) = orrery();
    let mut queue = InputQueue::new();
    let start = orrery.camera.position;
    let forward = orrery.camera.forward();

    queue.push(InputEvent::Key(RawKeyEvent::code(KeyCode::KeyW, ElementState::Pressed)));
    orrery.frame(0.1, &mut queue, &mut backend);
    orrery.frame(0.1, &mut queue, &mut backend);

    let moved = orrery.camera.position - start;
    let expected = Config::default().camera.move_speed * 0.2;
    assert!((moved.length() - expected).abs() < 1e-3);
    assert!(moved.normalize().dot(forward) > 0.999);
}

#[test]
fn right_button_requests_mouse_look() {
    let (mut orrery, mut backend) = orrery();
    let mut queue = InputQueue::new();
    assert!(!orrery.wants_look());

    queue.push(InputEvent::MouseButton {
        button: MouseButton::Right,
        state: ElementState::Pressed,
    });
    orrery.frame(0.016, &mut queue, &mut backend);
    assert!(orrery.wants_look());

    queue.push(InputEvent::FocusLost);
    orrery.frame(0.016, &mut queue, &mut backend);
    assert!(!orrery.wants_look());
}

#[test]
fn resize_updates_aspect() {
    let (mut orrery, _) = orrery();
    orrery.resize(1000, 500);
    assert!((orrery.camera.aspect_ratio - 2.0).abs() < 1e-6);
    orrery.resize(1000, 0);
    assert!((orrery.camera.aspect_ratio - 2.0).abs() < 1e-6);
}

#[test]
fn f5_requests_reload_and_still_renders() {
    let (mut orrery, mut backend) = orrery();
    let mut queue = InputQueue::new();

    tap(&mut queue, KeyCode::F5);
    let outcome = orrery.frame(0.1, &mut queue, &mut backend);
    assert!(outcome.reload_config);
    assert!(!outcome.quit);
    assert_eq!(backend.frames_presented(), 1);

    let next = orrery.frame(0.1, &mut queue, &mut backend);
    assert!(!next.reload_config);
}

#[test]
fn reloaded_config_keeps_time_and_pose() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config();
    config.save(dir.path()).unwrap();

    let mut orrery = Orrery::new(&config, BodyTable::builtin().unwrap());
    let mut backend = RecordingBackend::new();
    let mut queue = InputQueue::new();
    orrery.frame(MAX_FRAME_TIME, &mut queue, &mut backend);
    tap(&mut queue, KeyCode::KeyP);
    orrery.frame(MAX_FRAME_TIME, &mut queue, &mut backend);
    let time = orrery.clock.time_days;
    let position = orrery.camera.position;

    let mut edited = config.clone();
    edited.simulation.days_per_second = 40.0;
    edited.simulation.show_labels = false;
    edited.render.ambient = 0.3;
    edited.save(dir.path()).unwrap();

    let reloaded = config.reload(dir.path()).unwrap().unwrap();
    orrery.apply_config(&config, &reloaded);
    assert_eq!(orrery.clock.speed, 40.0);
    assert_eq!(orrery.clock.time_days, time);
    assert!(orrery.clock.paused);
    assert!(!orrery.scene.show_labels);
    assert_eq!(orrery.scene.settings().ambient, 0.3);
    assert_eq!(orrery.camera.position, position);

    assert!(reloaded.reload(dir.path()).unwrap().is_none());
}

#[test]
fn reload_keeps_live_speed_when_file_speed_is_unchanged() {
    let (mut orrery, mut backend) = orrery();
    let mut queue = InputQueue::new();
    tap(&mut queue, KeyCode::Equal);
    orrery.frame(0.1, &mut queue, &mut backend);
    let sped_up = orrery.clock.speed;

    let config = small_config();
    let mut edited = config.clone();
    edited.camera.move_speed *= 2.0;
    orrery.apply_config(&config, &edited);
    assert_eq!(orrery.clock.speed, sped_up);
}
