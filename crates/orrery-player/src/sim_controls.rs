//! Keyboard controls for simulated time and overlays.

use orrery_config::SimulationConfig;
use orrery_input::KeyboardState;
use orrery_orbit::SimClock;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimAction {
    TogglePause,
    SpeedUp,
    SpeedDown,
    Reverse,
    ToggleLabels,
    ReloadConfig,
    Quit,
}

/// Requests the controls cannot carry out themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlOutcome {
    pub quit: bool,
    pub reload_config: bool,
}

impl ControlOutcome {
    fn merge(self, other: Self) -> Self {
        Self {
            quit: self.quit || other.quit,
            reload_config: self.reload_config || other.reload_config,
        }
    }
}

const BINDINGS: &[(KeyCode, SimAction)] = &[
    (KeyCode::KeyP, SimAction::TogglePause),
    (KeyCode::Equal, SimAction::SpeedUp),
    (KeyCode::NumpadAdd, SimAction::SpeedUp),
    (KeyCode::Minus, SimAction::SpeedDown),
    (KeyCode::NumpadSubtract, SimAction::SpeedDown),
    (KeyCode::Backspace, SimAction::Reverse),
    (KeyCode::KeyL, SimAction::ToggleLabels),
    (KeyCode::F5, SimAction::ReloadConfig),
    (KeyCode::Escape, SimAction::Quit),
];

/// Maps key presses to clock and overlay changes.
#[derive(Debug, Clone)]
pub struct SimControls {
    /// Speed multiplier per `SpeedUp` press.
    pub speed_step: f64,
}

impl Default for SimControls {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl SimControls {
    pub fn from_config(config: &SimulationConfig) -> Self {
        let speed_step = if config.speed_step.is_finite() && config.speed_step > 1.0 {
            config.speed_step
        } else {
            log::warn!(
                "Ignoring speed_step {} (must be > 1), using 2",
                config.speed_step
            );
            2.0
        };
        Self { speed_step }
    }

    /// Actions whose key went down this frame, in binding order.
    pub fn actions(&self, keyboard: &KeyboardState) -> Vec<SimAction> {
        let mut actions = Vec::new();
        for &(key, action) in BINDINGS {
            if keyboard.just_pressed(key) && !actions.contains(&action) {
                actions.push(action);
            }
        }
        actions
    }

    /// Apply `action` to the clock or the label toggle. Quit and config
    /// reload are handed back to the caller.
    pub fn apply(
        &self,
        action: SimAction,
        clock: &mut SimClock,
        show_labels: &mut bool,
    ) -> ControlOutcome {
        match action {
            SimAction::TogglePause => clock.toggle_pause(),
            SimAction::SpeedUp => clock.scale_speed(self.speed_step),
            SimAction::SpeedDown => clock.scale_speed(1.0 / self.speed_step),
            SimAction::Reverse => clock.reverse(),
            SimAction::ToggleLabels => {
                *show_labels = !*show_labels;
                log::info!("Labels {}", if *show_labels { "on" } else { "off" });
            }
            SimAction::ReloadConfig => {
                return ControlOutcome {
                    reload_config: true,
                    ..ControlOutcome::default()
                };
            }
            SimAction::Quit => {
                return ControlOutcome {
                    quit: true,
                    ..ControlOutcome::default()
                };
            }
        }
        ControlOutcome::default()
    }

    /// Handle this frame's presses.
    pub fn update(
        &self,
        keyboard: &KeyboardState,
        clock: &mut SimClock,
        show_labels: &mut bool,
    ) -> ControlOutcome {
        self.actions(keyboard)
            .into_iter()
            .fold(ControlOutcome::default(), |outcome, action| {
                outcome.merge(self.apply(action, clock, show_labels))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_input::RawKeyEvent;
    use winit::event::ElementState;

    fn pressed(codes: &[KeyCode]) -> KeyboardState {
        let mut kb = KeyboardState::new();
        for &code in codes {
            kb.process_raw(RawKeyEvent::code(code, ElementState::Pressed));
        }
        kb
    }

    #[test]
    fn test_pause_freezes_clock() {
        let controls = SimControls::default();
        let mut clock = SimClock::new(1.0);
        let mut labels = true;
        clock.advance(2.0);

        let outcome = controls.update(&pressed(&[KeyCode::KeyP]), &mut clock, &mut labels);
        assert_eq!(outcome, ControlOutcome::default());
        assert!(clock.paused);
        clock.advance(10.0);
        assert!((clock.time_days - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_speed_steps_and_reverse() {
        let controls = SimControls { speed_step: 2.0 };
        let mut clock = SimClock::new(1.0);
        let mut labels = true;

        controls.update(&pressed(&[KeyCode::Equal]), &mut clock, &mut labels);
        assert!((clock.speed - 2.0).abs() < 1e-12);
        controls.update(&pressed(&[KeyCode::Minus]), &mut clock, &mut labels);
        controls.update(&pressed(&[KeyCode::Minus]), &mut clock, &mut labels);
        assert!((clock.speed - 0.5).abs() < 1e-12);
        controls.update(&pressed(&[KeyCode::Backspace]), &mut clock, &mut labels);
        assert!((clock.speed + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_numpad_and_main_plus_count_once() {
        let controls = SimControls { speed_step: 2.0 };
        let kb = pressed(&[KeyCode::Equal, KeyCode::NumpadAdd]);
        assert_eq!(controls.actions(&kb), vec![SimAction::SpeedUp]);
    }

    #[test]
    fn test_labels_toggle_and_quit() {
        let controls = SimControls::default();
        let mut clock = SimClock::default();
        let mut labels = true;
        controls.update(&pressed(&[KeyCode::KeyL]), &mut clock, &mut labels);
        assert!(!labels);
        assert!(controls.update(&pressed(&[KeyCode::Escape]), &mut clock, &mut labels).quit);
    }

    #[test]
    fn test_f5_requests_reload_without_touching_clock() {
        let controls = SimControls::default();
        let mut clock = SimClock::new(3.0);
        let before = clock.clone();
        let mut labels = true;

        let keys = pressed(&[KeyCode::F5, KeyCode::KeyL]);
        let outcome = controls.update(&keys, &mut clock, &mut labels);
        assert!(outcome.reload_config);
        assert!(!outcome.quit);
        assert!(!labels);
        assert_eq!(clock, before);
    }

    #[test]
    fn test_held_key_acts_once() {
        let controls = SimControls::default();
        let mut kb = pressed(&[KeyCode::KeyP]);
        assert_eq!(controls.actions(&kb), vec![SimAction::TogglePause]);
        kb.clear_transients();
        assert!(controls.actions(&kb).is_empty());
    }

    #[test]
    fn test_bad_speed_step_falls_back() {
        let config = SimulationConfig {
            speed_step: 0.5,
            ..SimulationConfig::default()
        };
        assert_eq!(SimControls::from_config(&config).speed_step, 2.0);
    }
}
