//! Simulated time.

/// Simulated time in Earth days, advanced by scaled wall-clock deltas.
///
/// Pausing freezes `time_days`; resuming continues from the frozen value.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    /// Simulated days since the start of the run. May go negative when reversed.
    pub time_days: f64,
    /// Simulated days per wall-clock second. Negative runs time backwards.
    pub speed: f64,
    pub paused: bool,
    min_speed: f64,
    max_speed: f64,
}

impl SimClock {
    pub const DEFAULT_MIN_SPEED: f64 = 1.0 / 64.0;
    pub const DEFAULT_MAX_SPEED: f64 = 4096.0;

    pub fn new(speed: f64) -> Self {
        Self::with_limits(speed, Self::DEFAULT_MIN_SPEED, Self::DEFAULT_MAX_SPEED)
    }

    /// Clock whose speed magnitude is kept within `[min_speed, max_speed]`.
    pub fn with_limits(speed: f64, min_speed: f64, max_speed: f64) -> Self {
        let min_speed = min_speed.abs();
        let max_speed = max_speed.abs().max(min_speed);
        let mut clock = Self {
            time_days: 0.0,
            speed,
            paused: false,
            min_speed,
            max_speed,
        };
        clock.speed = clock.clamp_speed(speed);
        clock
    }

    /// Advance by a wall-clock delta in seconds. No-op while paused.
    pub fn advance(&mut self, dt_seconds: f64) {
        if !self.paused && dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.time_days += dt_seconds * self.speed;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!(
            "Simulation {} at t = {:.2} days",
            if self.paused { "paused" } else { "resumed" },
            self.time_days
        );
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Multiply the speed magnitude by `factor`, clamped to the limits.
    pub fn scale_speed(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.speed = self.clamp_speed(self.speed * factor);
            log::info!("Simulation speed: {:.4} days/s", self.speed);
        }
    }

    /// Run time in the opposite direction.
    pub fn reverse(&mut self) {
        self.speed = -self.speed;
        log::info!("Simulation speed: {:.4} days/s", self.speed);
    }

    fn clamp_speed(&self, speed: f64) -> f64 {
        let sign = if speed.is_sign_negative() { -1.0 } else { 1.0 };
        sign * speed.abs().clamp(self.min_speed, self.max_speed)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}
