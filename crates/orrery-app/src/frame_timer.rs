//! Wall-clock frame deltas for the simulation clock.

use std::time::Instant;
use tracing::warn;

/// Longest wall-clock step fed to the simulation. A stall (window drag,
/// breakpoint) advances simulated time by at most this much.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Clamp a measured frame time to `[0, MAX_FRAME_TIME]`.
pub fn clamp_frame_time(frame_time: f64) -> f64 {
    if !frame_time.is_finite() || frame_time < 0.0 {
        return 0.0;
    }
    if frame_time > MAX_FRAME_TIME {
        warn!(
            "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
            frame_time * 1000.0,
            MAX_FRAME_TIME * 1000.0
        );
        return MAX_FRAME_TIME;
    }
    frame_time
}

/// Measures the time between successive [`tick`](Self::tick) calls.
pub struct FrameTimer {
    previous_time: Instant,
    frame_count: u64,
    total_time: f64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            frame_count: 0,
            total_time: 0.0,
        }
    }

    /// Seconds since the previous tick, clamped.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.record(frame_time)
    }

    /// Restart timing from now, e.g. once the window is up, so setup time is
    /// not counted as a frame.
    pub fn reset(&mut self) {
        self.previous_time = Instant::now();
    }

    fn record(&mut self, frame_time: f64) -> f64 {
        let dt = clamp_frame_time(frame_time);
        self.total_time += dt;
        self.frame_count += 1;
        dt
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of clamped deltas.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
