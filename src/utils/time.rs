//! Engine time model.
//!
//! [`Time`] is advanced once per tick with the real time that passed. It
//! derives a smoothed delta and a scaled simulation delta from it. The host
//! measures real time with a [`Clock`].

use std::time::{Duration, Instant};

/// Number of samples the smoothed delta averages over.
pub const SMOOTHING_WINDOW: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Time {
    raw_delta: f32,
    smooth_delta: f32,
    scaled_delta: f32,
    total_time: f64,
    time_scale: f32,
    // Scale restored by `resume`.
    resume_scale: f32,
    ticks: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self {
            raw_delta: 0.0,
            smooth_delta: 0.0,
            scaled_delta: 0.0,
            total_time: 0.0,
            time_scale: 1.0,
            resume_scale: 1.0,
            ticks: 0,
        }
    }
}

impl Time {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by `raw_delta` seconds of real time.
    pub fn tick(&mut self, raw_delta: f32) {
        let raw_delta = raw_delta.max(0.0);
        self.raw_delta = raw_delta;
        self.smooth_delta = if self.ticks == 0 {
            raw_delta
        } else {
            self.smooth_delta + (raw_delta - self.smooth_delta) / SMOOTHING_WINDOW
        };
        self.scaled_delta = raw_delta * self.time_scale;
        self.total_time += f64::from(raw_delta);
        self.ticks += 1;
    }

    /// Real seconds since the previous tick.
    #[inline]
    #[must_use]
    pub fn raw_delta(&self) -> f32 {
        self.raw_delta
    }

    /// Exponential moving average of the real delta.
    #[inline]
    #[must_use]
    pub fn smooth_delta(&self) -> f32 {
        self.smooth_delta
    }

    /// Simulation seconds since the previous tick. Zero while paused.
    #[inline]
    #[must_use]
    pub fn scaled_delta(&self) -> f32 {
        self.scaled_delta
    }

    /// Real seconds since the first tick.
    #[inline]
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the simulation speed. Negative scales are clamped to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
        if self.time_scale > 0.0 {
            self.resume_scale = self.time_scale;
        }
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }

    pub fn pause(&mut self) {
        self.time_scale = 0.0;
    }

    /// Restores the last non-zero time scale.
    pub fn resume(&mut self) {
        self.time_scale = self.resume_scale;
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }
}

/// Measures real time between ticks.
#[derive(Debug, Clone)]
pub struct Clock {
    start_time: Instant,
    last_update: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Creates a new clock starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
        }
    }

    /// Time since the previous call, or since creation.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_update;
        self.last_update = now;
        delta
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
