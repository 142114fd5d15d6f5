/// Frame rate over the last few ticks.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    delta_times: [f32; Self::WINDOW],
    next_index: usize,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub const WINDOW: usize = 8;

    /// A counter reporting close to zero FPS until the window has filled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delta_times: [1e30; Self::WINDOW],
            next_index: 0,
        }
    }

    /// Records a raw tick delta in seconds and returns the updated rate.
    pub fn update(&mut self, raw_delta: f32) -> f32 {
        self.delta_times[self.next_index] = raw_delta;
        self.next_index = (self.next_index + 1) % Self::WINDOW;
        self.fps()
    }

    #[must_use]
    pub fn fps(&self) -> f32 {
        let summed: f32 = self.delta_times.iter().sum();
        Self::WINDOW as f32 / summed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_window_reports_average_rate() {
        let mut counter = FpsCounter::new();
        for _ in 0..FpsCounter::WINDOW {
            counter.update(0.25);
        }
        assert!((counter.fps() - 4.0).abs() < 1e-5);
    }
}
