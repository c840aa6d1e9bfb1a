use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame budget for a target FPS (at least 1 FPS).
///
/// # Example
/// ```
/// use gm_render::fps::frame_budget;
/// assert_eq!(frame_budget(50).as_millis(), 20);
/// assert_eq!(frame_budget(0).as_secs(), 1);
/// ```
#[must_use]
pub fn frame_budget(target_fps: u32) -> Duration {
    Duration::from_secs(1) / target_fps.max(1)
}

/// Sliding-window FPS counter. Zero allocation after init.
///
/// # Example
/// ```
/// use gm_render::fps::FpsCounter;
/// let mut counter = FpsCounter::new(60);
/// counter.tick();
/// assert!(counter.fps() >= 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct FpsCounter {
    /// Timestamps des dernières N frames.
    timestamps: VecDeque<Instant>,
    window: usize,
    fps: f64,
    /// Durée de la dernière frame, en ms.
    pub frame_time_ms: f64,
}

impl FpsCounter {
    /// `window` frames moyennées (minimum 2).
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            timestamps: VecDeque::with_capacity(window + 1),
            window,
            fps: 0.0,
            frame_time_ms: 0.0,
        }
    }

    /// Call once per frame, AFTER rendering.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Same, with an explicit clock.
    pub fn tick_at(&mut self, now: Instant) {
        if let Some(&last) = self.timestamps.back() {
            self.frame_time_ms = now.saturating_duration_since(last).as_secs_f64() * 1000.0;
        }
        self.timestamps.push_back(now);
        if self.timestamps.len() > self.window {
            self.timestamps.pop_front();
        }
        if let Some(&first) = self.timestamps.front() {
            let secs = now.saturating_duration_since(first).as_secs_f64();
            if self.timestamps.len() >= 2 && secs > 0.0 {
                self.fps = (self.timestamps.len() - 1) as f64 / secs;
            }
        }
    }

    /// Mean FPS over the window.
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_ticks_give_expected_rate() {
        let mut counter = FpsCounter::new(10);
        let start = Instant::now();
        for i in 0..20 {
            counter.tick_at(start + Duration::from_millis(i * 25));
        }
        assert!((counter.fps() - 40.0).abs() < 0.5);
        assert!((counter.frame_time_ms - 25.0).abs() < 0.5);
    }

    #[test]
    fn single_tick_reports_zero() {
        let mut counter = FpsCounter::new(1);
        counter.tick();
        assert!(counter.fps().abs() < f64::EPSILON);
    }
}
