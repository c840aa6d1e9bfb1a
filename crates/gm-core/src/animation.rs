use std::time::Duration;

use crate::config::RenderConfig;

/// Auto-rotation, advanced by the main loop's tick.
///
/// No thread and no system timer: once cancelled, nothing mutates the view.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use gm_core::animation::AutoRotate;
/// use gm_core::config::RenderConfig;
///
/// let mut config = RenderConfig::default();
/// let mut spin = AutoRotate::new(0.0, 1.0);
/// spin.tick(Duration::from_millis(500), &mut config);
/// assert!((config.rotation_y - 0.5).abs() < 1e-6);
/// spin.cancel();
/// spin.tick(Duration::from_secs(1), &mut config);
/// assert!((config.rotation_y - 0.5).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct AutoRotate {
    speed_x: f32,
    speed_y: f32,
    active: bool,
}

impl AutoRotate {
    /// Speeds in rad/s. Starts active.
    #[must_use]
    pub fn new(speed_x: f32, speed_y: f32) -> Self {
        Self {
            speed_x,
            speed_y,
            active: true,
        }
    }

    /// Takes the config's current speeds.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            speed_x: config.spin_speed_x,
            speed_y: config.spin_speed_y,
            active: config.auto_rotate,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn resume(&mut self) {
        self.active = true;
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn set_speed(&mut self, speed_x: f32, speed_y: f32) {
        self.speed_x = speed_x;
        self.speed_y = speed_y;
    }

    /// Advances the rotation by `dt`. No effect once cancelled.
    pub fn tick(&self, dt: Duration, config: &mut RenderConfig) {
        if !self.active {
            return;
        }
        let secs = dt.as_secs_f32();
        config.rotation_x = (config.rotation_x + self.speed_x * secs) % std::f32::consts::TAU;
        config.rotation_y = (config.rotation_y + self.speed_y * secs) % std::f32::consts::TAU;
    }
}

/// Plays a frame sequence (animated GIF) at the pace of its delays.
///
/// Does not own the frames: it yields the current index and the owner of
/// the buffers does the lookup.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use gm_core::animation::FramePlayback;
///
/// let mut playback = FramePlayback::new(vec![Duration::from_millis(100); 3]);
/// assert_eq!(playback.tick(Duration::from_millis(50)), None);
/// assert_eq!(playback.tick(Duration::from_millis(60)), Some(1));
/// assert_eq!(playback.tick(Duration::from_millis(200)), Some(0));
/// ```
#[derive(Clone, Debug)]
pub struct FramePlayback {
    delays: Vec<Duration>,
    index: usize,
    elapsed: Duration,
    active: bool,
}

/// Délai minimal par frame, les GIF à délai nul sont courants.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);

impl FramePlayback {
    /// One delay per frame. Zero delays are raised to 20 ms.
    #[must_use]
    pub fn new(delays: Vec<Duration>) -> Self {
        let delays = delays
            .into_iter()
            .map(|d| d.max(MIN_FRAME_DELAY))
            .collect::<Vec<_>>();
        let active = delays.len() > 1;
        Self {
            delays,
            index: 0,
            elapsed: Duration::ZERO,
            active,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.delays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stops on the current frame.
    pub fn cancel(&mut self) {
        self.active = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn resume(&mut self) {
        self.active = self.delays.len() > 1;
    }

    /// Advances by `dt`. Returns the new index if it changed.
    pub fn tick(&mut self, dt: Duration) -> Option<usize> {
        if !self.active || self.delays.is_empty() {
            return None;
        }
        let before = self.index;
        self.elapsed += dt;
        while self.elapsed >= self.delays[self.index] {
            self.elapsed -= self.delays[self.index];
            self.index = (self.index + 1) % self.delays.len();
        }
        (self.index != before).then_some(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_rotate_from_config_respects_flag() {
        let config = RenderConfig {
            auto_rotate: false,
            ..RenderConfig::default()
        };
        assert!(!AutoRotate::from_config(&config).is_active());
    }

    #[test]
    fn auto_rotate_wraps_angles() {
        let mut config = RenderConfig::default();
        let spin = AutoRotate::new(10.0, 0.0);
        spin.tick(Duration::from_secs(1), &mut config);
        assert!(config.rotation_x < std::f32::consts::TAU);
    }

    #[test]
    fn single_frame_playback_never_advances() {
        let mut playback = FramePlayback::new(vec![Duration::from_millis(10)]);
        assert!(!playback.is_active());
        assert_eq!(playback.tick(Duration::from_secs(5)), None);
        assert_eq!(playback.index(), 0);
    }

    #[test]
    fn cancelled_playback_stays_put() {
        let mut playback = FramePlayback::new(vec![Duration::from_millis(100); 4]);
        playback.tick(Duration::from_millis(150));
        assert_eq!(playback.index(), 1);
        playback.cancel();
        assert_eq!(playback.tick(Duration::from_secs(10)), None);
        assert_eq!(playback.index(), 1);
        playback.resume();
        assert_eq!(playback.tick(Duration::from_millis(100)), Some(2));
    }

    #[test]
    fn zero_delays_are_raised() {
        let mut playback = FramePlayback::new(vec![Duration::ZERO; 2]);
        assert_eq!(playback.tick(Duration::from_millis(10)), None);
        assert_eq!(playback.tick(Duration::from_millis(10)), Some(1));
    }
}
