use std::time::{Duration, Instant};

/// Counts frames and reports the rate once per window.
pub struct FpsMeter {
    window: Duration,
    frames: u32,
    window_start: Option<Instant>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            frames: 0,
            window_start: None,
        }
    }

    /// Record one frame at `now`; returns the frames-per-second figure
    /// when the current window has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.window {
            return None;
        }

        let fps = (self.frames as f32 / elapsed.as_secs_f32()).round() as u32;
        self.frames = 0;
        self.window_start = Some(now);
        Some(fps)
    }

    pub fn reset(&mut self) {
        self.frames = 0;
        self.window_start = None;
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}
