//! Rolling frames-per-second estimate.
//!
//! Counts frames in a 1-second sliding window and recomputes the
//! ratio when the window elapses. Touched only from the presentation
//! adapter's single context, so no interior mutability is needed.

use std::time::{Duration, Instant};

/// Windowed frame-rate counter.
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f64,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    /// Record one frame. Returns the freshly computed rate when the
    /// 1-second window rolls over, `None` otherwise.
    pub fn record(&mut self) -> Option<f64> {
        self.record_at(Instant::now())
    }

    fn record_at(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed < Self::WINDOW {
            return None;
        }
        self.fps = self.frames as f64 / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    /// The rate computed at the last window rollover.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Forget all samples and restart the window.
    pub fn reset(&mut self) {
        self.window_start = Instant::now();
        self.frames = 0;
        self.fps = 0.0;
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
