//! Frame pacing
//!
//! The workshop boards ran the loop at a fixed cadence by sleeping out the
//! rest of each frame. `FramePacer` does the same on a desktop for headless
//! runs; the window host paces with macroquad's clock instead.

use std::time::{Duration, Instant};

/// Largest step handed to the simulation (seconds). Longer stalls (window
/// drag, debugger) are cut down so bodies don't tunnel through tiles.
pub const MAX_STEP: f32 = 0.1;

/// FPS limit setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FpsLimit {
    /// 30 FPS, the cadence of the original board demos
    #[default]
    Fps30,
    /// 60 FPS (smooth gameplay)
    Fps60,
    /// Unlocked (as fast as possible)
    Unlocked,
}

impl FpsLimit {
    /// Get the target frame time in seconds (None = unlocked)
    pub fn frame_time(&self) -> Option<f64> {
        match self {
            FpsLimit::Fps30 => Some(1.0 / 30.0),
            FpsLimit::Fps60 => Some(1.0 / 60.0),
            FpsLimit::Unlocked => None,
        }
    }

    /// Cycle to next value
    pub fn next(self) -> Self {
        match self {
            FpsLimit::Fps30 => FpsLimit::Fps60,
            FpsLimit::Fps60 => FpsLimit::Unlocked,
            FpsLimit::Unlocked => FpsLimit::Fps30,
        }
    }

    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            FpsLimit::Fps30 => "30",
            FpsLimit::Fps60 => "60",
            FpsLimit::Unlocked => "Unlocked",
        }
    }

    /// Parse a command-line value ("30", "60", "unlocked")
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "30" => Some(FpsLimit::Fps30),
            "60" => Some(FpsLimit::Fps60),
            "unlocked" | "0" => Some(FpsLimit::Unlocked),
            _ => None,
        }
    }
}

/// Sleeps out the remainder of each frame to hold the target rate
#[derive(Debug)]
pub struct FramePacer {
    limit: FpsLimit,
    frame_start: Option<Instant>,
}

impl FramePacer {
    pub fn new(limit: FpsLimit) -> Self {
        Self { limit, frame_start: None }
    }

    pub fn limit(&self) -> FpsLimit {
        self.limit
    }

    pub fn set_limit(&mut self, limit: FpsLimit) {
        self.limit = limit;
    }

    /// Mark the start of a frame and return the elapsed time since the
    /// previous one, clamped to `MAX_STEP`. The first frame reports the
    /// nominal frame time.
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.frame_start {
            Some(prev) => now.duration_since(prev).as_secs_f32(),
            None => self.limit.frame_time().unwrap_or(1.0 / 60.0) as f32,
        };
        self.frame_start = Some(now);
        dt.min(MAX_STEP)
    }

    /// Wait until the frame's time slot is used up
    pub fn end_frame(&self) {
        let (Some(target), Some(start)) = (self.limit.frame_time(), self.frame_start) else {
            return;
        };
        let target = Duration::from_secs_f64(target);
        // Sleep for bulk, then spin-wait for precision
        let spin_margin = Duration::from_millis(2);
        while start.elapsed() + spin_margin < target {
            std::thread::sleep(Duration::from_millis(1));
        }
        while start.elapsed() < target {
            std::hint::spin_loop();
        }
    }
}
