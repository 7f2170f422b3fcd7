//! Wall-clock frame pacing for watched runs
//!
//! Headless evaluation never paces; the CLI's realtime mode waits out the
//! remainder of each frame so a viewer sees the run at 60 ticks per second.

use std::time::{Duration, Instant};

pub const DEFAULT_FPS: u32 = 60;

pub struct FramePacer {
    frame: Duration,
    next: Instant,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        let frame = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        Self {
            frame,
            next: Instant::now() + frame,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }

    /// Sleep until the next frame boundary
    ///
    /// Returns how long it slept. A caller that fell behind does not sleep
    /// and the schedule restarts from now instead of trying to catch up.
    pub fn wait(&mut self) -> Duration {
        let now = Instant::now();
        if now >= self.next {
            self.next = now + self.frame;
            return Duration::ZERO;
        }
        let remaining = self.next - now;
        std::thread::sleep(remaining);
        self.next += self.frame;
        remaining
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}
