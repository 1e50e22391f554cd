//! Per-frame bookkeeping

use std::time::{Duration, Instant};

/// Frame counter and timing for the game loop
#[derive(Debug, Default)]
pub struct FrameStats {
    frame_count: u64,
    last_frame_time: Duration,
    frame_start: Option<Instant>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a frame and bump the counter
    pub fn begin_frame(&mut self) -> u64 {
        self.frame_count += 1;
        self.frame_start = Some(Instant::now());
        self.frame_count
    }

    /// Mark the end of the current frame and return how long it took
    pub fn end_frame(&mut self) -> Duration {
        let elapsed = self
            .frame_start
            .take()
            .map(|start| start.elapsed())
            .unwrap_or_default();
        self.last_frame_time = elapsed;
        tracing::trace!(
            "Frame {} took {}us",
            self.frame_count,
            elapsed.as_micros()
        );
        elapsed
    }

    /// Number of frames begun so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Duration of the last completed frame
    pub fn last_frame_time(&self) -> Duration {
        self.last_frame_time
    }
}
