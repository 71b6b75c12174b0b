#![forbid(unsafe_code)]

//! Frame telemetry.
//!
//! A rolling frames-per-second estimate for the optional on-screen readout.
//! The counter owns all of its state: nothing else reads or writes the
//! window. One sample is emitted per ~1000 ms window and the window resets
//! on emission; the cumulative tick count never resets.

use std::time::Duration;

use web_time::Instant;

/// Below this the readout flags the frame rate as struggling.
pub const TARGET_FPS: u32 = 30;

/// One emitted frames-per-second estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsSample {
    /// Rounded frames per second over the closed window.
    pub fps: u32,
    /// Whether the estimate fell below [`TARGET_FPS`].
    pub below_target: bool,
}

/// Counts render-loop ticks and emits an FPS sample once per window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    window_start: Instant,
    frames_in_window: u32,
    total_frames: u64,
    last_sample: Option<FpsSample>,
}

impl FpsCounter {
    /// Create a counter whose first window opens at `now`.
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self::with_window(now, Duration::from_millis(1000))
    }

    /// Create a counter with a custom sampling window.
    #[must_use]
    pub fn with_window(now: Instant, window: Duration) -> Self {
        Self {
            window,
            window_start: now,
            frames_in_window: 0,
            total_frames: 0,
            last_sample: None,
        }
    }

    /// Record one tick. Returns a sample when this tick closes the window.
    pub fn tick(&mut self, now: Instant) -> Option<FpsSample> {
        self.total_frames += 1;
        self.frames_in_window += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let fps = (f64::from(self.frames_in_window) * 1000.0 / elapsed_ms).round() as u32;
        self.frames_in_window = 0;
        self.window_start = now;

        let sample = FpsSample {
            fps,
            below_target: fps < TARGET_FPS,
        };
        self.last_sample = Some(sample);
        Some(sample)
    }

    /// The most recently emitted sample, if any.
    #[must_use]
    pub fn last_sample(&self) -> Option<FpsSample> {
        self.last_sample
    }

    /// Ticks recorded since construction. Never resets.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}
