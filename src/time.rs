//! Wall-clock timing for the frame loop.
//!
//! The presentation runs on a millisecond clock: timers are scheduled in
//! milliseconds and the particle pulses are a function of elapsed
//! milliseconds. [`Clock`] is the single source of that value for the window,
//! and also tracks frame count and a periodically refreshed FPS figure.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = Clock::new();
//!
//! // once per frame:
//! clock.tick();
//! presentation.advance_to(clock.elapsed_ms());
//! ```

use std::time::{Duration, Instant};

/// Frame timing since the window opened.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_frame: Instant,
    /// Total elapsed time in milliseconds (cached at the last tick).
    elapsed_ms: f64,
    /// Time between the last two ticks in milliseconds.
    delta_ms: f64,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Clock {
    /// Create a clock starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_ms: 0.0,
            delta_ms: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance to the current instant. Call once per frame.
    ///
    /// Returns the elapsed milliseconds.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`; instants earlier than the last tick count as no time.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let now = now.max(self.last_frame);
        self.delta_ms = now.duration_since(self.last_frame).as_secs_f64() * 1000.0;
        self.last_frame = now;
        self.elapsed_ms = now.duration_since(self.start).as_secs_f64() * 1000.0;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed_ms
    }

    /// Milliseconds since the clock started, as of the last tick.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Whole milliseconds since start, for the timer queue.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms as u64
    }

    /// Milliseconds between the last two ticks.
    #[inline]
    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// The instant the clock started.
    #[inline]
    pub fn start_instant(&self) -> Instant {
        self.start
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
