//! Timing: the fixed-interval simulation tick, the display-rate render loop,
//! and the water bob.
//!
//! All timestamps are host-supplied milliseconds. Nothing here reads a clock.

use std::cell::Cell;
use std::rc::Rc;

use crate::constants::bob::PERIOD_MS;

/// Upper bound on the time a single render frame reports as elapsed.
pub const MAX_FRAME_MS: f64 = 1000.0;

/// Fires a simulation tick once `interval_ms` has passed since the last one.
#[derive(Debug, Clone)]
pub struct TickTimer {
    interval_ms: f64,
    max_dt_ms: f64,
    last: Option<f64>,
    stopped: bool,
}

impl TickTimer {
    pub fn new(interval_ms: f64, max_dt_ms: f64) -> Self {
        Self {
            interval_ms,
            max_dt_ms,
            last: None,
            stopped: false,
        }
    }

    /// At most one tick per call. Returns the capped elapsed time since the
    /// previous tick; the first poll only records the start time.
    pub fn poll(&mut self, now: f64) -> Option<f64> {
        if self.stopped {
            return None;
        }
        let Some(last) = self.last else {
            self.last = Some(now);
            return None;
        };
        let elapsed = now - last;
        if elapsed < self.interval_ms {
            return None;
        }
        self.last = Some(now);
        Some(elapsed.min(self.max_dt_ms))
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// Shared cancellation flag for a [`RenderLoop`].
#[derive(Debug, Clone, Default)]
pub struct StopToken(Rc<Cell<bool>>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

/// Timing handed to every render call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    pub now: f64,
    /// Time since the previous frame, capped at [`MAX_FRAME_MS`].
    pub since_last: f64,
    pub since_start: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RenderLoop {
    start: Option<f64>,
    last: Option<f64>,
    token: StopToken,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> StopToken {
        self.token.clone()
    }

    /// Timing for a frame at `now`, or `None` once stopped.
    pub fn frame(&mut self, now: f64) -> Option<FrameInfo> {
        if self.token.is_stopped() {
            return None;
        }
        let start = *self.start.get_or_insert(now);
        let since_last = self
            .last
            .map(|last| (now - last).clamp(0.0, MAX_FRAME_MS))
            .unwrap_or(0.0);
        self.last = Some(now);
        Some(FrameInfo {
            now,
            since_last,
            since_start: now - start,
        })
    }
}

/// Vertical wave offset at time `t` ms for a given phase and magnitude.
pub fn bob_offset(t: f64, phase_ms: f64, magnitude: f32) -> f32 {
    magnitude * ((t + phase_ms) / PERIOD_MS).sin() as f32
}
