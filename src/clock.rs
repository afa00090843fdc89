//! Simulation clock
//!
//! The clock owns the handle of its single pending frame request. Stopping
//! cancels that request, and any frame that arrives with a different id is
//! treated as a ghost and ignored, so a paused or finished run can never be
//! ticked by a stale callback.
//!
//! Frame delivery is abstracted behind [`FrameSource`]: the browser host
//! backs it with `requestAnimationFrame`, headless runs and tests use
//! [`ManualFrames`].

use crate::consts::{MAX_FRAME_GAP_MS, MAX_SUBSTEPS, SIM_DT_MS};

const STEP_EPSILON_MS: f64 = 1e-6;

/// Handle for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Something that can call us back on the next frame
pub trait FrameSource {
    /// Ask for one callback. `None` if the host cannot schedule frames.
    fn request_frame(&mut self) -> Option<FrameId>;
    /// Withdraw a request that has not fired yet
    fn cancel_frame(&mut self, id: FrameId);
}

/// Frame source driven by hand (headless runs and tests)
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_id: u64,
    pending: Vec<FrameId>,
    requested: u64,
    cancelled: u64,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that have neither fired nor been cancelled
    pub fn pending(&self) -> &[FrameId] {
        &self.pending
    }

    /// Fire every outstanding request; the caller delivers them
    pub fn take_pending(&mut self) -> Vec<FrameId> {
        std::mem::take(&mut self.pending)
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameSource for ManualFrames {
    fn request_frame(&mut self) -> Option<FrameId> {
        self.next_id += 1;
        self.requested += 1;
        let id = FrameId(self.next_id);
        self.pending.push(id);
        Some(id)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let before = self.pending.len();
        self.pending.retain(|p| *p != id);
        if self.pending.len() < before {
            self.cancelled += 1;
        }
    }
}

/// Fixed-step scheduler with at most one outstanding frame request
#[derive(Debug, Default)]
pub struct SimulationClock {
    pending: Option<FrameId>,
    last_frame_ms: Option<f64>,
    accumulator: f64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin scheduling. Time spent stopped is never caught up.
    pub fn start(&mut self, frames: &mut impl FrameSource) -> bool {
        if self.pending.is_some() {
            return true;
        }
        self.last_frame_ms = None;
        self.accumulator = 0.0;
        self.schedule_next(frames)
    }

    /// Cancel the outstanding request, if any
    pub fn stop(&mut self, frames: &mut impl FrameSource) {
        if let Some(id) = self.pending.take() {
            frames.cancel_frame(id);
        }
        self.last_frame_ms = None;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Accept a delivered frame and work out how many fixed steps it owes.
    ///
    /// Returns `None` for a frame we are not waiting on. The first frame after
    /// a start runs exactly one step.
    pub fn begin_frame(&mut self, id: FrameId, now_ms: f64) -> Option<u32> {
        if self.pending != Some(id) {
            log::trace!("Ignoring ghost frame {:?} (pending {:?})", id, self.pending);
            return None;
        }
        self.pending = None;

        let steps = match self.last_frame_ms {
            None => 1,
            Some(last) => {
                let gap = (now_ms - last).clamp(0.0, MAX_FRAME_GAP_MS);
                self.accumulator = (self.accumulator + gap).min(SIM_DT_MS * MAX_SUBSTEPS as f64);
                // Epsilon absorbs rounding in host timestamps
                let steps = ((self.accumulator + STEP_EPSILON_MS) / SIM_DT_MS).floor() as u32;
                self.accumulator = (self.accumulator - steps as f64 * SIM_DT_MS).max(0.0);
                steps
            }
        };
        self.last_frame_ms = Some(now_ms);
        Some(steps)
    }

    /// Request the next frame after a completed one
    pub fn schedule_next(&mut self, frames: &mut impl FrameSource) -> bool {
        if self.pending.is_some() {
            return true;
        }
        match frames.request_frame() {
            Some(id) => {
                self.pending = Some(id);
                true
            }
            None => {
                log::warn!("Frame source refused a request; clock stopped");
                false
            }
        }
    }
}
