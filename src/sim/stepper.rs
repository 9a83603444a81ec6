//! Fixed-timestep driver for variable frame rates

use super::state::{FrameOutcome, Session};
use super::tick::{DashDirection, FrameInput};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Accumulates real frame time and advances the session in `SIM_DT` steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    /// Dash pressed on a frame too short to run a substep
    queued_dash: Option<DashDirection>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time banked but not yet simulated
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Run as many fixed substeps as `frame_dt` pays for (capped at
    /// `MAX_SUBSTEPS`). One-shot inputs reach the first substep only; a dash
    /// waits for the next substep when this frame runs none.
    pub fn step(&mut self, session: &mut Session, input: &FrameInput, frame_dt: f32) -> FrameOutcome {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += frame_dt;
        if input.dash.is_some() {
            self.queued_dash = input.dash;
        }

        // Pause must toggle even when this frame pays for no substep
        if input.pause && self.accumulator < SIM_DT {
            let pause = FrameInput {
                pause: true,
                ..input.held()
            };
            return session.advance(&pause, 0.0);
        }

        let first = FrameInput {
            dash: self.queued_dash,
            ..input.clone()
        };
        let held = input.held();
        let mut current = &first;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let outcome = session.advance(current, SIM_DT);
            self.accumulator -= SIM_DT;
            self.queued_dash = None;
            substeps += 1;
            current = &held;

            if outcome == FrameOutcome::PlayerDied {
                self.accumulator = 0.0;
                return outcome;
            }
        }

        // Drop backlog we refused to simulate
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        if session.is_alive() {
            FrameOutcome::Continue
        } else {
            FrameOutcome::PlayerDied
        }
    }
}
