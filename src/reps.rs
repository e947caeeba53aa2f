use crate::{
    geometry::vertical_offset,
    pose::{Landmark, Missing, Snapshot},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Unknown,
    Up,
    Down,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Unknown
    }
}

/// The phase change that opens a repetition. The reverse change closes it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartEdge {
    DownToUp,
    UpToDown,
}

impl StartEdge {
    fn opens(self, from: Phase, to: Phase) -> bool {
        match self {
            Self::DownToUp => from == Phase::Down && to == Phase::Up,
            Self::UpToDown => from == Phase::Up && to == Phase::Down,
        }
    }

    fn closes(self, from: Phase, to: Phase) -> bool {
        match self {
            Self::DownToUp => from == Phase::Up && to == Phase::Down,
            Self::UpToDown => from == Phase::Down && to == Phase::Up,
        }
    }
}

/// What the counter does with a frame whose form verdict failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gating {
    /// Ignore the frame entirely: the phase is held where it was.
    Freeze,
    /// Track the phase, but a repetition closed on a failing frame is dropped.
    AdvanceWithoutCredit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RepState {
    pub previous_phase: Phase,
    pub rep_in_progress: bool,
    pub rep_count: u32,
}

/// Counts repetitions from the vertical motion of a tracked landmark relative
/// to a reference landmark.
#[derive(Debug, Clone)]
pub struct RepCounter {
    tracked: Landmark,
    reference: Landmark,
    threshold: f32,
    start: StartEdge,
    gating: Gating,
    state: RepState,
}

impl RepCounter {
    pub fn new(tracked: Landmark, reference: Landmark, threshold: f32) -> Self {
        Self {
            tracked,
            reference,
            threshold,
            start: StartEdge::DownToUp,
            gating: Gating::AdvanceWithoutCredit,
            state: RepState::default(),
        }
    }

    pub fn with_start_edge(self, start: StartEdge) -> Self {
        Self { start, ..self }
    }

    pub fn with_gating(self, gating: Gating) -> Self {
        Self { gating, ..self }
    }

    pub fn gating(&self) -> Gating {
        self.gating
    }

    pub fn state(&self) -> RepState {
        self.state
    }

    pub fn rep_count(&self) -> u32 {
        self.state.rep_count
    }

    pub fn phase(&self) -> Phase {
        self.state.previous_phase
    }

    /// Classify the frame. `None` means the offset sits inside the hysteresis
    /// band.
    fn observe(&self, snapshot: &Snapshot) -> Result<Option<Phase>, Missing> {
        let offset = vertical_offset(snapshot.get(self.tracked)?, snapshot.get(self.reference)?);
        Ok(if offset > self.threshold {
            Some(Phase::Down)
        } else if offset < -self.threshold {
            Some(Phase::Up)
        } else {
            None
        })
    }

    /// Consume one frame and return the running count.
    pub fn advance(&mut self, snapshot: &Snapshot, form_ok: bool) -> u32 {
        if !form_ok && self.gating == Gating::Freeze {
            trace!(message = "holding phase on failed form", phase = ?self.state.previous_phase);
            return self.state.rep_count;
        }

        let observed = match self.observe(snapshot) {
            Ok(observed) => observed,
            Err(missing) => {
                debug!(message = "skipping rep tracking", %missing);
                return self.state.rep_count;
            }
        };

        let previous = self.state.previous_phase;
        let phase = observed.unwrap_or(previous);

        if self.start.opens(previous, phase) {
            self.state.rep_in_progress = true;
        } else if self.start.closes(previous, phase) && self.state.rep_in_progress {
            self.state.rep_in_progress = false;
            if form_ok {
                self.state.rep_count += 1;
                debug!(message = "repetition completed", rep_count = self.state.rep_count);
            } else {
                debug!(message = "repetition dropped on failed form");
            }
        }

        self.state.previous_phase = phase;
        self.state.rep_count
    }
}
