use super::smooth::AngleSmoother;
use super::stage::Stage;
use crate::exercise::ExerciseProfile;
use crate::pose::{Landmark, LandmarkFrame};

/// Rep count and current stage of one tracking session.
///
/// `stage == None` until the first threshold crossing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepState {
    pub reps: u32,
    pub stage: Option<Stage>,
}

/// Outcome of feeding one angle through the stage machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageUpdate {
    /// Threshold crossed this frame; `None` inside the hysteresis band
    pub crossed: Option<Stage>,
    pub stage: Option<Stage>,
    /// 0 or 1
    pub rep_increment: u32,
}

impl RepState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `angle` and advance the stage, counting on the profile's rep edge.
    ///
    /// Inside the band the stage is held. Any crossing to a different stage
    /// updates it; only the configured edge increments `reps`, and the first
    /// assignment from the initial state never does.
    pub fn advance(&mut self, profile: &ExerciseProfile, angle: f32) -> StageUpdate {
        let crossed = profile.classify(angle);
        let mut rep_increment = 0;

        if let Some(next) = crossed {
            if self.stage != Some(next) {
                if profile.rep_direction.counts(self.stage, next) {
                    rep_increment = 1;
                    self.reps += 1;
                }
                self.stage = Some(next);
            }
        }

        StageUpdate {
            crossed,
            stage: self.stage,
            rep_increment,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of processing one landmark frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    pub angle: f32,
    pub vertex: Landmark,
    pub stage: Option<Stage>,
    pub feedback: String,
    pub rep_increment: u32,
    pub reps: u32,
}

/// Measure, classify and count a single frame without smoothing.
///
/// Returns `None` (state untouched) when the profile's landmarks are missing
/// or below `min_visibility`.
pub fn process_frame(
    frame: &LandmarkFrame,
    profile: &ExerciseProfile,
    state: &mut RepState,
    min_visibility: f32,
) -> Option<FrameAnalysis> {
    let measurement = profile.measure(frame, min_visibility)?;
    Some(analyze(profile, state, measurement.angle, measurement.vertex))
}

fn analyze(profile: &ExerciseProfile, state: &mut RepState, angle: f32, vertex: Landmark) -> FrameAnalysis {
    let update = state.advance(profile, angle);
    FrameAnalysis {
        angle,
        vertex,
        stage: update.stage,
        feedback: profile.cues.for_crossing(update.crossed).to_string(),
        rep_increment: update.rep_increment,
        reps: state.reps,
    }
}

/// Stateful counter: smoothing + stage machine for the active exercise.
pub struct RepCounter {
    state: RepState,
    smoother: AngleSmoother,
    min_visibility: f32,
}

impl RepCounter {
    pub fn new(smoother: AngleSmoother, min_visibility: f32) -> Self {
        Self {
            state: RepState::new(),
            smoother,
            min_visibility,
        }
    }

    pub fn process(&mut self, frame: &LandmarkFrame, profile: &ExerciseProfile) -> Option<FrameAnalysis> {
        let measurement = profile.measure(frame, self.min_visibility)?;
        let angle = self.smoother.apply(measurement.angle, frame.timestamp_ms);
        Some(analyze(profile, &mut self.state, angle, measurement.vertex))
    }

    /// Clear reps, stage and smoothing history
    pub fn reset(&mut self) {
        self.state.reset();
        self.smoother.reset();
    }

    pub fn state(&self) -> RepState {
        self.state
    }

    pub fn reps(&self) -> u32 {
        self.state.reps
    }

    pub fn stage(&self) -> Option<Stage> {
        self.state.stage
    }
}
