#![allow(dead_code)]

use async_trait::async_trait;
use rep_tracker::error::Result;
use rep_tracker::exercise::JointTriple;
use rep_tracker::pose::{Landmark, LandmarkFrame, LandmarkIndex::*};
use rep_tracker::source::{LandmarkSource, LandmarkStream};

pub const LEFT_LEG: JointTriple = [LeftHip, LeftKnee, LeftAnkle];
pub const RIGHT_LEG: JointTriple = [RightHip, RightKnee, RightAnkle];
pub const RIGHT_ARM: JointTriple = [RightShoulder, RightElbow, RightWrist];

/// Full-body frame with each listed joint triple bent to the given angle.
///
/// The first point sits straight above the vertex and the third is rotated
/// by `angle` from it, so the measured angle equals the input.
pub fn pose_frame(timestamp_ms: u64, bends: &[(JointTriple, f32)]) -> LandmarkFrame {
    let mut landmarks = vec![Landmark::with_visibility(0.5, 0.5, 1.0); 33];
    for (i, (triple, angle)) in bends.iter().enumerate() {
        let [a, b, c] = *triple;
        let x = 0.3 + 0.2 * i as f32;
        let heading = (angle - 90.0).to_radians();
        landmarks[a as usize] = Landmark::with_visibility(x, 0.3, 0.9);
        landmarks[b as usize] = Landmark::with_visibility(x, 0.5, 0.9);
        landmarks[c as usize] =
            Landmark::with_visibility(x + 0.2 * heading.cos(), 0.5 + 0.2 * heading.sin(), 0.9);
    }
    LandmarkFrame::new(timestamp_ms, landmarks)
}

/// Both knees at `angle`
pub fn squat_frame(timestamp_ms: u64, angle: f32) -> LandmarkFrame {
    pose_frame(timestamp_ms, &[(LEFT_LEG, angle), (RIGHT_LEG, angle)])
}

pub fn curl_frame(timestamp_ms: u64, angle: f32) -> LandmarkFrame {
    pose_frame(timestamp_ms, &[(RIGHT_ARM, angle)])
}

/// Replays a fixed list of frames
pub struct VecSource {
    pub frames: Vec<LandmarkFrame>,
    pub opened: usize,
}

impl VecSource {
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self { frames, opened: 0 }
    }
}

#[async_trait]
impl LandmarkSource for VecSource {
    async fn open(&mut self) -> Result<LandmarkStream> {
        self.opened += 1;
        Ok(Box::pin(tokio_stream::iter(self.frames.clone())))
    }

    fn describe(&self) -> String {
        format!("{} scripted frames", self.frames.len())
    }
}
