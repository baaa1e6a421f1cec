use serde::{Deserialize, Serialize};

use crate::counter::Stage;
use crate::error::{RepError, Result};
use crate::pose::{angle_at, Landmark, LandmarkFrame, LandmarkIndex};

/// Landmarks (A, B, C); the angle is measured at B.
pub type JointTriple = [LandmarkIndex; 3];

/// Which stage edge completes one repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepDirection {
    DownToUp,
    UpToDown,
}

impl RepDirection {
    /// Whether moving from `from` to `to` completes a rep.
    /// The first stage assignment (`from == None`) never counts.
    pub fn counts(self, from: Option<Stage>, to: Stage) -> bool {
        matches!(
            (self, from, to),
            (Self::DownToUp, Some(Stage::Down), Stage::Up) | (Self::UpToDown, Some(Stage::Up), Stage::Down)
        )
    }
}

/// Coaching text per stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cues {
    pub down: String,
    pub up: String,
    pub mid: String,
}

impl Cues {
    /// `None` is the hysteresis band, i.e. no threshold crossed this frame
    pub fn for_crossing(&self, crossed: Option<Stage>) -> &str {
        match crossed {
            Some(Stage::Down) => &self.down,
            Some(Stage::Up) => &self.up,
            None => &self.mid,
        }
    }
}

/// Tracked angle of one frame together with the vertex it was measured at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub angle: f32,
    /// B of the primary joint triple
    pub vertex: Landmark,
}

/// Immutable per-exercise configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: String,
    /// How-to hint shown when the exercise is selected
    #[serde(default)]
    pub tip: String,
    pub joints: JointTriple,
    #[serde(default)]
    pub mirror_joints: Option<JointTriple>,
    pub down_angle: f32,
    pub up_angle: f32,
    pub rep_direction: RepDirection,
    pub cues: Cues,
}

impl ExerciseProfile {
    /// Display name, falling back to the key
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    /// `down_angle` above `up_angle`, e.g. a curl where "down" is the extended arm
    pub fn is_inverted(&self) -> bool {
        self.down_angle > self.up_angle
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| RepError::InvalidProfile {
            key: self.key.clone(),
            reason: reason.to_string(),
        };

        if self.key.trim().is_empty() {
            return Err(invalid("empty key"));
        }
        for angle in [self.down_angle, self.up_angle] {
            if !angle.is_finite() || !(0.0..=180.0).contains(&angle) {
                return Err(invalid("threshold angles must lie within 0..=180 degrees"));
            }
        }
        if self.down_angle == self.up_angle {
            return Err(invalid("down_angle and up_angle must differ"));
        }
        Ok(())
    }

    /// Measure the tracked angle, averaging with the mirrored side when configured.
    ///
    /// Returns `None` when a required landmark is absent from the frame. The
    /// visibility gate applies per side: a mirrored profile needs only one side
    /// at or above `min_visibility`, since a sideways stance hides the far limb.
    /// Both sides still contribute to the average, and the vertex comes from
    /// the visible side.
    pub fn measure(&self, frame: &LandmarkFrame, min_visibility: f32) -> Option<Measurement> {
        let near = Side::read(frame, &self.joints, min_visibility)?;
        let Some(mirror) = &self.mirror_joints else {
            return near.visible.then_some(Measurement {
                angle: near.angle,
                vertex: near.vertex,
            });
        };

        let far = Side::read(frame, mirror, min_visibility)?;
        let vertex = match (near.visible, far.visible) {
            (true, _) => near.vertex,
            (false, true) => far.vertex,
            (false, false) => return None,
        };
        Some(Measurement {
            angle: (near.angle + far.angle) / 2.0,
            vertex,
        })
    }

    /// Threshold crossed by `angle`, or `None` inside the hysteresis band.
    ///
    /// For inverted profiles "down" lies beyond `down_angle` on the side away
    /// from `up_angle`, so both orderings are handled by the same two tests.
    pub fn classify(&self, angle: f32) -> Option<Stage> {
        let (past_down, past_up) = if self.is_inverted() {
            (angle > self.down_angle, angle < self.up_angle)
        } else {
            (angle < self.down_angle, angle > self.up_angle)
        };

        if past_down {
            Some(Stage::Down)
        } else if past_up {
            Some(Stage::Up)
        } else {
            None
        }
    }
}

/// One joint triple as seen in a frame
struct Side {
    angle: f32,
    vertex: Landmark,
    visible: bool,
}

impl Side {
    fn read(frame: &LandmarkFrame, joints: &JointTriple, min_visibility: f32) -> Option<Self> {
        let [a, b, c] = *joints;
        let (a, b, c) = (frame.get(a)?, frame.get(b)?, frame.get(c)?);
        Some(Self {
            angle: angle_at(a, b, c),
            vertex: *b,
            visible: [a, b, c].iter().all(|lm| lm.is_visible(min_visibility)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LandmarkIndex::*;

    fn profile(down: f32, up: f32, direction: RepDirection) -> ExerciseProfile {
        ExerciseProfile {
            key: "test".to_string(),
            label: String::new(),
            icon: String::new(),
            tip: String::new(),
            joints: [LeftHip, LeftKnee, LeftAnkle],
            mirror_joints: None,
            down_angle: down,
            up_angle: up,
            rep_direction: direction,
            cues: Cues {
                down: "d".to_string(),
                up: "u".to_string(),
                mid: "m".to_string(),
            },
        }
    }

    fn frame_with(points: &[(LandmarkIndex, (f32, f32))]) -> LandmarkFrame {
        let mut landmarks = vec![Landmark::with_visibility(0.0, 0.0, 1.0); LandmarkIndex::COUNT];
        for (idx, (x, y)) in points {
            landmarks[*idx as usize] = Landmark::with_visibility(*x, *y, 1.0);
        }
        LandmarkFrame::new(0, landmarks)
    }

    #[test]
    fn test_rep_direction_counts() {
        use Stage::*;
        assert!(RepDirection::DownToUp.counts(Some(Down), Up));
        assert!(!RepDirection::DownToUp.counts(Some(Up), Down));
        assert!(!RepDirection::DownToUp.counts(None, Up));
        assert!(RepDirection::UpToDown.counts(Some(Up), Down));
        assert!(!RepDirection::UpToDown.counts(Some(Down), Up));
        assert!(!RepDirection::UpToDown.counts(None, Down));
    }

    #[test]
    fn test_classify_normal_order() {
        let p = profile(90.0, 160.0, RepDirection::DownToUp);
        assert_eq!(p.classify(80.0), Some(Stage::Down));
        assert_eq!(p.classify(170.0), Some(Stage::Up));
        assert_eq!(p.classify(90.0), None);
        assert_eq!(p.classify(125.0), None);
        assert_eq!(p.classify(160.0), None);
    }

    #[test]
    fn test_classify_inverted_order() {
        let p = profile(160.0, 40.0, RepDirection::UpToDown);
        assert!(p.is_inverted());
        assert_eq!(p.classify(170.0), Some(Stage::Down));
        assert_eq!(p.classify(35.0), Some(Stage::Up));
        assert_eq!(p.classify(90.0), None);
        assert_eq!(p.classify(160.0), None);
        assert_eq!(p.classify(40.0), None);
    }

    #[test]
    fn test_cues_for_crossing() {
        let p = profile(90.0, 160.0, RepDirection::DownToUp);
        assert_eq!(p.cues.for_crossing(Some(Stage::Down)), "d");
        assert_eq!(p.cues.for_crossing(Some(Stage::Up)), "u");
        assert_eq!(p.cues.for_crossing(None), "m");
    }

    #[test]
    fn test_measure_right_angle() {
        let p = profile(90.0, 160.0, RepDirection::DownToUp);
        let frame = frame_with(&[
            (LeftHip, (0.5, 0.4)),
            (LeftKnee, (0.5, 0.6)),
            (LeftAnkle, (0.7, 0.6)),
        ]);
        let m = p.measure(&frame, 0.5).unwrap();
        assert!((m.angle - 90.0).abs() < 1e-3);
        assert_eq!(m.vertex.x, 0.5);
        assert_eq!(m.vertex.y, 0.6);
    }

    #[test]
    fn test_measure_mirror_average() {
        let mut p = profile(90.0, 160.0, RepDirection::DownToUp);
        p.mirror_joints = Some([RightHip, RightKnee, RightAnkle]);
        let frame = frame_with(&[
            // left: 90°
            (LeftHip, (0.5, 0.4)),
            (LeftKnee, (0.5, 0.6)),
            (LeftAnkle, (0.7, 0.6)),
            // right: straight, 180°
            (RightHip, (0.3, 0.4)),
            (RightKnee, (0.3, 0.6)),
            (RightAnkle, (0.3, 0.8)),
        ]);
        let m = p.measure(&frame, 0.5).unwrap();
        assert!((m.angle - 135.0).abs() < 1e-3);
    }

    #[test]
    fn test_measure_low_visibility() {
        let p = profile(90.0, 160.0, RepDirection::DownToUp);
        let mut frame = frame_with(&[
            (LeftHip, (0.5, 0.4)),
            (LeftKnee, (0.5, 0.6)),
            (LeftAnkle, (0.7, 0.6)),
        ]);
        frame.landmarks[LeftKnee as usize].visibility = Some(0.2);
        assert!(p.measure(&frame, 0.5).is_none());
        assert!(p.measure(&frame, 0.1).is_some());
    }

    #[test]
    fn test_measure_mirror_one_side_occluded() {
        let mut p = profile(90.0, 160.0, RepDirection::DownToUp);
        p.mirror_joints = Some([RightHip, RightKnee, RightAnkle]);
        let mut frame = frame_with(&[
            (LeftHip, (0.5, 0.4)),
            (LeftKnee, (0.5, 0.6)),
            (LeftAnkle, (0.7, 0.6)),
            (RightHip, (0.3, 0.4)),
            (RightKnee, (0.3, 0.6)),
            (RightAnkle, (0.5, 0.6)),
        ]);
        for idx in [RightHip, RightKnee, RightAnkle] {
            frame.landmarks[idx as usize].visibility = Some(0.3);
        }
        let m = p.measure(&frame, 0.5).unwrap();
        assert!((m.angle - 90.0).abs() < 1e-3);
        assert_eq!(m.vertex.x, 0.5);

        // near side hidden instead: vertex moves to the far knee
        for idx in [RightHip, RightKnee, RightAnkle] {
            frame.landmarks[idx as usize].visibility = Some(0.9);
        }
        frame.landmarks[LeftKnee as usize].visibility = Some(0.1);
        assert_eq!(p.measure(&frame, 0.5).unwrap().vertex.x, 0.3);

        frame.landmarks[RightAnkle as usize].visibility = Some(0.1);
        assert!(p.measure(&frame, 0.5).is_none());
    }

    #[test]
    fn test_measure_missing_landmarks() {
        let p = profile(90.0, 160.0, RepDirection::DownToUp);
        assert!(p.measure(&LandmarkFrame::empty(0), 0.0).is_none());
    }

    #[test]
    fn test_validate() {
        assert!(profile(90.0, 160.0, RepDirection::DownToUp).validate().is_ok());
        assert!(profile(90.0, 90.0, RepDirection::DownToUp).validate().is_err());
        assert!(profile(-5.0, 160.0, RepDirection::DownToUp).validate().is_err());
        assert!(profile(90.0, f32::NAN, RepDirection::DownToUp).validate().is_err());
        let mut p = profile(90.0, 160.0, RepDirection::DownToUp);
        p.key = " ".to_string();
        assert!(p.validate().is_err());
    }
}
