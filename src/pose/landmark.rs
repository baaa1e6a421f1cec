use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard 33-point pose landmark layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    pub const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Upper-case name as used in profile tables (`LEFT_SHOULDER`)
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "NOSE",
            Self::LeftEyeInner => "LEFT_EYE_INNER",
            Self::LeftEye => "LEFT_EYE",
            Self::LeftEyeOuter => "LEFT_EYE_OUTER",
            Self::RightEyeInner => "RIGHT_EYE_INNER",
            Self::RightEye => "RIGHT_EYE",
            Self::RightEyeOuter => "RIGHT_EYE_OUTER",
            Self::LeftEar => "LEFT_EAR",
            Self::RightEar => "RIGHT_EAR",
            Self::MouthLeft => "MOUTH_LEFT",
            Self::MouthRight => "MOUTH_RIGHT",
            Self::LeftShoulder => "LEFT_SHOULDER",
            Self::RightShoulder => "RIGHT_SHOULDER",
            Self::LeftElbow => "LEFT_ELBOW",
            Self::RightElbow => "RIGHT_ELBOW",
            Self::LeftWrist => "LEFT_WRIST",
            Self::RightWrist => "RIGHT_WRIST",
            Self::LeftPinky => "LEFT_PINKY",
            Self::RightPinky => "RIGHT_PINKY",
            Self::LeftIndex => "LEFT_INDEX",
            Self::RightIndex => "RIGHT_INDEX",
            Self::LeftThumb => "LEFT_THUMB",
            Self::RightThumb => "RIGHT_THUMB",
            Self::LeftHip => "LEFT_HIP",
            Self::RightHip => "RIGHT_HIP",
            Self::LeftKnee => "LEFT_KNEE",
            Self::RightKnee => "RIGHT_KNEE",
            Self::LeftAnkle => "LEFT_ANKLE",
            Self::RightAnkle => "RIGHT_ANKLE",
            Self::LeftHeel => "LEFT_HEEL",
            Self::RightHeel => "RIGHT_HEEL",
            Self::LeftFootIndex => "LEFT_FOOT_INDEX",
            Self::RightFootIndex => "RIGHT_FOOT_INDEX",
        }
    }
}

impl fmt::Display for LandmarkIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LandmarkIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|idx| idx.name() == wanted)
            .ok_or_else(|| format!("unknown landmark '{}'", s))
    }
}

/// Single landmark
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X (0.0..=1.0, relative to frame width)
    pub x: f32,
    /// Normalized Y (0.0..=1.0, relative to frame height)
    pub y: f32,
    /// Detection confidence; absent means the estimator did not report one
    #[serde(default)]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, visibility: None }
    }

    pub fn with_visibility(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            visibility: Some(visibility),
        }
    }

    /// Landmarks without a reported visibility always pass.
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility.map_or(true, |v| v >= threshold)
    }
}

/// One frame of landmarks from the pose estimator.
///
/// An empty landmark list means no body was detected in that frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(timestamp_ms: u64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ms,
            landmarks,
        }
    }

    /// Frame with no detected body
    pub fn empty(timestamp_ms: u64) -> Self {
        Self::new(timestamp_ms, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks.get(index as usize)
    }

    /// Flip horizontally (x -> 1 - x) to match a mirrored camera preview
    pub fn mirrored(&self) -> Self {
        let landmarks = self
            .landmarks
            .iter()
            .map(|lm| Landmark {
                x: 1.0 - lm.x,
                ..*lm
            })
            .collect();
        Self::new(self.timestamp_ms, landmarks)
    }
}
