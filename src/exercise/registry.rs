use tracing::debug;

use super::profile::{Cues, ExerciseProfile, JointTriple, RepDirection};
use crate::error::{RepError, Result};
use crate::pose::LandmarkIndex::{self, *};

/// Built-in profile row
struct ProfileSpec {
    key: &'static str,
    label: &'static str,
    icon: &'static str,
    tip: &'static str,
    joints: JointTriple,
    mirror_joints: Option<JointTriple>,
    down_angle: f32,
    up_angle: f32,
    rep_direction: RepDirection,
    cues: [&'static str; 3], // down, up, mid
}

const LEFT_LEG: [LandmarkIndex; 3] = [LeftHip, LeftKnee, LeftAnkle];
const RIGHT_LEG: [LandmarkIndex; 3] = [RightHip, RightKnee, RightAnkle];
const LEFT_ARM: [LandmarkIndex; 3] = [LeftShoulder, LeftElbow, LeftWrist];
const RIGHT_ARM: [LandmarkIndex; 3] = [RightShoulder, RightElbow, RightWrist];

const BUILTIN_PROFILES: [ProfileSpec; 4] = [
    ProfileSpec {
        key: "squat",
        label: "Squats",
        icon: "🏋️",
        tip: "Stand sideways. Squat until knee angle < 90°, then stand = 1 rep.",
        joints: LEFT_LEG,
        mirror_joints: Some(RIGHT_LEG),
        down_angle: 90.0,
        up_angle: 160.0,
        rep_direction: RepDirection::DownToUp,
        cues: ["Great depth! Drive up ↑", "Lower until knee < 90°", "Keep going, lower!"],
    },
    ProfileSpec {
        key: "pushup",
        label: "Push-Ups",
        icon: "💪",
        tip: "Plank sideways. Lower until elbows < 90°, then push up = 1 rep.",
        joints: LEFT_ARM,
        mirror_joints: Some(RIGHT_ARM),
        down_angle: 90.0,
        up_angle: 160.0,
        rep_direction: RepDirection::DownToUp,
        cues: ["Push back up! 💥", "Lower chest to floor", "Elbows to 90°, lower!"],
    },
    ProfileSpec {
        key: "curl",
        label: "Curls",
        icon: "🦾",
        tip: "Face camera. Curl right arm to < 40°, then extend = 1 rep.",
        joints: RIGHT_ARM,
        mirror_joints: None,
        down_angle: 160.0,
        up_angle: 40.0,
        rep_direction: RepDirection::UpToDown,
        cues: ["Curl it up! 💪", "Squeeze at top!", "Keep curling!"],
    },
    ProfileSpec {
        key: "lunge",
        label: "Lunges",
        icon: "🦵",
        tip: "Stand sideways. Drop front knee to 90°, then return = 1 rep.",
        joints: LEFT_LEG,
        mirror_joints: None,
        down_angle: 90.0,
        up_angle: 160.0,
        rep_direction: RepDirection::DownToUp,
        cues: ["Nice depth! Rise up ↑", "Step & drop knee to 90°", "Lower your back knee!"],
    },
];

impl ProfileSpec {
    fn to_profile(&self) -> ExerciseProfile {
        let [down, up, mid] = self.cues;
        ExerciseProfile {
            key: self.key.to_string(),
            label: self.label.to_string(),
            icon: self.icon.to_string(),
            tip: self.tip.to_string(),
            joints: self.joints,
            mirror_joints: self.mirror_joints,
            down_angle: self.down_angle,
            up_angle: self.up_angle,
            rep_direction: self.rep_direction,
            cues: Cues {
                down: down.to_string(),
                up: up.to_string(),
                mid: mid.to_string(),
            },
        }
    }
}

/// Read-only lookup of exercise profiles by key, in registration order.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<ExerciseProfile>,
}

impl ProfileRegistry {
    /// The four built-in exercises: squat, pushup, curl, lunge
    pub fn builtin() -> Self {
        Self {
            profiles: BUILTIN_PROFILES.iter().map(ProfileSpec::to_profile).collect(),
        }
    }

    /// Registry with only the given profiles
    pub fn from_profiles(profiles: impl IntoIterator<Item = ExerciseProfile>) -> Result<Self> {
        let mut registry = Self {
            profiles: Vec::new(),
        };
        for profile in profiles {
            registry.insert(profile)?;
        }
        Ok(registry)
    }

    /// Built-ins plus `extra`; an extra profile with an existing key replaces it.
    pub fn with_overrides(extra: impl IntoIterator<Item = ExerciseProfile>) -> Result<Self> {
        let mut registry = Self::builtin();
        for profile in extra {
            registry.insert(profile)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, profile: ExerciseProfile) -> Result<()> {
        profile.validate()?;
        match self.profiles.iter_mut().find(|p| p.key == profile.key) {
            Some(existing) => {
                debug!(key = %profile.key, "overriding exercise profile");
                *existing = profile;
            }
            None => self.profiles.push(profile),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&ExerciseProfile> {
        self.profiles
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| RepError::ProfileNotFound(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
