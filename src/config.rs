use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{RepError, Result};
use crate::exercise::{ExerciseProfile, ProfileRegistry};

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub smooth: SmoothConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Extra or replacement exercise profiles
    #[serde(default)]
    pub profiles: Vec<ExerciseProfile>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Exercise selected when the session starts
    #[serde(default = "default_exercise")]
    pub exercise: String,
    /// Frames whose tracked joints fall below this visibility are skipped
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f32,
    /// Flip landmarks horizontally to match a mirrored selfie preview
    #[serde(default = "default_mirror_x")]
    pub mirror_x: bool,
}

fn default_exercise() -> String { "squat".to_string() }
fn default_min_visibility() -> f32 { 0.5 }
fn default_mirror_x() -> bool { true }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exercise: default_exercise(),
            min_visibility: default_min_visibility(),
            mirror_x: default_mirror_x(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmoothMode {
    #[default]
    None,
    Ema,
    OneEuro,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmoothConfig {
    #[serde(default)]
    pub mode: SmoothMode,
    /// EMA weight of the newest angle (1.0 = no smoothing)
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// One Euro minimum cutoff (Hz)
    #[serde(default = "default_min_cutoff")]
    pub min_cutoff: f32,
    /// One Euro speed coefficient
    #[serde(default = "default_beta")]
    pub beta: f32,
    /// One Euro derivative cutoff (Hz)
    #[serde(default = "default_d_cutoff")]
    pub d_cutoff: f32,
}

fn default_alpha() -> f32 { 0.5 }
fn default_min_cutoff() -> f32 { 1.0 }
fn default_beta() -> f32 { 0.01 }
fn default_d_cutoff() -> f32 { 1.0 }

impl Default for SmoothConfig {
    fn default() -> Self {
        Self {
            mode: SmoothMode::default(),
            alpha: default_alpha(),
            min_cutoff: default_min_cutoff(),
            beta: default_beta(),
            d_cutoff: default_d_cutoff(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// JSON-lines landmark recording
    #[default]
    Replay,
    /// Remote pose estimator over TCP
    Tcp,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default)]
    pub mode: SourceMode,
    #[serde(default = "default_replay_path")]
    pub path: String,
    /// Replay pacing; 0 replays as fast as frames can be processed
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_replay_path() -> String { "landmarks.jsonl".to_string() }
fn default_fps() -> f32 { 30.0 }
fn default_addr() -> String { "127.0.0.1:39580".to_string() }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            path: default_replay_path(),
            fps: default_fps(),
            addr: default_addr(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// tracing filter directive; RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| RepError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RepError::Config(e.to_string()))
    }

    /// Defaults when `path` does not exist. A file that exists but fails to
    /// read or parse is an error, never silently replaced.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Built-in profiles merged with `[[profiles]]`; the selected exercise must exist.
    pub fn registry(&self) -> Result<ProfileRegistry> {
        let registry = ProfileRegistry::with_overrides(self.profiles.iter().cloned())?;
        registry.get(&self.session.exercise)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::RepDirection;
    use crate::pose::LandmarkIndex;

    #[test]
    fn test_empty_config_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.session.exercise, "squat");
        assert_eq!(config.session.min_visibility, 0.5);
        assert!(config.session.mirror_x);
        assert_eq!(config.smooth.mode, SmoothMode::None);
        assert_eq!(config.source.mode, SourceMode::Replay);
        assert_eq!(config.source.fps, 30.0);
        assert_eq!(config.log.level, "info");
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [session]
            exercise = "curl"

            [smooth]
            mode = "one_euro"
            beta = 0.2

            [source]
            mode = "tcp"
            addr = "10.0.0.2:4000"
            "#,
        )
        .unwrap();
        assert_eq!(config.session.exercise, "curl");
        assert_eq!(config.session.min_visibility, 0.5);
        assert_eq!(config.smooth.mode, SmoothMode::OneEuro);
        assert_eq!(config.smooth.beta, 0.2);
        assert_eq!(config.smooth.min_cutoff, 1.0);
        assert_eq!(config.source.mode, SourceMode::Tcp);
        assert_eq!(config.source.addr, "10.0.0.2:4000");
    }

    #[test]
    fn test_profiles_table() {
        let config = Config::parse(
            r#"
            [session]
            exercise = "press"

            [[profiles]]
            key = "press"
            label = "Overhead Press"
            joints = ["LEFT_SHOULDER", "LEFT_ELBOW", "LEFT_WRIST"]
            mirror_joints = ["RIGHT_SHOULDER", "RIGHT_ELBOW", "RIGHT_WRIST"]
            down_angle = 80.0
            up_angle = 165.0
            rep_direction = "down_to_up"
            cues = { down = "Press!", up = "Lower slowly", mid = "Keep going" }
            "#,
        )
        .unwrap();
        let registry = config.registry().unwrap();
        let press = registry.get("press").unwrap();
        assert_eq!(press.display_name(), "Overhead Press");
        assert_eq!(press.joints[1], LandmarkIndex::LeftElbow);
        assert_eq!(press.rep_direction, RepDirection::DownToUp);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_unknown_selected_exercise() {
        let config = Config::parse("[session]\nexercise = \"plank\"\n").unwrap();
        assert!(matches!(config.registry(), Err(RepError::ProfileNotFound(_))));
    }

    #[test]
    fn test_bad_landmark_name() {
        let result = Config::parse(
            r#"
            [[profiles]]
            key = "x"
            joints = ["LEFT_TAIL", "LEFT_ELBOW", "LEFT_WRIST"]
            down_angle = 80.0
            up_angle = 165.0
            rep_direction = "down_to_up"
            cues = { down = "a", up = "b", mid = "c" }
            "#,
        );
        assert!(matches!(result, Err(RepError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/rep_tracker.toml").unwrap();
        assert_eq!(config.session.exercise, "squat");
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [session]
            exercise = "curl"

            [[profiles]]
            key = "press"
            joints = ["LEFT_SHOLDER", "LEFT_ELBOW", "LEFT_WRIST"]
            down_angle = 80.0
            up_angle = 165.0
            rep_direction = "down_to_up"
            cues = { down = "a", up = "b", mid = "c" }
            "#,
        )
        .unwrap();

        match Config::load_or_default(&path) {
            Err(RepError::Config(msg)) => assert!(msg.contains("LEFT_SHOLDER"), "{}", msg),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[session]\nmin_visibility = 0.6\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.session.min_visibility, 0.6);
    }
}
