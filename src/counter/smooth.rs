use std::f32::consts::TAU;

use crate::config::{SmoothConfig, SmoothMode};

/// Frame interval assumed when timestamps do not advance
const FALLBACK_DT: f32 = 1.0 / 30.0;

/// Running value pulled toward each new sample by a weight in 0..=1
#[derive(Debug, Clone, Copy, Default)]
struct Blend {
    value: Option<f32>,
}

impl Blend {
    /// First sample is taken as is
    fn push(&mut self, sample: f32, weight: f32) -> f32 {
        let next = self.value.map_or(sample, |prev| prev + weight * (sample - prev));
        self.value = Some(next);
        next
    }
}

/// Newest-sample weight of a first-order low-pass at `cutoff_hz` sampled every `dt` seconds
fn blend_weight(dt: f32, cutoff_hz: f32) -> f32 {
    let r = TAU * cutoff_hz * dt;
    r / (r + 1.0)
}

/// One Euro filter over a joint angle.
///
/// Angular speed (deg/s) widens the cutoff so fast descents keep up while a
/// held pose stays steady.
#[derive(Debug, Clone)]
struct SpeedAdaptive {
    min_cutoff: f32,
    beta: f32,
    d_cutoff: f32,
    angle: Blend,
    speed: Blend,
    last_raw: Option<f32>,
}

impl SpeedAdaptive {
    fn new(min_cutoff: f32, beta: f32, d_cutoff: f32) -> Self {
        Self {
            min_cutoff,
            beta,
            d_cutoff,
            angle: Blend::default(),
            speed: Blend::default(),
            last_raw: None,
        }
    }

    fn push(&mut self, angle: f32, dt: f32) -> f32 {
        let raw_speed = self.last_raw.map_or(0.0, |prev| (angle - prev) / dt);
        self.last_raw = Some(angle);

        let speed = self.speed.push(raw_speed, blend_weight(dt, self.d_cutoff));
        let cutoff = self.min_cutoff + self.beta * speed.abs();
        self.angle.push(angle, blend_weight(dt, cutoff))
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Raw,
    Ema { alpha: f32, angle: Blend },
    OneEuro(SpeedAdaptive),
}

/// Smooths the tracked joint angle before stage classification.
///
/// The first frame after construction or `reset` passes through unchanged,
/// and output stays within 0..=180 degrees.
#[derive(Debug, Clone)]
pub struct AngleSmoother {
    mode: Mode,
    last_timestamp_ms: Option<u64>,
}

impl AngleSmoother {
    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            last_timestamp_ms: None,
        }
    }

    pub fn passthrough() -> Self {
        Self::with_mode(Mode::Raw)
    }

    /// `alpha` is clamped to 0..=1; 1.0 disables smoothing
    pub fn ema(alpha: f32) -> Self {
        Self::with_mode(Mode::Ema {
            alpha: alpha.clamp(0.0, 1.0),
            angle: Blend::default(),
        })
    }

    pub fn one_euro(min_cutoff: f32, beta: f32, d_cutoff: f32) -> Self {
        Self::with_mode(Mode::OneEuro(SpeedAdaptive::new(min_cutoff, beta, d_cutoff)))
    }

    pub fn from_config(config: &SmoothConfig) -> Self {
        match config.mode {
            SmoothMode::None => Self::passthrough(),
            SmoothMode::Ema => Self::ema(config.alpha),
            SmoothMode::OneEuro => Self::one_euro(config.min_cutoff, config.beta, config.d_cutoff),
        }
    }

    pub fn apply(&mut self, angle: f32, timestamp_ms: u64) -> f32 {
        let dt = match self.last_timestamp_ms {
            Some(last) if timestamp_ms > last => (timestamp_ms - last) as f32 / 1000.0,
            _ => FALLBACK_DT,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        let smoothed = match &mut self.mode {
            Mode::Raw => return angle,
            Mode::Ema { alpha, angle: state } => state.push(angle, *alpha),
            Mode::OneEuro(filter) => filter.push(angle, dt),
        };
        smoothed.clamp(0.0, 180.0)
    }

    pub fn reset(&mut self) {
        let mode = match &self.mode {
            Mode::Raw => Mode::Raw,
            Mode::Ema { alpha, .. } => Mode::Ema {
                alpha: *alpha,
                angle: Blend::default(),
            },
            Mode::OneEuro(f) => Mode::OneEuro(SpeedAdaptive::new(f.min_cutoff, f.beta, f.d_cutoff)),
        };
        *self = Self::with_mode(mode);
    }
}

impl Default for AngleSmoother {
    fn default() -> Self {
        Self::passthrough()
    }
}
