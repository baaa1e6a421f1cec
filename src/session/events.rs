use tracing::{debug, info};

use crate::counter::Stage;
use crate::pose::DepthZone;

/// Observable state after one processed frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub timestamp_ms: u64,
    pub exercise: String,
    pub reps: u32,
    pub stage: Option<Stage>,
    /// Tracked angle in degrees
    pub angle: f32,
    /// Angle rounded for display
    pub angle_display: i32,
    /// 0..=100 fill of a 180° gauge
    pub gauge_percent: f32,
    pub zone: DepthZone,
    pub feedback: String,
    /// Normalized position of the measured joint, for overlay labels
    pub vertex: (f32, f32),
    pub rep_increment: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started { exercise: String },
    Stopped { reps: u32 },
    ExerciseChanged { key: String, label: String, tip: String },
    CountersReset,
    Frame(FrameReport),
    /// A repetition was completed; hook for haptics or a "pop" animation
    Rep { reps: u32 },
    Fps(u32),
    /// Coaching text not tied to a frame, e.g. after the tally is reset
    Feedback(String),
    Status(String),
}

/// Receives session events. Observers must not expect to influence the session.
pub trait SessionObserver: Send {
    fn notify(&mut self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionEvent) + Send,
{
    fn notify(&mut self, event: &SessionEvent) {
        self(event)
    }
}

/// Keeps every event in order
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<SessionEvent>,
}

impl EventLog {
    pub fn reps_reported(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Rep { reps } => Some(*reps),
                _ => None,
            })
            .collect()
    }

    pub fn frames(&self) -> impl Iterator<Item = &FrameReport> {
        self.events.iter().filter_map(|e| match e {
            SessionEvent::Frame(report) => Some(report),
            _ => None,
        })
    }
}

impl SessionObserver for EventLog {
    fn notify(&mut self, event: &SessionEvent) {
        self.events.push(event.clone());
    }
}

/// Writes events to the tracing log
#[derive(Debug, Default)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn notify(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started { exercise } => info!(%exercise, "session started"),
            SessionEvent::Stopped { reps } => info!(reps, "session stopped"),
            SessionEvent::ExerciseChanged { key, label, .. } => info!(%key, %label, "exercise changed"),
            SessionEvent::CountersReset => info!("counters reset"),
            SessionEvent::Frame(report) => debug!(
                angle = report.angle_display,
                stage = report.stage.map_or("-", Stage::as_str),
                reps = report.reps,
                "{}",
                report.feedback
            ),
            SessionEvent::Rep { reps } => info!(reps, "rep"),
            SessionEvent::Fps(fps) => debug!(fps, "fps"),
            SessionEvent::Feedback(cue) => debug!("{}", cue),
            SessionEvent::Status(msg) => info!("{}", msg),
        }
    }
}
