use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};

use super::events::{FrameReport, SessionEvent, SessionObserver};
use super::fps::FpsMeter;
use crate::config::{Config, SmoothConfig};
use crate::counter::{AngleSmoother, RepCounter, RepState, Stage};
use crate::error::{RepError, Result};
use crate::exercise::{ExerciseProfile, ProfileRegistry};
use crate::pose::{gauge_percent, DepthZone, LandmarkFrame};
use crate::source::{LandmarkSource, LandmarkStream};

/// Per-session tuning taken from `[session]` and `[smooth]`
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub min_visibility: f32,
    pub mirror_x: bool,
    pub smooth: SmoothConfig,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_visibility: config.session.min_visibility,
            mirror_x: config.session.mirror_x,
            smooth: config.smooth.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Requests delivered to a running `SessionController::run` loop
#[derive(Debug)]
pub enum SessionCommand {
    SetExercise {
        key: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Reset,
    Stop,
}

/// Sender side of the command channel
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SessionCommand>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub async fn set_exercise(&self, key: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::SetExercise {
            key: key.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| RepError::SessionClosed)?
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(SessionCommand::Reset).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<()> {
        self.tx.send(cmd).await.map_err(|_| RepError::SessionClosed)
    }
}

/// Feedback shown whenever the tally starts over
pub const READY_CUE: &str = "Get into position!";

enum Wake {
    Command(Option<SessionCommand>),
    Frame(Option<LandmarkFrame>),
}

/// Owns the session state and drives frames from a landmark source through
/// the rep counter, reporting to an observer.
///
/// Frames are handled one at a time through `&mut self`.
pub struct SessionController<S, O> {
    source: S,
    registry: Arc<ProfileRegistry>,
    observer: O,
    settings: SessionSettings,
    active: ExerciseProfile,
    counter: RepCounter,
    stream: Option<LandmarkStream>,
    fps: FpsMeter,
    last_report: Option<FrameReport>,
}

impl<S: LandmarkSource, O: SessionObserver> SessionController<S, O> {
    /// Fails with `ProfileNotFound` when `exercise` is not registered.
    pub fn new(
        source: S,
        registry: Arc<ProfileRegistry>,
        exercise: &str,
        observer: O,
        settings: SessionSettings,
    ) -> Result<Self> {
        let active = registry.get(exercise)?.clone();
        let counter = RepCounter::new(AngleSmoother::from_config(&settings.smooth), settings.min_visibility);
        Ok(Self {
            source,
            registry,
            observer,
            settings,
            active,
            counter,
            stream: None,
            fps: FpsMeter::new(),
            last_report: None,
        })
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    pub fn active_profile(&self) -> &ExerciseProfile {
        &self.active
    }

    pub fn active_exercise(&self) -> &str {
        &self.active.key
    }

    pub fn state(&self) -> RepState {
        self.counter.state()
    }

    pub fn reps(&self) -> u32 {
        self.counter.reps()
    }

    pub fn stage(&self) -> Option<Stage> {
        self.counter.stage()
    }

    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Open the landmark stream and begin a fresh count. No-op when running.
    ///
    /// On `StreamUnavailable` the controller stays stopped and may be retried.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            debug!("start ignored, session already running");
            return Ok(());
        }

        self.emit(SessionEvent::Status(format!("Opening {}...", self.source.describe())));
        match self.source.open().await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.fps.reset();
                info!(exercise = %self.active.key, source = %self.source.describe(), "session started");
                self.emit(SessionEvent::Started {
                    exercise: self.active.key.clone(),
                });
                self.clear_tally();
                Ok(())
            }
            Err(e) => {
                warn!("failed to start session: {}", e);
                self.emit(SessionEvent::Status(e.to_string()));
                Err(e)
            }
        }
    }

    /// Release the stream. Reps and stage stay queryable. No-op when stopped.
    pub fn stop(&mut self) {
        if self.stream.take().is_none() {
            return;
        }
        let reps = self.counter.reps();
        info!(reps, "session stopped");
        self.emit(SessionEvent::Stopped { reps });
    }

    /// Switch exercise and reset the count. Unknown keys leave everything unchanged.
    pub fn set_exercise(&mut self, key: &str) -> Result<()> {
        let profile = match self.registry.get(key) {
            Ok(profile) => profile.clone(),
            Err(e) => {
                warn!("{}", e);
                self.emit(SessionEvent::Status(e.to_string()));
                return Err(e);
            }
        };

        self.active = profile;
        info!(exercise = %self.active.key, "exercise selected");
        self.emit(SessionEvent::ExerciseChanged {
            key: self.active.key.clone(),
            label: self.active.display_name().to_string(),
            tip: self.active.tip.clone(),
        });
        self.clear_tally();
        Ok(())
    }

    /// Zero the reps and clear the stage without touching the stream
    pub fn reset_counters(&mut self) {
        self.emit(SessionEvent::CountersReset);
        self.clear_tally();
    }

    fn clear_tally(&mut self) {
        self.counter.reset();
        self.last_report = None;
        self.emit(SessionEvent::Feedback(READY_CUE.to_string()));
    }

    /// Process one frame. Frames without a detectable body or with the
    /// tracked joints missing are skipped and leave the state untouched, as
    /// is every frame handed in while the session is stopped.
    pub fn handle_frame(&mut self, frame: &LandmarkFrame) -> Option<FrameReport> {
        if !self.is_running() {
            trace!(ts = frame.timestamp_ms, "frame ignored, session stopped");
            return None;
        }
        if let Some(fps) = self.fps.tick(Instant::now()) {
            self.emit(SessionEvent::Fps(fps));
        }
        if frame.is_empty() {
            trace!(ts = frame.timestamp_ms, "no landmarks in frame");
            return None;
        }

        let mirrored;
        let frame = if self.settings.mirror_x {
            mirrored = frame.mirrored();
            &mirrored
        } else {
            frame
        };

        let Some(analysis) = self.counter.process(frame, &self.active) else {
            trace!(ts = frame.timestamp_ms, "tracked joints not visible");
            return None;
        };

        let report = FrameReport {
            timestamp_ms: frame.timestamp_ms,
            exercise: self.active.key.clone(),
            reps: analysis.reps,
            stage: analysis.stage,
            angle: analysis.angle,
            angle_display: analysis.angle.round() as i32,
            gauge_percent: gauge_percent(analysis.angle),
            zone: DepthZone::from_angle(analysis.angle),
            feedback: analysis.feedback,
            vertex: (analysis.vertex.x, analysis.vertex.y),
            rep_increment: analysis.rep_increment,
        };

        self.emit(SessionEvent::Frame(report.clone()));
        if report.rep_increment > 0 {
            info!(exercise = %report.exercise, reps = report.reps, "rep counted");
            self.emit(SessionEvent::Rep { reps: report.reps });
        }
        self.last_report = Some(report.clone());
        Some(report)
    }

    /// Pull and handle the next frame. Returns `false` when not running or
    /// when the stream has ended, in which case the session is stopped.
    pub async fn next_frame(&mut self) -> bool {
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };
        match stream.next().await {
            Some(frame) => {
                self.handle_frame(&frame);
                true
            }
            None => {
                info!("landmark stream ended");
                self.stop();
                false
            }
        }
    }

    /// Drive frames until stopped, the stream ends, or the command channel
    /// closes. Commands take priority over pending frames.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        loop {
            let wake = {
                let Some(stream) = self.stream.as_mut() else {
                    break;
                };
                tokio::select! {
                    biased;
                    cmd = commands.recv() => Wake::Command(cmd),
                    frame = stream.next() => Wake::Frame(frame),
                }
            };

            match wake {
                Wake::Command(Some(cmd)) => self.apply(cmd),
                Wake::Command(None) => {
                    debug!("command channel closed");
                    self.stop();
                }
                Wake::Frame(Some(frame)) => {
                    self.handle_frame(&frame);
                }
                Wake::Frame(None) => {
                    info!("landmark stream ended");
                    self.stop();
                }
            }
        }
    }

    fn apply(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::SetExercise { key, reply } => {
                let result = self.set_exercise(&key);
                // caller may have given up waiting
                let _ = reply.send(result);
            }
            SessionCommand::Reset => self.reset_counters(),
            SessionCommand::Stop => self.stop(),
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.observer.notify(&event);
    }
}
