use async_stream::stream;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, MissedTickBehavior};
use tracing::warn;

use super::{LandmarkSource, LandmarkStream};
use crate::error::{RepError, Result};
use crate::pose::LandmarkFrame;

/// Replays a JSON-lines recording, one `LandmarkFrame` object per line.
///
/// Blank lines and lines starting with `#` are ignored; malformed lines are
/// logged and skipped.
pub struct ReplaySource {
    path: PathBuf,
    fps: f32,
}

impl ReplaySource {
    /// `fps <= 0` replays without pacing
    pub fn new<P: AsRef<Path>>(path: P, fps: f32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            fps,
        }
    }

    fn frame_interval(&self) -> Option<Duration> {
        (self.fps > 0.0 && self.fps.is_finite()).then(|| Duration::from_secs_f32(1.0 / self.fps))
    }
}

#[async_trait]
impl LandmarkSource for ReplaySource {
    async fn open(&mut self) -> Result<LandmarkStream> {
        let file = File::open(&self.path)
            .await
            .map_err(|e| RepError::StreamUnavailable(format!("{}: {}", self.path.display(), e)))?;
        let mut lines = BufReader::new(file).lines();
        let interval = self.frame_interval();
        let path = self.path.display().to_string();

        Ok(Box::pin(stream! {
            let mut ticker = interval.map(|period| {
                let mut t = time::interval(period);
                t.set_missed_tick_behavior(MissedTickBehavior::Skip);
                t
            });
            let mut line_no = 0usize;

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("{}: read error: {}", path, e);
                        break;
                    }
                };
                line_no += 1;

                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                match serde_json::from_str::<LandmarkFrame>(trimmed) {
                    Ok(frame) => {
                        if let Some(t) = ticker.as_mut() {
                            t.tick().await;
                        }
                        yield frame;
                    }
                    Err(e) => warn!("{}:{}: skipping malformed frame: {}", path, line_no, e),
                }
            }
        }))
    }

    fn describe(&self) -> String {
        format!("replay {}", self.path.display())
    }
}
