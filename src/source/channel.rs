use async_stream::stream;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use super::{LandmarkSource, LandmarkStream};
use crate::error::{RepError, Result};
use crate::pose::LandmarkFrame;

/// In-process source fed through a tokio channel.
///
/// Can be reopened after the previous stream is dropped. Frames sent while no
/// stream is open are discarded on the next open.
pub struct ChannelSource {
    rx: Arc<Mutex<mpsc::Receiver<LandmarkFrame>>>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (mpsc::Sender<LandmarkFrame>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let source = Self {
            rx: Arc::new(Mutex::new(rx)),
        };
        (tx, source)
    }
}

#[async_trait]
impl LandmarkSource for ChannelSource {
    async fn open(&mut self) -> Result<LandmarkStream> {
        let mut rx = Arc::clone(&self.rx)
            .try_lock_owned()
            .map_err(|_| RepError::StreamUnavailable("landmark channel already in use".to_string()))?;

        let mut stale = 0usize;
        while rx.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!(stale, "discarded frames queued while stopped");
        }
        if rx.is_closed() {
            return Err(RepError::StreamUnavailable("landmark channel closed".to_string()));
        }

        Ok(Box::pin(stream! {
            while let Some(frame) = rx.recv().await {
                yield frame;
            }
        }))
    }

    fn describe(&self) -> String {
        "channel".to_string()
    }
}
