//! Landmark sources: where per-frame pose landmarks come from.
//!
//! A source is opened once per session start and yields frames until it is
//! exhausted or the returned stream is dropped.

mod channel;
mod replay;
mod tcp;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::Result;
use crate::pose::LandmarkFrame;

pub use channel::ChannelSource;
pub use replay::ReplaySource;
pub use tcp::TcpSource;

pub type LandmarkStream = Pin<Box<dyn Stream<Item = LandmarkFrame> + Send>>;

#[async_trait]
pub trait LandmarkSource: Send {
    /// Acquire the stream; fails with `StreamUnavailable` when the
    /// underlying device, file or connection cannot be opened.
    async fn open(&mut self) -> Result<LandmarkStream>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

#[async_trait]
impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    async fn open(&mut self) -> Result<LandmarkStream> {
        (**self).open().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
