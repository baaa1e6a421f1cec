//! TCP protocol between a pose estimator (landmark server) and the rep tracker.
//!
//! Length-delimited frames carrying bincode-encoded messages.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::pose::LandmarkFrame;

/// Upper bound for one encoded message
pub const MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// Server → tracker
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum LandmarkMessage {
    Frame(LandmarkFrame),
    EndOfStream,
}

/// Tracker → server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TrackerMessage {
    /// Sent once after connecting; the server starts streaming on receipt
    Ready,
}

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Create a framed message stream with length-delimited framing.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec();
    Framed::new(stream, codec)
}

pub fn encode<T: Serialize>(msg: &T) -> anyhow::Result<Bytes> {
    Ok(Bytes::from(bincode::serialize(msg)?))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> anyhow::Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

/// Send a serializable message (bincode + length prefix).
pub async fn send_message<T: Serialize>(
    stream: &mut MessageStream,
    msg: &T,
) -> anyhow::Result<()> {
    stream.send(encode(msg)?).await?;
    Ok(())
}

/// Receive and deserialize a message.
pub async fn recv_message<T: DeserializeOwned>(
    stream: &mut MessageStream,
) -> anyhow::Result<T> {
    match stream.next().await {
        Some(Ok(bytes)) => decode(&bytes),
        Some(Err(e)) => Err(e.into()),
        None => Err(anyhow::anyhow!("connection closed")),
    }
}
