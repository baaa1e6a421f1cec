use async_stream::stream;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use super::{LandmarkSource, LandmarkStream};
use crate::error::{RepError, Result};
use crate::protocol::{self, LandmarkMessage, TrackerMessage};

/// Receives landmark frames from a remote pose estimator.
///
/// Dropping the stream closes the connection.
pub struct TcpSource {
    addr: String,
}

impl TcpSource {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl LandmarkSource for TcpSource {
    async fn open(&mut self) -> Result<LandmarkStream> {
        let socket = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| RepError::StreamUnavailable(format!("{}: {}", self.addr, e)))?;
        socket.set_nodelay(true).ok();

        let mut conn = protocol::message_stream(socket);
        protocol::send_message(&mut conn, &TrackerMessage::Ready)
            .await
            .map_err(|e| RepError::StreamUnavailable(format!("{}: {}", self.addr, e)))?;
        info!("connected to landmark server {}", self.addr);

        Ok(Box::pin(stream! {
            loop {
                match protocol::recv_message::<LandmarkMessage>(&mut conn).await {
                    Ok(LandmarkMessage::Frame(frame)) => {
                        yield frame;
                    }
                    Ok(LandmarkMessage::EndOfStream) => {
                        debug!("landmark server signalled end of stream");
                        break;
                    }
                    Err(e) => {
                        warn!("landmark connection lost: {}", e);
                        break;
                    }
                }
            }
        }))
    }

    fn describe(&self) -> String {
        format!("tcp {}", self.addr)
    }
}
