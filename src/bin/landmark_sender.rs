//! Landmark sender: serves a JSON-lines landmark recording over TCP so a
//! `rep_tracker --tcp` client can consume it like a live pose estimator.
//!
//! Each client gets the recording from the start once it sends `Ready`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::StreamExt as _;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use rep_tracker::logging;
use rep_tracker::protocol::{self, LandmarkMessage, TrackerMessage};
use rep_tracker::source::{LandmarkSource, ReplaySource};

#[derive(Parser)]
#[command(name = "landmark_sender", about = "Serve a landmark recording over TCP")]
struct Args {
    /// JSON-lines recording to serve
    recording: String,

    #[arg(long, default_value = "0.0.0.0:39580")]
    listen: String,

    /// Frames per second (0 = as fast as the client reads)
    #[arg(long, default_value_t = 30.0)]
    fps: f32,

    /// Serve one client and exit
    #[arg(long)]
    once: bool,
}

async fn serve_client(socket: TcpStream, recording: &str, fps: f32) -> Result<u64> {
    socket.set_nodelay(true)?;
    let mut conn = protocol::message_stream(socket);

    match protocol::recv_message::<TrackerMessage>(&mut conn).await? {
        TrackerMessage::Ready => {}
    }

    let mut source = ReplaySource::new(recording, fps);
    let mut frames = source.open().await.context("failed to open recording")?;
    let mut sent = 0u64;
    while let Some(frame) = frames.next().await {
        protocol::send_message(&mut conn, &LandmarkMessage::Frame(frame)).await?;
        sent += 1;
    }
    protocol::send_message(&mut conn, &LandmarkMessage::EndOfStream).await?;
    Ok(sent)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init("info");

    if !std::path::Path::new(&args.recording).exists() {
        bail!("recording not found: {}", args.recording);
    }

    info!("Landmark Sender ({})", env!("GIT_VERSION"));
    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("Listening on {}", args.listen);

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("Client connected: {}", addr);

        match serve_client(socket, &args.recording, args.fps).await {
            Ok(sent) => info!("Client {} done, {} frames sent", addr, sent),
            Err(e) => warn!("Client {} dropped: {}", addr, e),
        }

        if args.once {
            return Ok(());
        }
    }
}
