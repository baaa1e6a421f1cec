//! Repetition counter: reads pose landmarks from a recording or a remote
//! pose estimator and counts reps of the selected exercise.
//!
//! Usage:
//! ```bash
//! rep_tracker --replay squats.jsonl --exercise squat
//! rep_tracker --tcp 127.0.0.1:39580 --exercise curl
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rep_tracker::config::{Config, SourceMode};
use rep_tracker::logging;
use rep_tracker::session::{
    LogObserver, SessionController, SessionEvent, SessionHandle, SessionObserver, SessionSettings,
};
use rep_tracker::source::{LandmarkSource, ReplaySource, TcpSource};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "rep_tracker", about = "Count exercise repetitions from pose landmarks")]
struct Args {
    /// Configuration file
    #[arg(long, short = 'c', default_value = "config.toml")]
    config: String,

    /// Exercise key (overrides [session].exercise)
    #[arg(long, short = 'e')]
    exercise: Option<String>,

    /// Replay a JSON-lines landmark recording
    #[arg(long, conflicts_with = "tcp")]
    replay: Option<String>,

    /// Connect to a landmark server at this address
    #[arg(long)]
    tcp: Option<String>,

    /// Replay pacing in frames per second (0 = unpaced)
    #[arg(long)]
    fps: Option<f32>,

    /// List the available exercises and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // Logging level comes from the file, so load errors surface through the
    // returned error rather than the subscriber.
    let mut config = Config::load_or_default(&args.config)
        .with_context(|| format!("failed to load {}", args.config))?;
    logging::init(&config.log.level);
    if Path::new(&args.config).exists() {
        info!("Config: {}", args.config);
    } else {
        warn!("{} not found, using defaults", args.config);
    }

    if let Some(exercise) = args.exercise {
        config.session.exercise = exercise;
    }
    if let Some(path) = args.replay {
        config.source.mode = SourceMode::Replay;
        config.source.path = path;
    }
    if let Some(addr) = args.tcp {
        config.source.mode = SourceMode::Tcp;
        config.source.addr = addr;
    }
    if let Some(fps) = args.fps {
        config.source.fps = fps;
    }

    let registry = Arc::new(config.registry().context("invalid exercise configuration")?);

    if args.list {
        for profile in registry.iter() {
            println!("{:<8} {}", profile.key, profile.display_name());
        }
        return Ok(());
    }

    println!("=== Rep Tracker ({}) ===", env!("GIT_VERSION"));

    let source: Box<dyn LandmarkSource> = match config.source.mode {
        SourceMode::Replay => Box::new(ReplaySource::new(&config.source.path, config.source.fps)),
        SourceMode::Tcp => Box::new(TcpSource::new(config.source.addr.clone())),
    };

    let mut log = LogObserver;
    let observer = move |event: &SessionEvent| {
        log.notify(event);
        match event {
            SessionEvent::ExerciseChanged { label, tip, .. } => {
                println!("{}", label);
                if !tip.is_empty() {
                    println!("  {}", tip);
                }
            }
            SessionEvent::Frame(report) if report.rep_increment > 0 => {
                println!("  rep {:>3}  ({}°)  {}", report.reps, report.angle_display, report.feedback);
            }
            SessionEvent::Feedback(cue) => println!("{}", cue),
            _ => {}
        }
    };

    let mut controller = SessionController::new(
        source,
        Arc::clone(&registry),
        &config.session.exercise,
        observer,
        SessionSettings::from_config(&config),
    )?;
    println!("Exercise: {}", controller.active_profile().display_name());

    controller.start().await?;

    let (handle, commands) = SessionHandle::channel(8);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, stopping session");
            if let Err(e) = handle.stop().await {
                warn!("{}", e);
            }
        }
    });

    controller.run(commands).await;

    println!("Total reps: {}", controller.reps());
    Ok(())
}
