//! Session lifecycle: owns the active exercise and rep state, pulls frames
//! from a landmark source and reports to an observer.

mod controller;
mod events;
mod fps;

pub use controller::{SessionCommand, SessionController, SessionHandle, SessionSettings, READY_CUE};
pub use events::{EventLog, FrameReport, LogObserver, SessionEvent, SessionObserver};
pub use fps::FpsMeter;
