pub mod rep;
pub mod smooth;
pub mod stage;

pub use rep::{process_frame, FrameAnalysis, RepCounter, RepState, StageUpdate};
pub use smooth::AngleSmoother;
pub use stage::Stage;
