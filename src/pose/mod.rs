pub mod geometry;
pub mod landmark;

pub use geometry::{angle_at, gauge_percent, DepthZone};
pub use landmark::{Landmark, LandmarkFrame, LandmarkIndex};
