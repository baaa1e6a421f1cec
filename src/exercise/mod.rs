pub mod profile;
pub mod registry;

pub use profile::{Cues, ExerciseProfile, JointTriple, Measurement, RepDirection};
pub use registry::ProfileRegistry;
