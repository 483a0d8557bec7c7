pub mod capture;
pub mod inference;
pub mod rgba_converter;

pub use capture::{CameraSource, CaptureStage};
pub use inference::InferenceStage;

/// How many frames / joint samples a stage buffer retains. Writers drop on
/// overflow and readers drain to the newest element, so buffers are always
/// most-recent-wins and never block either side.
pub const BUFFER_CAPACITY: usize = 5;
