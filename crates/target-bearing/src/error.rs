use target_bearing_core::FrameSize;

/// Configuration errors reported when a pipeline is built.
///
/// Per-frame processing has no error path: a missing target is a normal
/// outcome and mis-sized buffers are caller bugs that panic.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("working resolution must be non-zero (got {}x{})", .0.width, .0.height)]
    InvalidWorkingSize(FrameSize),

    #[error("display resolution must be non-zero (got {}x{})", .0.width, .0.height)]
    InvalidDisplaySize(FrameSize),

    #[error("{channel} lower bound {lower} exceeds upper bound {upper}")]
    InvalidColorRange {
        channel: &'static str,
        lower: u8,
        upper: u8,
    },

    #[error("hue bound {0} is outside 0..=179")]
    HueOutOfRange(u8),

    #[error("horizontal field of view must be in (0, 180) degrees (got {0})")]
    InvalidFieldOfView(f64),

    #[error("{name} must be finite and non-negative (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("solidity range [{0}, {1}] is invalid")]
    InvalidSolidityRange(f64, f64),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
