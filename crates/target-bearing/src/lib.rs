//! Colour target locator for a live camera feed.
//!
//! Each frame goes through a fixed pipeline:
//! 1. Resize the camera frame to the working resolution (320x320 by default).
//! 2. Convert RGBA to RGB to HSV and threshold against a [`ColorRange`].
//! 3. Trace the external contours of the mask.
//! 4. Keep the contours a [`CandidatePolicy`] accepts (wide and large enough
//!    by default).
//! 5. If exactly one candidate is left, compute its center and the horizontal
//!    angle from the optical axis.
//! 6. Annotate the working frame, upscale it to the display resolution and
//!    rotate it 90 degrees clockwise to undo the sensor mounting.
//!
//! ## Quickstart
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use target_bearing::{PipelineParams, TargetPipeline};
//!
//! let mut pipeline = TargetPipeline::new(PipelineParams::default())?;
//! let frame = RgbaImage::from_pixel(640, 480, Rgba([0, 0, 255, 255]));
//! let out = pipeline.process(&frame);
//! assert_eq!(out.frame.dimensions(), (960, 960));
//! assert!(out.report.angle_deg().is_none());
//! # Ok::<(), target_bearing::PipelineError>(())
//! ```

mod annotate;
mod contour;
mod error;
mod filter;
mod locate;
mod orient;
mod params;
mod pipeline;
mod result;
mod segment;

pub use annotate::FrameAnnotator;
pub use contour::{compress_chain, extract_external_contours, Contour};
pub use error::PipelineError;
pub use filter::{
    policy_from_params, AspectAreaPolicy, CandidatePolicy, SolidityPolicy, TargetCandidate,
    TargetFilter,
};
pub use locate::{target_center, CameraModel, TargetLocator};
pub use orient::OrientationCorrector;
pub use params::{
    CameraParams, ColorRange, FilterParams, FilterPolicyKind, PipelineParams, PreviewMode,
    CAMERA_FOV_DEGREES, REFERENCE_WORKING_SIZE,
};
pub use pipeline::{FrameOutput, FrameScratch, TargetPipeline};
pub use result::{FrameReport, TargetFix};
pub use segment::{ColorSegmenter, MASK_OFF, MASK_ON};

pub use target_bearing_core as core;
