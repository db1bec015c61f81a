use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use target_bearing_core::BoundingRect;

/// The single target selected in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetFix {
    /// Bounding rectangle of the accepted contour, in working-frame pixels.
    pub rect: BoundingRect,
    /// Target center in working-frame pixels.
    pub center: Point2<f64>,
    /// Signed horizontal angle from the optical axis, degrees. Positive is right.
    pub angle_deg: f64,
}

/// Per-frame outcome of [`crate::TargetPipeline::process`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// External contours found in the mask.
    pub contours: usize,
    /// Bounding rects of every candidate the filter accepted.
    pub candidates: Vec<BoundingRect>,
    /// Present only when exactly one candidate was accepted.
    pub target: Option<TargetFix>,
}

impl FrameReport {
    /// Bearing for this frame; `None` means no target, not "unchanged".
    pub fn angle_deg(&self) -> Option<f64> {
        self.target.map(|t| t.angle_deg)
    }
}
