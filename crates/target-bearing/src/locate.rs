//! Target selection and bearing computation.

use nalgebra::Point2;
use target_bearing_core::BoundingRect;

use crate::filter::TargetCandidate;
use crate::result::TargetFix;

/// Pinhole model of the horizontal axis of the working frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraModel {
    working_width: u32,
    focal_length_px: f64,
}

impl CameraModel {
    pub fn new(horizontal_fov_deg: f64, working_width: u32) -> Self {
        let half_fov = horizontal_fov_deg.to_radians() / 2.0;
        Self {
            working_width,
            focal_length_px: 0.5 * working_width as f64 / half_fov.tan(),
        }
    }

    #[inline]
    pub fn focal_length_px(&self) -> f64 {
        self.focal_length_px
    }

    /// Optical-axis column, between the two middle pixels for even widths.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.working_width as f64 / 2.0 - 0.5
    }

    /// Angle in degrees from the optical axis to column `x`.
    pub fn horizontal_angle_deg(&self, x: f64) -> f64 {
        ((x - self.center_x()) / self.focal_length_px)
            .atan()
            .to_degrees()
    }
}

/// Center as bottom-right minus half the extent (integer halving).
///
/// For odd extents this sits half a pixel right/below the geometric center;
/// the bearing is defined on this point.
pub fn target_center(rect: &BoundingRect) -> Point2<f64> {
    let br = rect.br();
    Point2::new(
        (br.x - rect.width / 2) as f64,
        (br.y - rect.height / 2) as f64,
    )
}

/// Picks the target out of the accepted candidates.
#[derive(Clone, Copy, Debug)]
pub struct TargetLocator {
    camera: CameraModel,
}

impl TargetLocator {
    pub fn new(camera: CameraModel) -> Self {
        Self { camera }
    }

    pub fn camera(&self) -> &CameraModel {
        &self.camera
    }

    /// A fix only when exactly one candidate survived; zero or several give `None`.
    pub fn locate(&self, candidates: &[TargetCandidate]) -> Option<TargetFix> {
        let [only] = candidates else {
            return None;
        };
        let center = target_center(&only.rect);
        Some(TargetFix {
            rect: only.rect,
            center,
            angle_deg: self.camera.horizontal_angle_deg(center.x),
        })
    }
}
