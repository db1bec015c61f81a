use serde::{Deserialize, Serialize};
use target_bearing_core::{FrameSize, HUE_MAX};

use crate::error::PipelineError;

/// Working resolution at which `FilterParams::min_area` is expressed.
pub const REFERENCE_WORKING_SIZE: FrameSize = FrameSize::new(320, 320);

/// Horizontal field of view of the reference lens, in degrees.
pub const CAMERA_FOV_DEGREES: f64 = 47.0;

/// Inclusive HSV bounds (8-bit convention: hue 0..=179, S/V 0..=255).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        const NAMES: [&str; 3] = ["hue", "saturation", "value"];
        for (c, name) in NAMES.iter().enumerate() {
            if self.lower[c] > self.upper[c] {
                return Err(PipelineError::InvalidColorRange {
                    channel: name,
                    lower: self.lower[c],
                    upper: self.upper[c],
                });
            }
        }
        if self.upper[0] > HUE_MAX {
            return Err(PipelineError::HueOutOfRange(self.upper[0]));
        }
        Ok(())
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self::new([0, 0, 0], [20, 255, 255])
    }
}

/// Which acceptance rule the target filter applies.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicyKind {
    /// Wide rectangles only: `aspect_ratio > min_aspect_ratio && area > min_area`.
    #[default]
    AspectArea,
    /// Contour-area over hull-area within `solidity`, plus the area floor.
    Solidity,
}

/// Target filter thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Strict lower bound on bounding-rect width / height.
    pub min_aspect_ratio: f64,
    /// Strict lower bound on bounding-rect area, in pixels at
    /// `REFERENCE_WORKING_SIZE`. Rescaled for other working sizes.
    pub min_area: f64,
    pub policy: FilterPolicyKind,
    /// Inclusive solidity bounds `[min, max]` for `FilterPolicyKind::Solidity`.
    pub solidity: [f64; 2],
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_aspect_ratio: 1.0,
            min_area: 400.0,
            policy: FilterPolicyKind::AspectArea,
            solidity: [0.04, 0.4],
        }
    }
}

impl FilterParams {
    /// `min_area` rescaled from the reference resolution to `working`.
    pub fn min_area_for(&self, working: FrameSize) -> f64 {
        self.min_area * working.area() / REFERENCE_WORKING_SIZE.area()
    }
}

/// Lens calibration used for the bearing computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub horizontal_fov_deg: f64,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            horizontal_fov_deg: CAMERA_FOV_DEGREES,
        }
    }
}

/// What the output frame shows underneath the annotations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    /// The resized camera frame.
    #[default]
    Color,
    /// The segmentation mask, for tuning the colour range.
    Mask,
}

/// Configuration for [`crate::TargetPipeline`]. Set once, never per frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub working_size: FrameSize,
    pub display_size: FrameSize,
    pub color_range: ColorRange,
    /// RGBA colour of every annotation.
    pub highlight: [u8; 4],
    pub filter: FilterParams,
    pub camera: CameraParams,
    pub preview: PreviewMode,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            working_size: REFERENCE_WORKING_SIZE,
            display_size: FrameSize::new(960, 960),
            color_range: ColorRange::default(),
            highlight: [0, 255, 0, 255],
            filter: FilterParams::default(),
            camera: CameraParams::default(),
            preview: PreviewMode::Color,
        }
    }
}

impl PipelineParams {
    /// Parse and validate params from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.working_size.is_empty() {
            return Err(PipelineError::InvalidWorkingSize(self.working_size));
        }
        if self.display_size.is_empty() {
            return Err(PipelineError::InvalidDisplaySize(self.display_size));
        }
        self.color_range.validate()?;

        let fov = self.camera.horizontal_fov_deg;
        if !fov.is_finite() || fov <= 0.0 || fov >= 180.0 {
            return Err(PipelineError::InvalidFieldOfView(fov));
        }

        check_threshold("min_aspect_ratio", self.filter.min_aspect_ratio)?;
        check_threshold("min_area", self.filter.min_area)?;
        let [lo, hi] = self.filter.solidity;
        if !(lo.is_finite() && hi.is_finite()) || lo < 0.0 || lo > hi {
            return Err(PipelineError::InvalidSolidityRange(lo, hi));
        }
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), PipelineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidThreshold { name, value })
    }
}
