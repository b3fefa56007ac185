use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned detection produced by an external object detector.
///
/// Coordinates are `(x1, y1, x2, y2)` in frame pixels; `confidence` is in
/// `[0, 1]`. The pipeline only reads this to derive a crop, it never feeds
/// anything back to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub class_id: i32,
    pub confidence: f32,
}

impl DetectionBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, class_id: i32, confidence: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            class_id,
            confidence,
        }
    }

    /// Clamp the box to a frame of the given size.
    ///
    /// A box that lies entirely outside the frame clamps to zero width or
    /// height; callers must treat that as an empty region.
    pub fn clamped(&self, frame_width: i32, frame_height: i32) -> Self {
        let w = frame_width as f32;
        let h = frame_height as f32;
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
            ..*self
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// 2D point in integer pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPx {
    pub x: i32,
    pub y: i32,
}

impl PointPx {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The four corners of a rotated box, in drawing order
pub type CornerPoints = [PointPx; 4];

/// Minimum-area rotated rectangle: center, size, and angle.
///
/// Angle convention is the OpenCV >= 4.5 `minAreaRect` one: `angle_deg` lies
/// in `(0.0, 90.0]` and is the clockwise rotation from the horizontal axis
/// to the edge reported as `width`. Width and height are non-negative; a
/// near-zero extent is a valid, degenerate fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedBox {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

impl RotatedBox {
    /// Shift the center by `(dx, dy)`. Size and angle are
    /// translation-invariant and carry over unchanged.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            ..*self
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl fmt::Display for RotatedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "center ({:.1}, {:.1}), {:.1}x{:.1} px, angle {:.1} deg",
            self.cx, self.cy, self.width, self.height, self.angle_deg
        )
    }
}

/// Physical extents derived from a rotated box and a camera model.
/// The unit is whatever unit the camera depth was given in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for PhysicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} x {:.1}", self.width, self.height)
    }
}

/// Pinhole camera approximation for pixel-to-physical conversion.
///
/// `depth` is the assumed distance from the camera to the object plane;
/// `focal_length_px` is the approximate focal length in pixel units.
/// First-order only: the object plane is assumed fronto-parallel and the
/// depth exactly known, with no lens-distortion correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    pub depth: f64,
    pub focal_length_px: f64,
}

impl CameraModel {
    pub fn new(depth: f64, focal_length_px: f64) -> Self {
        Self {
            depth,
            focal_length_px,
        }
    }

    /// Thin-lens conversion: `size = pixel_size * depth / focal_length`,
    /// applied independently per axis.
    pub fn measure(&self, width_px: f64, height_px: f64) -> PhysicalSize {
        PhysicalSize {
            width: width_px * self.depth / self.focal_length_px,
            height: height_px * self.depth / self.focal_length_px,
        }
    }
}

impl Default for CameraModel {
    fn default() -> Self {
        Self {
            depth: 100.0,
            focal_length_px: 1000.0,
        }
    }
}
