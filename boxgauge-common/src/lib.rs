// Shared types for the boxgauge workspace
// Detection boxes, rotated boxes, corner points, and the camera model

pub mod types;

pub use types::{
    CameraModel, CornerPoints, DetectionBox, PhysicalSize, PointPx, RotatedBox,
};
