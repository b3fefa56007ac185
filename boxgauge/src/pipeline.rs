// Pipeline module
// Chains region enhancement, binarization, contour selection, and shape
// fitting for one detection, and measures whole detection batches

use anyhow::{Context, Result};
use boxgauge_common::{CameraModel, CornerPoints, DetectionBox, PhysicalSize, RotatedBox};
use log::{debug, warn};
use opencv::{
    core::{Mat, Rect, Vector},
    imgcodecs,
    prelude::*,
};
use serde::Serialize;

use crate::{binarize, contours, enhance, fitting};

pub use crate::contours::DEFAULT_MIN_AREA_RATIO;

/// One refined and measured detection.
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub detection: DetectionBox,
    pub rotated: RotatedBox,
    pub corners: CornerPoints,
    pub physical: PhysicalSize,
}

/// Refine an axis-aligned detection into a rotated box in frame coordinates.
///
/// The detection is clamped to the frame and cropped; the crop is enhanced,
/// binarized, and reduced to its dominant contour, which is fitted with a
/// minimum-area rotated rectangle and mapped back to frame coordinates.
/// Returns `Ok(None)` when the clamped crop has no area or when no contour
/// survives the area filter; both are expected, recoverable outcomes rather
/// than faults. Stateless: every invocation recomputes from its inputs and
/// the frame is only read.
pub fn fit_rotated_box(
    frame: &Mat,
    detection: &DetectionBox,
    min_area_ratio: f64,
) -> Result<Option<(RotatedBox, CornerPoints)>> {
    fit_rotated_box_with_debug(frame, detection, min_area_ratio, None)
}

/// Same as [`fit_rotated_box`], optionally persisting the enhanced crop and
/// the binary mask next to `debug_prefix`.
pub fn fit_rotated_box_with_debug(
    frame: &Mat,
    detection: &DetectionBox,
    min_area_ratio: f64,
    debug_prefix: Option<&str>,
) -> Result<Option<(RotatedBox, CornerPoints)>> {
    let frame_size = frame.size()?;
    let clamped = detection.clamped(frame_size.width, frame_size.height);
    let x1 = clamped.x1 as i32;
    let y1 = clamped.y1 as i32;
    let width = clamped.x2 as i32 - x1;
    let height = clamped.y2 as i32 - y1;

    if width <= 0 || height <= 0 {
        warn!(
            "detection ({:.0},{:.0})-({:.0},{:.0}) crops to an empty region, skipping",
            detection.x1, detection.y1, detection.x2, detection.y2
        );
        return Ok(None);
    }

    let roi = Mat::roi(frame, Rect::new(x1, y1, width, height))?.clone_pointee();

    let enhanced = enhance::enhance_region(&roi).context("region enhancement failed")?;
    let mask = binarize::binary_mask(&enhanced).context("binarization failed")?;

    if let Some(prefix) = debug_prefix {
        imgcodecs::imwrite(&format!("{}_enhanced.png", prefix), &enhanced, &Vector::new())?;
        imgcodecs::imwrite(&format!("{}_mask.png", prefix), &mask, &Vector::new())?;
    }

    let candidates = contours::select_contours(&mask, min_area_ratio)?;
    let dominant = match contours::dominant_contour(&candidates)? {
        Some(contour) => contour,
        None => {
            debug!("no contour inside the area band, nothing to fit");
            return Ok(None);
        }
    };

    let (local_box, local_corners) = fitting::min_area_box(&dominant)?;
    Ok(Some(fitting::to_frame_coords(
        &local_box,
        &local_corners,
        (x1, y1),
    )))
}

/// Refine and measure every detection at or above `confidence_threshold`.
///
/// Detections are processed sequentially and independently; nothing is
/// shared between them. Failures stay local to their detection: an error or
/// an empty fit logs and skips that one detection without aborting the rest
/// of the batch.
pub fn measure_detections(
    frame: &Mat,
    detections: &[DetectionBox],
    min_area_ratio: f64,
    confidence_threshold: f32,
    camera: &CameraModel,
    debug_prefix: Option<&str>,
) -> Vec<Measurement> {
    let mut measurements = Vec::new();
    for (index, detection) in detections.iter().enumerate() {
        if detection.confidence < confidence_threshold {
            debug!(
                "detection {} below confidence threshold ({:.2} < {:.2})",
                index, detection.confidence, confidence_threshold
            );
            continue;
        }

        let prefix = debug_prefix.map(|p| format!("{}_det{}", p, index));
        match fit_rotated_box_with_debug(frame, detection, min_area_ratio, prefix.as_deref()) {
            Ok(Some((rotated, corners))) => {
                let physical = camera.measure(rotated.width, rotated.height);
                measurements.push(Measurement {
                    detection: *detection,
                    rotated,
                    corners,
                    physical,
                });
            }
            Ok(None) => {}
            Err(err) => warn!("skipping detection {}: {:#}", index, err),
        }
    }
    measurements
}
