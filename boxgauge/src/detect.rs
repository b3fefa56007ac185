// Detector seam
// The object detector is an external capability that turns a frame into
// axis-aligned boxes; the pipeline only consumes its output

use anyhow::Result;
use boxgauge_common::DetectionBox;
use opencv::core::Mat;

/// Opaque detector capability: one frame in, zero or more detections out.
///
/// Implementations own their model, thresholds, and device handling; the
/// refinement pipeline never looks behind this trait.
pub trait Detector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<DetectionBox>>;
}

/// Serves a fixed list of boxes regardless of frame content.
///
/// Stands in for a real model when boxes arrive from an external source
/// such as CLI flags, a file, or a remote detector.
pub struct FixedBoxes {
    boxes: Vec<DetectionBox>,
}

impl FixedBoxes {
    pub fn new(boxes: Vec<DetectionBox>) -> Self {
        Self { boxes }
    }
}

impl Detector for FixedBoxes {
    fn detect(&mut self, _frame: &Mat) -> Result<Vec<DetectionBox>> {
        Ok(self.boxes.clone())
    }
}
