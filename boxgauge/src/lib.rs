// Rotated-box refinement pipeline
// Turns a coarse axis-aligned detection into a tight rotation-aware
// quadrilateral and converts its pixel size into physical units

pub mod binarize;
pub mod contours;
pub mod detect;
pub mod draw;
pub mod enhance;
pub mod fitting;
pub mod measure;
pub mod pipeline;
