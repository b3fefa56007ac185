// Metric conversion module
// Pinhole approximation from pixel extents to physical units

use boxgauge_common::CameraModel;

/// Convert pixel width and height to physical units.
///
/// Thin-lens pinhole approximation, applied independently per axis:
/// `physical = pixel * depth / focal_length_px`. The output unit is the unit
/// `depth` was given in. This is a first-order estimate that assumes a
/// fronto-parallel object plane and an exactly known depth; no calibration
/// or lens-distortion correction is applied, so accuracy is bounded by how
/// well those assumptions hold. Pure function, independent of the rest of
/// the pipeline.
pub fn pixel_to_physical(
    width_px: f64,
    height_px: f64,
    depth: f64,
    focal_length_px: f64,
) -> (f64, f64) {
    let size = CameraModel::new(depth, focal_length_px).measure(width_px, height_px);
    (size.width, size.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scenario() {
        assert_eq!(pixel_to_physical(1000.0, 500.0, 100.0, 1000.0), (100.0, 50.0));
    }

    #[test]
    fn conversion_is_linear_in_pixel_size() {
        let (w1, h1) = pixel_to_physical(320.0, 180.0, 70.0, 900.0);
        let (w2, h2) = pixel_to_physical(640.0, 360.0, 70.0, 900.0);
        assert!((w2 - 2.0 * w1).abs() < 1e-9);
        assert!((h2 - 2.0 * h1).abs() < 1e-9);
    }

    #[test]
    fn zero_pixel_size_measures_zero() {
        assert_eq!(pixel_to_physical(0.0, 0.0, 100.0, 1000.0), (0.0, 0.0));
    }
}
