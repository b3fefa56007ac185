// End-to-end pipeline tests on synthetic frames

use boxgauge::pipeline;
use boxgauge_common::{CameraModel, DetectionBox};
use opencv::{
    core::{Mat, Point, Rect, Scalar, Vector, CV_8UC3},
    imgproc,
    prelude::*,
};

fn black_frame(width: i32, height: i32) -> Mat {
    Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0)).unwrap()
}

/// Corners of a square of the given side, centered at (cx, cy) and rotated
/// clockwise by `angle_deg` in image coordinates.
fn rotated_square(cx: f64, cy: f64, side: f64, angle_deg: f64) -> [(f64, f64); 4] {
    let rad = angle_deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    let half = side / 2.0;
    let offsets = [(-half, -half), (half, -half), (half, half), (-half, half)];
    offsets.map(|(dx, dy)| (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos))
}

fn fill_white_polygon(frame: &mut Mat, corners: &[(f64, f64); 4]) {
    let mut polygon: Vector<Point> = Vector::new();
    for (x, y) in corners {
        polygon.push(Point::new(x.round() as i32, y.round() as i32));
    }
    let mut polygons: Vector<Vector<Point>> = Vector::new();
    polygons.push(polygon);
    imgproc::fill_poly(
        frame,
        &polygons,
        Scalar::all(255.0),
        imgproc::LINE_8,
        0,
        Point::new(0, 0),
    )
    .unwrap();
}

#[test]
fn recovers_a_rotated_square() {
    let mut frame = black_frame(400, 400);
    let corners = rotated_square(200.0, 200.0, 120.0, 30.0);
    fill_white_polygon(&mut frame, &corners);

    let detection = DetectionBox::new(60.0, 60.0, 340.0, 340.0, 0, 0.9);
    let (rotated, fitted_corners) = pipeline::fit_rotated_box(&frame, &detection, 0.1)
        .unwrap()
        .expect("the square should be found");

    assert!(
        (rotated.width - 120.0).abs() <= 2.0,
        "width {} not within 2px of 120",
        rotated.width
    );
    assert!(
        (rotated.height - 120.0).abs() <= 2.0,
        "height {} not within 2px of 120",
        rotated.height
    );
    assert!((rotated.cx - 200.0).abs() <= 2.0, "cx {}", rotated.cx);
    assert!((rotated.cy - 200.0).abs() <= 2.0, "cy {}", rotated.cy);

    // a square rotated by 30 degrees is indistinguishable from one rotated
    // by 60, so accept either reading of the convention
    let angle = rotated.angle_deg;
    assert!(
        (angle - 30.0).abs() <= 2.0 || (angle - 60.0).abs() <= 2.0,
        "angle {} not within 2 degrees of the true rotation",
        angle
    );

    // corners are mapped to frame coordinates, around the drawn square
    let cx: i32 = fitted_corners.iter().map(|p| p.x).sum::<i32>() / 4;
    let cy: i32 = fitted_corners.iter().map(|p| p.y).sum::<i32>() / 4;
    assert!((cx - 200).abs() <= 2, "corner centroid x {}", cx);
    assert!((cy - 200).abs() <= 2, "corner centroid y {}", cy);
    for corner in fitted_corners {
        assert!(
            corner.x >= 100 && corner.x <= 300 && corner.y >= 100 && corner.y <= 300,
            "corner {:?} far outside the square",
            corner
        );
    }
}

#[test]
fn fits_an_object_nearly_filling_its_crop() {
    // a perfectly tight detector box: the silhouette covers ~96% of the
    // 400x400 crop, with a 4px background margin on every side
    let mut frame = black_frame(420, 420);
    imgproc::rectangle(
        &mut frame,
        Rect::new(14, 14, 392, 392),
        Scalar::all(255.0),
        -1,
        imgproc::LINE_8,
        0,
    )
    .unwrap();

    let detection = DetectionBox::new(10.0, 10.0, 410.0, 410.0, 0, 0.9);
    let (rotated, _) = pipeline::fit_rotated_box(&frame, &detection, 0.1)
        .unwrap()
        .expect("a near-filling silhouette must still be fitted");

    assert!(
        (rotated.width - 392.0).abs() <= 2.0,
        "width {} not within 2px of 392",
        rotated.width
    );
    assert!(
        (rotated.height - 392.0).abs() <= 2.0,
        "height {} not within 2px of 392",
        rotated.height
    );
    assert!((rotated.cx - 209.5).abs() <= 2.0, "cx {}", rotated.cx);
    assert!((rotated.cy - 209.5).abs() <= 2.0, "cy {}", rotated.cy);
}

#[test]
fn empty_crop_returns_no_result() {
    let frame = black_frame(200, 200);
    let zero_width = DetectionBox::new(50.0, 50.0, 50.0, 150.0, 0, 0.9);
    assert!(pipeline::fit_rotated_box(&frame, &zero_width, 0.1)
        .unwrap()
        .is_none());

    let outside = DetectionBox::new(-80.0, -80.0, -10.0, -10.0, 0, 0.9);
    assert!(pipeline::fit_rotated_box(&frame, &outside, 0.1)
        .unwrap()
        .is_none());
}

#[test]
fn uniform_region_returns_no_result() {
    // no foreground anywhere: the selector must come back empty
    let frame = black_frame(300, 300);
    let detection = DetectionBox::new(10.0, 10.0, 210.0, 210.0, 0, 0.9);
    assert!(pipeline::fit_rotated_box(&frame, &detection, 0.1)
        .unwrap()
        .is_none());
}

#[test]
fn batch_measurement_isolates_per_detection_outcomes() {
    let mut frame = black_frame(400, 400);
    let corners = rotated_square(200.0, 200.0, 120.0, 20.0);
    fill_white_polygon(&mut frame, &corners);

    let detections = [
        // below the confidence threshold, skipped
        DetectionBox::new(60.0, 60.0, 340.0, 340.0, 0, 0.2),
        // clamps to a zero-area crop, skipped without aborting the batch
        DetectionBox::new(420.0, 420.0, 460.0, 460.0, 0, 0.9),
        // the real one
        DetectionBox::new(60.0, 60.0, 340.0, 340.0, 3, 0.9),
    ];

    let camera = CameraModel::new(100.0, 1000.0);
    let measurements =
        pipeline::measure_detections(&frame, &detections, 0.1, 0.4, &camera, None);

    assert_eq!(measurements.len(), 1);
    let m = &measurements[0];
    assert_eq!(m.detection.class_id, 3);
    // 120px at depth 100 and focal length 1000 is 12 physical units
    assert!((m.physical.width - 12.0).abs() <= 0.3, "{}", m.physical.width);
    assert!((m.physical.height - 12.0).abs() <= 0.3, "{}", m.physical.height);
}
