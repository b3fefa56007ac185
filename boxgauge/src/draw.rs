// Overlay rendering module
// Draws refined boxes, center marks, and measurement labels onto a frame

use anyhow::Result;
use boxgauge_common::{CornerPoints, DetectionBox, PhysicalSize, RotatedBox};
use opencv::{
    core::{Mat, Point, Scalar, Vector},
    imgproc,
    prelude::*,
};

const BOX_THICKNESS: i32 = 2;
const CENTER_RADIUS: i32 = 3;
const LABEL_SCALE: f64 = 0.5;
const LABEL_THICKNESS: i32 = 2;
const LABEL_LINE_SPACING: i32 = 20;

/// Draw the rotated box as a closed polygon with a dot on its centroid.
pub fn draw_rotated_box(image: &mut Mat, corners: &CornerPoints) -> Result<()> {
    let mut polygon: Vector<Point> = Vector::new();
    for corner in corners {
        polygon.push(Point::new(corner.x, corner.y));
    }
    let mut polygons: Vector<Vector<Point>> = Vector::new();
    polygons.push(polygon);

    let box_color = Scalar::new(0.0, 255.0, 0.0, 0.0); // green
    imgproc::polylines(
        image,
        &polygons,
        true,
        box_color,
        BOX_THICKNESS,
        imgproc::LINE_8,
        0,
    )?;

    let cx = corners.iter().map(|p| p.x).sum::<i32>() / 4;
    let cy = corners.iter().map(|p| p.y).sum::<i32>() / 4;
    let center_color = Scalar::new(0.0, 0.0, 255.0, 0.0); // red
    imgproc::circle(
        image,
        Point::new(cx, cy),
        CENTER_RADIUS,
        center_color,
        -1,
        imgproc::LINE_8,
        0,
    )?;
    Ok(())
}

/// Dimension label in whatever unit the camera depth was given in,
/// e.g. `W: 12.0cm, H: 7.5cm`.
pub fn size_label(physical: &PhysicalSize, unit: &str) -> String {
    format!(
        "W: {:.1}{}, H: {:.1}{}",
        physical.width, unit, physical.height, unit
    )
}

/// Label a measured box with its class, confidence, and physical size.
pub fn draw_labels(
    image: &mut Mat,
    rotated: &RotatedBox,
    detection: &DetectionBox,
    physical: &PhysicalSize,
    unit: &str,
) -> Result<()> {
    let anchor = Point::new(rotated.cx as i32, rotated.cy as i32);
    let class_line = format!(
        "Class: {}, Conf: {:.1}%",
        detection.class_id,
        detection.confidence * 100.0
    );
    let size_line = size_label(physical, unit);

    let label_color = Scalar::all(255.0);
    imgproc::put_text(
        image,
        &class_line,
        anchor,
        imgproc::FONT_HERSHEY_SIMPLEX,
        LABEL_SCALE,
        label_color,
        LABEL_THICKNESS,
        imgproc::LINE_8,
        false,
    )?;
    imgproc::put_text(
        image,
        &size_line,
        Point::new(anchor.x, anchor.y + LABEL_LINE_SPACING),
        imgproc::FONT_HERSHEY_SIMPLEX,
        LABEL_SCALE,
        label_color,
        LABEL_THICKNESS,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxgauge_common::PointPx;
    use opencv::core::{self, Scalar, CV_8UC3};

    #[test]
    fn drawing_touches_the_frame() {
        let mut frame =
            Mat::new_rows_cols_with_default(100, 100, CV_8UC3, Scalar::all(0.0)).unwrap();
        let corners = [
            PointPx::new(20, 20),
            PointPx::new(80, 20),
            PointPx::new(80, 60),
            PointPx::new(20, 60),
        ];
        draw_rotated_box(&mut frame, &corners).unwrap();

        let mut gray = Mat::default();
        imgproc::cvt_color(
            &frame,
            &mut gray,
            imgproc::COLOR_BGR2GRAY,
            0,
        )
        .unwrap();
        assert!(core::count_non_zero(&gray).unwrap() > 0);
    }

    #[test]
    fn size_label_carries_the_requested_unit() {
        let physical = PhysicalSize {
            width: 12.0,
            height: 7.5,
        };
        assert_eq!(size_label(&physical, "mm"), "W: 12.0mm, H: 7.5mm");
        assert_eq!(size_label(&physical, "cm"), "W: 12.0cm, H: 7.5cm");
    }
}
