// Shape fitting module
// Simplifies the dominant contour, hulls it, and fits the minimum-area
// rotated rectangle; also maps the fit back into frame coordinates

use anyhow::Result;
use boxgauge_common::{CornerPoints, PointPx, RotatedBox};
use opencv::{
    core::{Point, Point2f, Vector},
    imgproc,
    prelude::*,
};

/// Polygon approximation tolerance as a share of the contour perimeter
const APPROX_EPSILON_RATIO: f64 = 0.02;

/// Fit the minimum-area rotated rectangle around a contour.
///
/// The boundary is simplified with Douglas-Peucker at a tolerance of 2% of
/// the perimeter, the convex hull of the simplified polygon strips
/// concavities left by noise or occlusion, and the hull is wrapped in its
/// minimum-area rectangle. Coordinates stay local to the mask the contour
/// came from; corners are rounded to integer pixels. A near-degenerate
/// rectangle from a near-linear hull is a valid result and passes through
/// unchanged.
pub fn min_area_box(contour: &Vector<Point>) -> Result<(RotatedBox, CornerPoints)> {
    let perimeter = imgproc::arc_length(contour, true)?;

    let mut approx: Vector<Point> = Vector::new();
    imgproc::approx_poly_dp(contour, &mut approx, APPROX_EPSILON_RATIO * perimeter, true)?;

    let mut hull: Vector<Point> = Vector::new();
    imgproc::convex_hull(&approx, &mut hull, false, true)?;

    let rect = imgproc::min_area_rect(&hull)?;
    let mut vertices = [Point2f::default(); 4];
    rect.points(&mut vertices)?;

    let corners = [
        round_point(vertices[0]),
        round_point(vertices[1]),
        round_point(vertices[2]),
        round_point(vertices[3]),
    ];
    let rotated = RotatedBox {
        cx: f64::from(rect.center.x),
        cy: f64::from(rect.center.y),
        width: f64::from(rect.size.width),
        height: f64::from(rect.size.height),
        angle_deg: f64::from(rect.angle),
    };
    Ok((rotated, corners))
}

/// Translate a fitted box and its corners from crop-local coordinates into
/// full-frame coordinates. A pure shift: size and angle are
/// translation-invariant, so mapping with offset `(0, 0)` is a no-op.
pub fn to_frame_coords(
    rotated: &RotatedBox,
    corners: &CornerPoints,
    offset: (i32, i32),
) -> (RotatedBox, CornerPoints) {
    let (dx, dy) = offset;
    let mapped = rotated.translated(f64::from(dx), f64::from(dy));
    let mapped_corners = corners.map(|p| PointPx::new(p.x + dx, p.y + dy));
    (mapped, mapped_corners)
}

fn round_point(p: Point2f) -> PointPx {
    PointPx::new(p.x.round() as i32, p.y.round() as i32)
}
