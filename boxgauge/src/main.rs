// boxgauge CLI
// Reads an image, refines externally supplied detection boxes into rotated
// boxes, and reports their physical dimensions

use anyhow::{bail, Context, Result};
use boxgauge::detect::{Detector, FixedBoxes};
use boxgauge::{draw, pipeline};
use boxgauge_common::{CameraModel, DetectionBox};
use clap::Parser;
use opencv::{core::Vector, imgcodecs, prelude::*};

/// Measure objects by refining detection boxes into rotated bounding boxes
#[derive(Parser, Debug)]
#[command(name = "boxgauge")]
#[command(about = "Refine detection boxes into rotated boxes and measure them", long_about = None)]
struct Args {
    /// Input image file path
    #[arg(short, long)]
    input: String,

    /// Annotated output image path
    #[arg(short, long, default_value = "output.jpg")]
    output: String,

    /// Detection box as x1,y1,x2,y2[,class[,confidence]] (repeatable)
    #[arg(short, long = "bbox", value_name = "BOX")]
    bboxes: Vec<String>,

    /// Minimum contour area as a share of the crop area
    #[arg(long, default_value_t = pipeline::DEFAULT_MIN_AREA_RATIO)]
    min_area_ratio: f64,

    /// Confidence threshold below which detections are skipped
    #[arg(long, default_value_t = 0.4)]
    confidence: f32,

    /// Assumed distance from camera to object plane, in `--unit` units
    #[arg(long, default_value_t = 100.0)]
    depth: f64,

    /// Unit name for depth and reported dimensions
    #[arg(long, default_value = "cm")]
    unit: String,

    /// Approximate focal length in pixel units
    #[arg(long, default_value_t = 1000.0)]
    focal_length: f64,

    /// Print measurements as JSON lines instead of plain text
    #[arg(long)]
    json: bool,

    /// Save intermediate enhanced crops and binary masks
    #[arg(short, long)]
    debug: bool,
}

fn parse_bbox(spec: &str) -> Result<DetectionBox> {
    let fields: Vec<&str> = spec.split(',').collect();
    if fields.len() < 4 || fields.len() > 6 {
        bail!(
            "bbox must be x1,y1,x2,y2[,class[,confidence]], got: {}",
            spec
        );
    }
    let mut coords = [0.0f32; 4];
    for (slot, field) in coords.iter_mut().zip(&fields) {
        *slot = field
            .trim()
            .parse()
            .with_context(|| format!("invalid bbox coordinate: {}", field))?;
    }
    let class_id = match fields.get(4) {
        Some(f) => f
            .trim()
            .parse()
            .with_context(|| format!("invalid bbox class: {}", f))?,
        None => 0,
    };
    let confidence = match fields.get(5) {
        Some(f) => f
            .trim()
            .parse()
            .with_context(|| format!("invalid bbox confidence: {}", f))?,
        None => 1.0,
    };
    Ok(DetectionBox::new(
        coords[0], coords[1], coords[2], coords[3], class_id, confidence,
    ))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("BoxGauge - Rotated Box Measurement");
    println!("==================================");
    println!("Input: {}", args.input);
    println!("Output: {}", args.output);
    println!("Min area ratio: {}", args.min_area_ratio);
    println!("Confidence threshold: {}", args.confidence);
    println!("Assumed depth: {}{}", args.depth, args.unit);
    println!("Focal length: {}px", args.focal_length);
    println!();

    let frame = imgcodecs::imread(&args.input, imgcodecs::IMREAD_COLOR)
        .with_context(|| format!("could not open image: {}", args.input))?;
    if frame.empty() {
        bail!("could not read image: {}", args.input);
    }

    let boxes = args
        .bboxes
        .iter()
        .map(|spec| parse_bbox(spec))
        .collect::<Result<Vec<_>>>()?;
    if boxes.is_empty() {
        bail!("at least one --bbox is required");
    }

    // Boxes come from an external detector; here they arrive pre-computed.
    let mut detector = FixedBoxes::new(boxes);
    let detections = detector.detect(&frame)?;
    println!("Processing {} detection(s)", detections.len());

    let camera = CameraModel::new(args.depth, args.focal_length);
    let debug_prefix = if args.debug {
        Some(args.output.as_str())
    } else {
        None
    };

    let measurements = pipeline::measure_detections(
        &frame,
        &detections,
        args.min_area_ratio,
        args.confidence,
        &camera,
        debug_prefix,
    );

    let mut annotated = frame.try_clone()?;
    for measurement in &measurements {
        draw::draw_rotated_box(&mut annotated, &measurement.corners)?;
        draw::draw_labels(
            &mut annotated,
            &measurement.rotated,
            &measurement.detection,
            &measurement.physical,
            &args.unit,
        )?;

        if args.json {
            println!("{}", serde_json::to_string(measurement)?);
        } else {
            println!(
                "Object {}: {}, {}, Conf: {:.1}%",
                measurement.detection.class_id,
                measurement.rotated,
                draw::size_label(&measurement.physical, &args.unit),
                measurement.detection.confidence * 100.0
            );
        }
    }
    if measurements.is_empty() {
        println!("No shapes found.");
    }

    imgcodecs::imwrite(&args.output, &annotated, &Vector::new())?;
    println!("Saved annotated image to: {}", args.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_parsing_fills_defaults() {
        let b = parse_bbox("10,20,110,220").unwrap();
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (10.0, 20.0, 110.0, 220.0));
        assert_eq!(b.class_id, 0);
        assert_eq!(b.confidence, 1.0);
    }

    #[test]
    fn bbox_parsing_reads_class_and_confidence() {
        let b = parse_bbox("1.5, 2.5, 30, 40, 7, 0.65").unwrap();
        assert_eq!(b.class_id, 7);
        assert!((b.confidence - 0.65).abs() < 1e-6);
    }

    #[test]
    fn bbox_parsing_rejects_malformed_specs() {
        assert!(parse_bbox("10,20,30").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
        assert!(parse_bbox("1,2,3,4,5,6,7").is_err());
    }
}
