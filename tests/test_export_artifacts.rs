//! Integration tests for the per-image artifacts.
//!
//! Tests cover:
//! - Crop geometry, clamping and naming
//! - Label files agreeing with the ledger
//! - Annotated copies next to untouched sources

mod common;

use approx::assert_abs_diff_eq;
use image::GenericImageView;

use common::*;

#[test]
fn test_single_crop_dimensions() -> anyhow::Result<()> {
    let ws = Workspace::new();
    ws.add_image("street.png", 120, 100);

    let mut detector = ScriptedDetector::new().then_detect(vec![det(0, 0.8, 10.0, 10.0, 50.0, 60.0)]);
    BatchDriver::new(&ws.images_dir)
        .with_output_dir(ws.output_dir())
        .with_flags(ExportFlags {
            save_crops: true,
            ..Default::default()
        })
        .run(&mut detector)?;

    let crops_dir = ws.output_dir().join("crops");
    assert_eq!(list_files(&crops_dir), vec!["street_crop_001.jpg"]);

    let crop = image::open(crops_dir.join("street_crop_001.jpg"))?;
    assert_eq!(crop.dimensions(), (40, 50));

    Ok(())
}

#[test]
fn test_crop_numbering_matches_ledger() -> anyhow::Result<()> {
    let ws = Workspace::new();
    ws.add_image("img.png", 100, 100);

    let mut detector = ScriptedDetector::new().then_detect(vec![
        det(0, 0.9, 0.0, 0.0, 10.0, 10.0),
        det(0, 0.8, 20.0, 20.0, 30.0, 35.0),
        det(1, 0.7, 50.0, 50.0, 90.0, 60.0),
    ]);
    let summary = BatchDriver::new(&ws.images_dir)
        .with_output_dir(ws.output_dir())
        .with_flags(ExportFlags {
            save_crops: true,
            ..Default::default()
        })
        .run(&mut detector)?;

    let labels: Vec<String> = read_ledger(&summary.ledger_path)
        .into_iter()
        .skip(1)
        .map(|r| r[2].clone())
        .collect();
    assert_eq!(labels, vec!["detection1", "detection2", "detection3"]);

    let crops_dir = ws.output_dir().join("crops");
    assert_eq!(
        list_files(&crops_dir),
        vec!["img_crop_001.jpg", "img_crop_002.jpg", "img_crop_003.jpg"]
    );
    // detection2 <-> crop 002
    assert_eq!(image::open(crops_dir.join("img_crop_002.jpg"))?.dimensions(), (10, 15));
    assert_eq!(image::open(crops_dir.join("img_crop_003.jpg"))?.dimensions(), (40, 10));

    Ok(())
}

#[test]
fn test_crops_are_clamped_to_image() -> anyhow::Result<()> {
    let ws = Workspace::new();
    ws.add_image("edge.png", 100, 80);

    let mut detector = ScriptedDetector::new().then_detect(vec![
        det(0, 0.9, -10.0, -5.0, 30.0, 20.0),
        det(0, 0.8, 90.5, 70.2, 130.0, 95.0),
        det(0, 0.7, 150.0, 10.0, 180.0, 30.0),
    ]);
    let summary = BatchDriver::new(&ws.images_dir)
        .with_output_dir(ws.output_dir())
        .with_flags(ExportFlags {
            save_crops: true,
            ..Default::default()
        })
        .run(&mut detector)?;

    // the box fully outside the image produces no crop but the image still succeeds
    assert_eq!(summary.processed_images, 1);
    assert_eq!(summary.total_detections, 3);

    let crops_dir = ws.output_dir().join("crops");
    assert_eq!(list_files(&crops_dir), vec!["edge_crop_001.jpg", "edge_crop_002.jpg"]);
    assert_eq!(image::open(crops_dir.join("edge_crop_001.jpg"))?.dimensions(), (30, 20));
    assert_eq!(image::open(crops_dir.join("edge_crop_002.jpg"))?.dimensions(), (10, 10));

    Ok(())
}

#[test]
fn test_label_files_agree_with_ledger() -> anyhow::Result<()> {
    let ws = Workspace::new();
    ws.add_image("a.png", 200, 100);
    ws.add_image("b.png", 200, 100);

    let boxes = vec![det(3, 0.9, 10.0, 20.0, 110.0, 70.0), det(7, 0.6, 0.0, 0.0, 200.0, 100.0)];
    let mut detector = ScriptedDetector::new()
        .then_detect(boxes.clone())
        .then_detect(vec![]);
    let summary = BatchDriver::new(&ws.images_dir)
        .with_output_dir(ws.output_dir())
        .with_flags(ExportFlags {
            save_labels: true,
            ..Default::default()
        })
        .run(&mut detector)?;

    let labels_dir = ws.output_dir().join("labels");
    let a = std::fs::read_to_string(labels_dir.join("a.txt"))?;
    let lines: Vec<&str> = a.lines().collect();

    let ledger_rows = read_ledger(&summary.ledger_path)
        .into_iter()
        .filter(|r| r[1] == "a.png")
        .count();
    assert_eq!(lines.len(), ledger_rows);
    assert_eq!(lines[0], "3 0.300000 0.450000 0.500000 0.500000");
    assert_eq!(lines[1], "7 0.500000 0.500000 1.000000 1.000000");

    for (line, original) in lines.iter().zip(&boxes) {
        let back = YoloBox::parse(line).expect("label line").to_absolute(200, 100);
        assert_abs_diff_eq!(back.x1, original.bbox.x1, epsilon = 1e-4 * 200.0);
        assert_abs_diff_eq!(back.y1, original.bbox.y1, epsilon = 1e-4 * 100.0);
        assert_abs_diff_eq!(back.x2, original.bbox.x2, epsilon = 1e-4 * 200.0);
        assert_abs_diff_eq!(back.y2, original.bbox.y2, epsilon = 1e-4 * 100.0);
    }

    // no detections: file exists and is empty
    let b = std::fs::read_to_string(labels_dir.join("b.txt"))?;
    assert!(b.is_empty());

    Ok(())
}

#[test]
fn test_annotated_copy_leaves_source_untouched() -> anyhow::Result<()> {
    let ws = Workspace::new();
    let source = ws.add_image("cat.png", 160, 120);
    let before = std::fs::read(&source)?;

    let mut detector = ScriptedDetector::new()
        .with_names(ClassNames::new(vec!["cat".to_string()]))
        .then_detect(vec![det(0, 0.87, 40.0, 50.0, 120.0, 110.0)]);
    BatchDriver::new(&ws.images_dir)
        .with_output_dir(ws.output_dir())
        .with_flags(ExportFlags {
            save_annotated: true,
            ..Default::default()
        })
        .run(&mut detector)?;

    assert_eq!(std::fs::read(&source)?, before);
    assert_eq!(list_files(&ws.images_dir), vec!["cat.png"]);

    let annotated_path = ws.output_dir().join("annotated").join("cat_annotated.png");
    let annotated = image::open(&annotated_path)?.to_rgb8();
    assert_eq!(annotated.dimensions(), (160, 120));
    // left edge of the box is drawn in green
    assert_eq!(annotated.get_pixel(40, 80), &image::Rgb([0, 255, 0]));

    Ok(())
}

#[test]
fn test_no_detection_image_has_no_crops_or_annotation() -> anyhow::Result<()> {
    let ws = Workspace::new();
    ws.add_image("empty.png", 30, 30);

    let mut detector = ScriptedDetector::new().then_detect(vec![]);
    let summary = BatchDriver::new(&ws.images_dir)
        .with_output_dir(ws.output_dir())
        .with_flags(ExportFlags::all())
        .run(&mut detector)?;

    assert_eq!(summary.processed_images, 1);
    let out = ws.output_dir();
    assert!(list_files(&out.join("crops")).is_empty());
    assert!(list_files(&out.join("annotated")).is_empty());
    assert_eq!(list_files(&out.join("labels")), vec!["empty.txt"]);

    Ok(())
}
