//! Watermarking, sketching and comparison panels.

use easycv::{
    apply_watermark, convert_to_sketch, create_blank_image, image_comparison, Color, WatermarkSpec,
};
use opencv::prelude::*;

#[test]
fn watermark_keeps_extent_and_validates_opacity() {
    let image = create_blank_image(200, 100, Color::BLUE).unwrap();
    let marked = apply_watermark(&image, "demo", &WatermarkSpec::default()).unwrap();
    assert_eq!((marked.cols(), marked.rows()), (200, 100));

    let spec = WatermarkSpec {
        opacity: 1.5,
        ..Default::default()
    };
    assert!(apply_watermark(&image, "demo", &spec).is_err());
}

#[test]
fn sketch_is_single_channel() {
    let image = create_blank_image(64, 64, Color::new(100, 150, 200)).unwrap();
    let sketch = convert_to_sketch(&image).unwrap();
    assert_eq!(sketch.channels(), 1);
    assert_eq!((sketch.cols(), sketch.rows()), (64, 64));
}

#[test]
fn comparison_panel_is_side_by_side() {
    let left = create_blank_image(100, 80, Color::RED).unwrap();
    let right = create_blank_image(50, 40, Color::GREEN).unwrap();
    let panel = image_comparison(&left, &right, "before", "after").unwrap();
    assert_eq!(panel.rows(), 80);
    // Right half is scaled to the left image's height, keeping its ratio.
    assert_eq!(panel.cols(), 100 + 100);
    assert_eq!(panel.channels(), 3);
}
