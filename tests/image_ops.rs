//! End-to-end checks of the core image operations on synthetic buffers.

use easycv::{
    color_at, convert_color_space, create_blank_image, create_image_grid, crop_image,
    get_image_info, resize_image, Color, ColorSpace, Error, GridSpec, ResizeSpec,
};
use opencv::core::Vec3b;
use opencv::prelude::*;

#[test]
fn blank_image_has_requested_extent_and_color() {
    let image = create_blank_image(64, 32, Color::GREEN).unwrap();
    assert_eq!((image.cols(), image.rows(), image.channels()), (64, 32, 3));
    let px = image.at_2d::<Vec3b>(10, 10).unwrap();
    assert_eq!([px[0], px[1], px[2]], [0, 255, 0]);

    assert!(create_blank_image(0, 32, Color::BLACK).is_err());
}

#[test]
fn resize_by_width_preserves_aspect_ratio() {
    let image = create_blank_image(100, 100, Color::BLACK).unwrap();
    let resized = resize_image(&image, &ResizeSpec::width(50)).unwrap();
    assert_eq!((resized.cols(), resized.rows()), (50, 50));

    let wide = create_blank_image(200, 100, Color::BLACK).unwrap();
    let resized = resize_image(&wide, &ResizeSpec::width(50)).unwrap();
    assert_eq!((resized.cols(), resized.rows()), (50, 25));

    let scaled = resize_image(&wide, &ResizeSpec::scale(2.0)).unwrap();
    assert_eq!((scaled.cols(), scaled.rows()), (400, 200));
}

#[test]
fn resize_without_target_is_rejected() {
    let image = create_blank_image(10, 10, Color::BLACK).unwrap();
    let err = resize_image(&image, &ResizeSpec::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn crop_inside_bounds_returns_exact_region() {
    let image = create_blank_image(100, 80, Color::RED).unwrap();
    let cropped = crop_image(&image, 10, 20, 30, 40).unwrap();
    assert_eq!((cropped.cols(), cropped.rows()), (30, 40));
}

#[test]
fn crop_out_of_bounds_fails_instead_of_clamping() {
    let image = create_blank_image(100, 100, Color::RED).unwrap();
    // x + width = 110 > 100: no silent clamp.
    assert!(crop_image(&image, 90, 0, 20, 50).is_err());
    assert!(crop_image(&image, -1, 0, 10, 10).is_err());
    assert!(crop_image(&image, 0, 0, 0, 10).is_err());
    // Extreme origins must error, not overflow the bounds arithmetic.
    assert!(crop_image(&image, i32::MAX, 0, 2, 2).is_err());
    assert!(crop_image(&image, 0, i32::MAX - 1, 2, 2).is_err());
}

#[test]
fn gray_conversion_yields_single_channel() {
    let image = create_blank_image(32, 32, Color::WHITE).unwrap();
    let gray = convert_color_space(&image, ColorSpace::Bgr, ColorSpace::Gray).unwrap();
    assert_eq!(gray.channels(), 1);
    assert_eq!((gray.cols(), gray.rows()), (32, 32));
    assert_eq!(*gray.at_2d::<u8>(0, 0).unwrap(), 255);

    // The info query must report the channel count, not raw dimensionality.
    let info = get_image_info(&gray).unwrap();
    assert_eq!(info.channels, 1);
    assert_eq!((info.width, info.height), (32, 32));
}

#[test]
fn unsupported_conversion_pair_errors() {
    let image = create_blank_image(8, 8, Color::WHITE).unwrap();
    let gray = convert_color_space(&image, ColorSpace::Bgr, ColorSpace::Gray).unwrap();
    assert!(convert_color_space(&gray, ColorSpace::Gray, ColorSpace::Hsv).is_err());
}

#[test]
fn image_info_reports_geometry() {
    let image = create_blank_image(120, 90, Color::BLUE).unwrap();
    let info = get_image_info(&image).unwrap();
    assert_eq!(info.width, 120);
    assert_eq!(info.height, 90);
    assert_eq!(info.channels, 3);
    assert_eq!(info.bit_depth, 8);
    assert_eq!(info.size_bytes, 120 * 90 * 3);
}

#[test]
fn color_at_samples_and_bounds_checks() {
    let image = create_blank_image(10, 10, Color::YELLOW).unwrap();
    assert_eq!(color_at(&image, 5, 5).unwrap(), Color::YELLOW);
    assert!(color_at(&image, 10, 5).is_err());
    assert!(color_at(&image, 0, -1).is_err());
}

#[test]
fn grid_normalizes_mixed_inputs() {
    let bgr = create_blank_image(100, 50, Color::RED).unwrap();
    let gray = convert_color_space(&bgr, ColorSpace::Bgr, ColorSpace::Gray).unwrap();
    let small = create_blank_image(10, 10, Color::BLUE).unwrap();

    let spec = GridSpec {
        cell_size: (80, 60),
        ..Default::default()
    };
    let grid = create_image_grid(&[bgr, gray, small], &spec).unwrap();
    // Three images pack into a 2x2 near-square layout.
    assert_eq!((grid.cols(), grid.rows()), (160, 120));
    assert_eq!(grid.channels(), 3);
}

#[test]
fn grid_rejects_undersized_layout() {
    let image = create_blank_image(10, 10, Color::BLACK).unwrap();
    let spec = GridSpec {
        grid_size: Some((1, 2)),
        ..Default::default()
    };
    let frames = vec![
        image.try_clone().unwrap(),
        image.try_clone().unwrap(),
        image,
    ];
    assert!(create_image_grid(&frames, &spec).is_err());
    assert!(create_image_grid(&[], &GridSpec::default()).is_err());
}
