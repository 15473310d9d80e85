//! Filters and geometric transforms exercised on synthetic images.

use easycv::{
    create_blank_image, detect_contours, detect_corners, draw_circle, draw_rectangle,
    edge_detection, fisheye_effect, flip_image, gaussian_blur, median_blur,
    resize_with_aspect_ratio, rotate_image, threshold, translate_image, vintage, warp_perspective,
    Color, ContourSpec,
    CornerSpec, EdgeMethod, EdgeSpec, FlipDirection, RotationSpec, ThresholdSpec,
};
use opencv::core::{Mat, Vec3b};
use opencv::prelude::*;

fn square_on_black(extent: i32, square: (i32, i32, i32, i32)) -> Mat {
    let mut image = create_blank_image(extent, extent, Color::BLACK).unwrap();
    let (x, y, w, h) = square;
    draw_rectangle(&mut image, (x, y), (x + w, y + h), Color::WHITE, 1, true).unwrap();
    image
}

#[test]
fn gaussian_blur_validates_kernel_and_keeps_extent() {
    let image = square_on_black(64, (16, 16, 32, 32));
    assert!(gaussian_blur(&image, 0, 0.0).is_err());
    assert!(gaussian_blur(&image, -5, 0.0).is_err());

    // Even kernels are rounded up, not rejected.
    let blurred = gaussian_blur(&image, 4, 0.0).unwrap();
    assert_eq!((blurred.cols(), blurred.rows()), (64, 64));

    assert!(median_blur(&image, 0).is_err());
}

#[test]
fn threshold_produces_binary_output() {
    let image = square_on_black(64, (0, 0, 32, 64));
    let binary = threshold(&image, 127.0, &ThresholdSpec::default()).unwrap();
    assert_eq!(binary.channels(), 1);
    for &(x, expected) in &[(10, 255u8), (50, 0u8)] {
        assert_eq!(*binary.at_2d::<u8>(32, x).unwrap(), expected);
    }
    assert!(threshold(&image, 300.0, &ThresholdSpec::default()).is_err());
}

#[test]
fn edge_detection_returns_edge_map() {
    let image = square_on_black(64, (16, 16, 32, 32));
    let edges = edge_detection(&image, &EdgeSpec::default()).unwrap();
    assert_eq!(edges.channels(), 1);
    assert_eq!((edges.cols(), edges.rows()), (64, 64));
    // The square boundary must light up somewhere.
    assert!(opencv::core::count_non_zero(&edges).unwrap() > 0);
}

#[test]
fn edge_detection_honors_the_aperture() {
    let image = square_on_black(64, (16, 16, 32, 32));
    for method in [EdgeMethod::Canny, EdgeMethod::Sobel, EdgeMethod::Laplacian] {
        let spec = EdgeSpec {
            method,
            aperture: 5,
            ..Default::default()
        };
        let edges = edge_detection(&image, &spec).unwrap();
        assert!(opencv::core::count_non_zero(&edges).unwrap() > 0);

        let bad = EdgeSpec {
            method,
            aperture: 4,
            ..Default::default()
        };
        assert!(edge_detection(&image, &bad).is_err());
    }
}

#[test]
fn vintage_intensity_is_bounded() {
    let image = square_on_black(16, (0, 0, 8, 8));
    assert!(vintage(&image, 1.5).is_err());
    assert!(vintage(&image, -0.1).is_err());
    let toned = vintage(&image, 0.8).unwrap();
    assert_eq!((toned.cols(), toned.rows()), (16, 16));
}

#[test]
fn flip_moves_pixels_across_the_axis() {
    let mut image = create_blank_image(10, 10, Color::BLACK).unwrap();
    draw_rectangle(&mut image, (0, 0), (1, 1), Color::WHITE, 1, true).unwrap();
    let flipped = flip_image(&image, FlipDirection::Horizontal).unwrap();
    let px = flipped.at_2d::<Vec3b>(0, 9).unwrap();
    assert_eq!(px[0], 255);
    let origin = flipped.at_2d::<Vec3b>(0, 0).unwrap();
    assert_eq!(origin[0], 0);
}

#[test]
fn rotation_with_expand_grows_the_canvas() {
    let image = create_blank_image(100, 50, Color::WHITE).unwrap();
    let same = rotate_image(&image, 90.0, &RotationSpec::default()).unwrap();
    assert_eq!((same.cols(), same.rows()), (100, 50));

    let expanded = rotate_image(
        &image,
        90.0,
        &RotationSpec {
            expand: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!((expanded.cols(), expanded.rows()), (50, 100));

    assert!(rotate_image(
        &image,
        10.0,
        &RotationSpec {
            scale: 0.0,
            ..Default::default()
        }
    )
    .is_err());
}

#[test]
fn translation_shifts_content() {
    let mut image = create_blank_image(20, 20, Color::BLACK).unwrap();
    draw_rectangle(&mut image, (0, 0), (2, 2), Color::WHITE, 1, true).unwrap();
    let shifted = translate_image(&image, 5, 7).unwrap();
    assert_eq!((shifted.cols(), shifted.rows()), (20, 20));
    assert_eq!(shifted.at_2d::<Vec3b>(8, 6).unwrap()[0], 255);
    assert_eq!(shifted.at_2d::<Vec3b>(1, 1).unwrap()[0], 0);
}

#[test]
fn letterbox_pads_to_requested_extent() {
    let image = create_blank_image(100, 50, Color::WHITE).unwrap();
    let boxed = resize_with_aspect_ratio(&image, 80, 80, Color::RED).unwrap();
    assert_eq!((boxed.cols(), boxed.rows()), (80, 80));
    // Top band is padding.
    let top = boxed.at_2d::<Vec3b>(2, 40).unwrap();
    assert_eq!([top[0], top[1], top[2]], [0, 0, 255]);
    // Middle is image content.
    let middle = boxed.at_2d::<Vec3b>(40, 40).unwrap();
    assert_eq!([middle[0], middle[1], middle[2]], [255, 255, 255]);
}

#[test]
fn perspective_warp_outputs_requested_extent() {
    let image = square_on_black(100, (20, 20, 60, 60));
    let warped =
        warp_perspective(&image, [(20.0, 20.0), (80.0, 20.0), (80.0, 80.0), (20.0, 80.0)], 50, 50)
            .unwrap();
    assert_eq!((warped.cols(), warped.rows()), (50, 50));
    assert!(warp_perspective(&image, [(0.0, 0.0); 4], 0, 50).is_err());
}

#[test]
fn fisheye_strength_is_bounded() {
    let image = square_on_black(32, (8, 8, 16, 16));
    assert!(fisheye_effect(&image, 1.2).is_err());
    let bent = fisheye_effect(&image, 0.4).unwrap();
    assert_eq!((bent.cols(), bent.rows()), (32, 32));
}

#[test]
fn contours_find_a_single_square() {
    let image = square_on_black(100, (20, 30, 40, 20));
    let contours = detect_contours(&image, &ContourSpec::default()).unwrap();
    assert_eq!(contours.len(), 1);

    let contour = &contours[0];
    // Drawn inclusively, so the traced region is one pixel wider than w x h.
    assert!((contour.area() - 40.0 * 20.0).abs() < 100.0);
    let rect = contour.bounding_rect().unwrap();
    assert_eq!((rect.x, rect.y), (20, 30));
    let (cx, cy) = contour.centroid().unwrap().unwrap();
    assert!((cx - 40.0).abs() < 2.0);
    assert!((cy - 40.0).abs() < 2.0);
}

#[test]
fn contour_area_filter_drops_small_regions() {
    let mut image = square_on_black(100, (10, 10, 40, 40));
    draw_circle(&mut image, (80, 80), 3, Color::WHITE, 1, true).unwrap();

    let all = detect_contours(&image, &ContourSpec::default()).unwrap();
    assert_eq!(all.len(), 2);

    let large_only = detect_contours(
        &image,
        &ContourSpec {
            min_area: 100.0,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(large_only.len(), 1);
}

#[test]
fn corners_of_a_square_are_found() {
    let image = square_on_black(100, (25, 25, 50, 50));
    let corners = detect_corners(&image, &CornerSpec::default()).unwrap();
    assert!(corners.len() >= 4);

    assert!(detect_corners(
        &image,
        &CornerSpec {
            quality_level: 0.0,
            ..Default::default()
        }
    )
    .is_err());
}
