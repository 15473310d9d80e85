//! Geometric transformations: rotation, flipping, translation, perspective
//! warps and lens-style effects.

use std::str::FromStr;

use opencv::core::{self, Mat, Point2f, Size, Vector};
use opencv::imgproc;
use opencv::prelude::*;

use crate::color::Color;
use crate::util::validate::unit_range;
use crate::util::{Error, Result};

/// How pixels outside the source are filled after a warp.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BorderMode {
    /// Fill with a solid color.
    Constant(Color),
    /// Repeat the outermost row/column.
    Replicate,
    /// Mirror across the border.
    Reflect,
}

impl Default for BorderMode {
    fn default() -> Self {
        BorderMode::Constant(Color::BLACK)
    }
}

impl BorderMode {
    fn flag(self) -> i32 {
        match self {
            BorderMode::Constant(_) => core::BORDER_CONSTANT,
            BorderMode::Replicate => core::BORDER_REPLICATE,
            BorderMode::Reflect => core::BORDER_REFLECT,
        }
    }

    fn value(self) -> core::Scalar {
        match self {
            BorderMode::Constant(color) => color.to_scalar(),
            _ => core::Scalar::default(),
        }
    }
}

/// Parameters for [`rotate_image`].
#[derive(Clone, Debug)]
pub struct RotationSpec {
    /// Rotation center; defaults to the image center.
    pub center: Option<(i32, i32)>,
    /// Uniform scale applied with the rotation.
    pub scale: f64,
    /// Grow the canvas so the rotated image is not clipped.
    pub expand: bool,
    pub border: BorderMode,
}

impl Default for RotationSpec {
    fn default() -> Self {
        RotationSpec {
            center: None,
            scale: 1.0,
            expand: false,
            border: BorderMode::default(),
        }
    }
}

/// Rotates an image counter-clockwise by `angle_deg`.
pub fn rotate_image(image: &Mat, angle_deg: f64, spec: &RotationSpec) -> Result<Mat> {
    if spec.scale <= 0.0 {
        return Err(Error::invalid(format!(
            "scale must be positive, got {}",
            spec.scale
        )));
    }
    let (cols, rows) = (image.cols(), image.rows());
    let center = match spec.center {
        Some((x, y)) => Point2f::new(x as f32, y as f32),
        None => Point2f::new(cols as f32 / 2.0, rows as f32 / 2.0),
    };
    let mut matrix = imgproc::get_rotation_matrix_2d(center, angle_deg, spec.scale)?;

    let out_size = if spec.expand {
        let radians = angle_deg.to_radians();
        let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
        let new_w = (f64::from(rows) * sin + f64::from(cols) * cos).ceil() as i32;
        let new_h = (f64::from(rows) * cos + f64::from(cols) * sin).ceil() as i32;
        // Shift the transform so the rotated content stays centered.
        *matrix.at_2d_mut::<f64>(0, 2)? += f64::from(new_w) / 2.0 - f64::from(center.x);
        *matrix.at_2d_mut::<f64>(1, 2)? += f64::from(new_h) / 2.0 - f64::from(center.y);
        Size::new(new_w, new_h)
    } else {
        Size::new(cols, rows)
    };

    let mut rotated = Mat::default();
    imgproc::warp_affine(
        image,
        &mut rotated,
        &matrix,
        out_size,
        imgproc::INTER_LINEAR,
        spec.border.flag(),
        spec.border.value(),
    )?;
    Ok(rotated)
}

/// Mirror axis for [`flip_image`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
    Both,
}

impl FlipDirection {
    fn flip_code(self) -> i32 {
        match self {
            FlipDirection::Horizontal => 1,
            FlipDirection::Vertical => 0,
            FlipDirection::Both => -1,
        }
    }
}

impl FromStr for FlipDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "horizontal" => Ok(FlipDirection::Horizontal),
            "vertical" => Ok(FlipDirection::Vertical),
            "both" => Ok(FlipDirection::Both),
            other => Err(Error::Unsupported {
                what: "flip direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Mirrors an image across the requested axis.
pub fn flip_image(image: &Mat, direction: FlipDirection) -> Result<Mat> {
    let mut flipped = Mat::default();
    core::flip(image, &mut flipped, direction.flip_code())?;
    Ok(flipped)
}

/// Shifts an image by `(dx, dy)` pixels, filling uncovered areas black.
pub fn translate_image(image: &Mat, dx: i32, dy: i32) -> Result<Mat> {
    let matrix = Mat::from_slice_2d(&[
        [1.0f32, 0.0, dx as f32],
        [0.0, 1.0, dy as f32],
    ])?;
    let mut shifted = Mat::default();
    imgproc::warp_affine_def(image, &mut shifted, &matrix, image.size()?)?;
    Ok(shifted)
}

/// Fits an image inside `width` x `height` without distortion, padding the
/// remainder with `pad_color` (letterboxing).
pub fn resize_with_aspect_ratio(
    image: &Mat,
    width: i32,
    height: i32,
    pad_color: Color,
) -> Result<Mat> {
    if width <= 0 || height <= 0 {
        return Err(Error::invalid(format!(
            "target extent must be positive, got {width}x{height}"
        )));
    }
    let (src_w, src_h) = (f64::from(image.cols()), f64::from(image.rows()));
    let scale = (f64::from(width) / src_w).min(f64::from(height) / src_h);
    let fitted_w = ((src_w * scale).round() as i32).clamp(1, width);
    let fitted_h = ((src_h * scale).round() as i32).clamp(1, height);

    let mut fitted = Mat::default();
    imgproc::resize(
        image,
        &mut fitted,
        Size::new(fitted_w, fitted_h),
        0.0,
        0.0,
        imgproc::INTER_AREA,
    )?;

    let left = (width - fitted_w) / 2;
    let top = (height - fitted_h) / 2;
    let mut boxed = Mat::default();
    core::copy_make_border(
        &fitted,
        &mut boxed,
        top,
        height - fitted_h - top,
        left,
        width - fitted_w - left,
        core::BORDER_CONSTANT,
        pad_color.to_scalar(),
    )?;
    Ok(boxed)
}

/// Warps the quadrilateral `src_quad` (clockwise from top-left) onto a
/// `width` x `height` rectangle.
pub fn warp_perspective(
    image: &Mat,
    src_quad: [(f32, f32); 4],
    width: i32,
    height: i32,
) -> Result<Mat> {
    if width <= 0 || height <= 0 {
        return Err(Error::invalid(format!(
            "output extent must be positive, got {width}x{height}"
        )));
    }
    let src: Vector<Point2f> = src_quad
        .iter()
        .map(|&(x, y)| Point2f::new(x, y))
        .collect();
    let dst: Vector<Point2f> = [
        (0.0, 0.0),
        (width as f32, 0.0),
        (width as f32, height as f32),
        (0.0, height as f32),
    ]
    .iter()
    .map(|&(x, y)| Point2f::new(x, y))
    .collect();
    let matrix = imgproc::get_perspective_transform_def(&src, &dst)?;
    let mut warped = Mat::default();
    imgproc::warp_perspective_def(image, &mut warped, &matrix, Size::new(width, height))?;
    Ok(warped)
}

/// Barrel-distortion "fisheye" look. `strength` in `[0, 1]` controls how
/// much the edges bow outward; the pixel remapping is done by OpenCV.
pub fn fisheye_effect(image: &Mat, strength: f64) -> Result<Mat> {
    let strength = unit_range("strength", strength)?;
    let (cols, rows) = (image.cols(), image.rows());
    let (cx, cy) = (f64::from(cols) / 2.0, f64::from(rows) / 2.0);
    let radius = cx.max(cy);

    let zero = core::Scalar::default();
    let mut map_x = Mat::new_rows_cols_with_default(rows, cols, core::CV_32FC1, zero)?;
    let mut map_y = Mat::new_rows_cols_with_default(rows, cols, core::CV_32FC1, zero)?;
    for y in 0..rows {
        for x in 0..cols {
            let dx = (f64::from(x) - cx) / radius;
            let dy = (f64::from(y) - cy) / radius;
            let r2 = dx * dx + dy * dy;
            let factor = 1.0 + strength * r2;
            *map_x.at_2d_mut::<f32>(y, x)? = (cx + dx * radius / factor) as f32;
            *map_y.at_2d_mut::<f32>(y, x)? = (cy + dy * radius / factor) as f32;
        }
    }

    let mut distorted = Mat::default();
    imgproc::remap_def(image, &mut distorted, &map_x, &map_y, imgproc::INTER_LINEAR)?;
    Ok(distorted)
}
