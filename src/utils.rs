//! Higher-level conveniences: grid composition, watermarking, sketch
//! conversion, side-by-side comparison and an FPS counter.

use std::str::FromStr;
use std::time::Instant;

use opencv::core::{self, Mat, Rect, Size, Vec3b};
use opencv::imgproc;
use opencv::prelude::*;
use tracing::debug;

use crate::color::Color;
use crate::draw::{draw_text, TextSpec};
use crate::filters::gaussian_blur;
use crate::imgops::to_gray;
use crate::util::validate::{grid_layout, unit_range};
use crate::util::{Error, Result};

/// Layout for [`create_image_grid`].
#[derive(Clone, Debug)]
pub struct GridSpec {
    /// `(rows, cols)`; chosen near-square when `None`.
    pub grid_size: Option<(usize, usize)>,
    /// Every input is resized to this cell extent.
    pub cell_size: (i32, i32),
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            grid_size: None,
            cell_size: (200, 200),
        }
    }
}

fn to_bgr(image: &Mat) -> Result<Mat> {
    match image.channels() {
        3 => Ok(image.try_clone()?),
        1 => {
            let mut bgr = Mat::default();
            imgproc::cvt_color_def(image, &mut bgr, imgproc::COLOR_GRAY2BGR)?;
            Ok(bgr)
        }
        4 => {
            let mut bgr = Mat::default();
            imgproc::cvt_color_def(image, &mut bgr, imgproc::COLOR_BGRA2BGR)?;
            Ok(bgr)
        }
        n => Err(Error::invalid(format!(
            "cannot composite an image with {n} channels"
        ))),
    }
}

/// Tiles images into one buffer.
///
/// Inputs of mixed sizes and channel counts are normalized first: every
/// image becomes 3-channel BGR and is resized to the cell extent. Unused
/// trailing cells stay black.
pub fn create_image_grid(images: &[Mat], spec: &GridSpec) -> Result<Mat> {
    let (cell_w, cell_h) = spec.cell_size;
    if cell_w <= 0 || cell_h <= 0 {
        return Err(Error::invalid(format!(
            "cell extent must be positive, got {cell_w}x{cell_h}"
        )));
    }
    let (rows, cols) = grid_layout(images.len(), spec.grid_size)?;

    let mut canvas = Mat::new_rows_cols_with_default(
        rows as i32 * cell_h,
        cols as i32 * cell_w,
        core::CV_8UC3,
        Color::BLACK.to_scalar(),
    )?;
    for (index, image) in images.iter().enumerate() {
        let bgr = to_bgr(image)?;
        let mut resized = Mat::default();
        imgproc::resize(
            &bgr,
            &mut resized,
            Size::new(cell_w, cell_h),
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )?;
        let rect = Rect::new(
            (index % cols) as i32 * cell_w,
            (index / cols) as i32 * cell_h,
            cell_w,
            cell_h,
        );
        let mut cell = Mat::roi_mut(&mut canvas, rect)?;
        resized.copy_to(&mut cell)?;
    }
    debug!(rows, cols, images = images.len(), "composed image grid");
    Ok(canvas)
}

/// Anchor for [`apply_watermark`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl FromStr for WatermarkPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top_left" => Ok(WatermarkPosition::TopLeft),
            "top_right" => Ok(WatermarkPosition::TopRight),
            "bottom_left" => Ok(WatermarkPosition::BottomLeft),
            "bottom_right" => Ok(WatermarkPosition::BottomRight),
            "center" => Ok(WatermarkPosition::Center),
            other => Err(Error::Unsupported {
                what: "watermark position",
                value: other.to_string(),
            }),
        }
    }
}

/// Styling for [`apply_watermark`].
#[derive(Clone, Debug)]
pub struct WatermarkSpec {
    pub position: WatermarkPosition,
    /// Blend factor in `[0, 1]`; 1 is fully opaque.
    pub opacity: f64,
    pub font_scale: f64,
    pub color: Color,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        WatermarkSpec {
            position: WatermarkPosition::BottomRight,
            opacity: 0.7,
            font_scale: 0.8,
            color: Color::WHITE,
        }
    }
}

/// Blends a text watermark over a copy of the image.
pub fn apply_watermark(image: &Mat, text: &str, spec: &WatermarkSpec) -> Result<Mat> {
    let opacity = unit_range("opacity", spec.opacity)?;
    let thickness = 2;
    let mut baseline = 0;
    let extent = imgproc::get_text_size(
        text,
        imgproc::FONT_HERSHEY_SIMPLEX,
        spec.font_scale,
        thickness,
        &mut baseline,
    )?;
    let margin = 10;
    let (width, height) = (image.cols(), image.rows());
    let origin = match spec.position {
        WatermarkPosition::TopLeft => (margin, margin + extent.height),
        WatermarkPosition::TopRight => (width - extent.width - margin, margin + extent.height),
        WatermarkPosition::BottomLeft => (margin, height - margin),
        WatermarkPosition::BottomRight => (width - extent.width - margin, height - margin),
        WatermarkPosition::Center => ((width - extent.width) / 2, (height + extent.height) / 2),
    };

    let mut overlay = image.try_clone()?;
    draw_text(
        &mut overlay,
        text,
        origin,
        &TextSpec {
            font_scale: spec.font_scale,
            color: spec.color,
            thickness,
            background: None,
        },
    )?;
    let mut blended = Mat::default();
    core::add_weighted_def(&overlay, opacity, image, 1.0 - opacity, 0.0, &mut blended)?;
    Ok(blended)
}

/// Pencil-sketch look via the classic gray/invert/blur/divide pipeline.
pub fn convert_to_sketch(image: &Mat) -> Result<Mat> {
    let gray = to_gray(image)?;
    let mut inverted = Mat::default();
    core::bitwise_not_def(&gray, &mut inverted)?;
    let blurred = gaussian_blur(&inverted, 21, 0.0)?;
    let mut blurred_inverted = Mat::default();
    core::bitwise_not_def(&blurred, &mut blurred_inverted)?;
    let mut sketch = Mat::default();
    core::divide2(&gray, &blurred_inverted, &mut sketch, 256.0, -1)?;
    Ok(sketch)
}

/// Puts two images side by side with labels, normalizing height and
/// channel count first.
pub fn image_comparison(
    left: &Mat,
    right: &Mat,
    label_left: &str,
    label_right: &str,
) -> Result<Mat> {
    let mut left_bgr = to_bgr(left)?;
    let right_bgr = to_bgr(right)?;

    let target_height = left_bgr.rows();
    let scaled_width = (f64::from(right_bgr.cols()) * f64::from(target_height)
        / f64::from(right_bgr.rows()))
    .round() as i32;
    let mut right_scaled = Mat::default();
    imgproc::resize(
        &right_bgr,
        &mut right_scaled,
        Size::new(scaled_width.max(1), target_height),
        0.0,
        0.0,
        imgproc::INTER_AREA,
    )?;

    let label_spec = TextSpec {
        background: Some(Color::BLACK),
        ..Default::default()
    };
    draw_text(&mut left_bgr, label_left, (10, 30), &label_spec)?;
    draw_text(&mut right_scaled, label_right, (10, 30), &label_spec)?;

    let mut panel = Mat::default();
    core::hconcat2(&left_bgr, &right_scaled, &mut panel)?;
    Ok(panel)
}

/// Samples a pixel's BGR color.
pub fn color_at(image: &Mat, x: i32, y: i32) -> Result<Color> {
    if x < 0 || y < 0 || x >= image.cols() || y >= image.rows() {
        return Err(Error::invalid(format!(
            "pixel ({x}, {y}) is outside the {}x{} image",
            image.cols(),
            image.rows()
        )));
    }
    match image.channels() {
        1 => {
            let v = *image.at_2d::<u8>(y, x)?;
            Ok(Color::new(v, v, v))
        }
        3 => {
            let px = image.at_2d::<Vec3b>(y, x)?;
            Ok(Color::new(px[0], px[1], px[2]))
        }
        n => Err(Error::invalid(format!(
            "cannot sample a {n}-channel image"
        ))),
    }
}

/// Exponentially smoothed frames-per-second estimate for preview loops.
#[derive(Debug)]
pub struct FpsCounter {
    last_tick: Instant,
    smoothed: f64,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        FpsCounter {
            last_tick: Instant::now(),
            smoothed: 0.0,
        }
    }

    /// Call once per frame; returns the current estimate.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        if elapsed > 0.0 {
            let instant_fps = 1.0 / elapsed;
            self.smoothed = if self.smoothed == 0.0 {
                instant_fps
            } else {
                self.smoothed * 0.9 + instant_fps * 0.1
            };
        }
        self.smoothed
    }

    pub fn fps(&self) -> f64 {
        self.smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::{FpsCounter, WatermarkPosition};
    use std::time::Duration;

    #[test]
    fn watermark_position_parses() {
        assert_eq!(
            "bottom_right".parse::<WatermarkPosition>().unwrap(),
            WatermarkPosition::BottomRight
        );
        assert!("middle".parse::<WatermarkPosition>().is_err());
    }

    #[test]
    fn fps_counter_converges_upward() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.fps(), 0.0);
        std::thread::sleep(Duration::from_millis(5));
        assert!(counter.tick() > 0.0);
    }
}
