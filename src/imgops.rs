//! Core image operations: loading, saving, resizing, cropping, color
//! conversion and simple inspection.
//!
//! All pixel work is delegated to OpenCV; this module only fills defaults,
//! validates arguments and maps friendly names onto OpenCV constants.

use std::path::Path;
use std::str::FromStr;

use opencv::core::{self, Mat, Size};
use opencv::prelude::*;
use opencv::{highgui, imgcodecs, imgproc};
use tracing::debug;

use crate::color::Color;
use crate::util::validate::resolve_size;
use crate::util::{Error, Result};

/// How a file should be decoded by [`load_image`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ImageMode {
    /// 3-channel BGR, the OpenCV default.
    #[default]
    Color,
    /// Single-channel grayscale.
    Grayscale,
    /// Whatever the file contains, alpha included.
    Unchanged,
}

impl ImageMode {
    fn imread_flag(self) -> i32 {
        match self {
            ImageMode::Color => imgcodecs::IMREAD_COLOR,
            ImageMode::Grayscale => imgcodecs::IMREAD_GRAYSCALE,
            ImageMode::Unchanged => imgcodecs::IMREAD_UNCHANGED,
        }
    }
}

impl FromStr for ImageMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "color" => Ok(ImageMode::Color),
            "gray" | "grayscale" => Ok(ImageMode::Grayscale),
            "unchanged" => Ok(ImageMode::Unchanged),
            other => Err(Error::Unsupported {
                what: "image mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Friendly names for the channel layouts this crate converts between.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Bgr,
    Rgb,
    Gray,
    Hsv,
    Lab,
    Yuv,
}

impl FromStr for ColorSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bgr" => Ok(ColorSpace::Bgr),
            "rgb" => Ok(ColorSpace::Rgb),
            "gray" | "grayscale" => Ok(ColorSpace::Gray),
            "hsv" => Ok(ColorSpace::Hsv),
            "lab" => Ok(ColorSpace::Lab),
            "yuv" => Ok(ColorSpace::Yuv),
            other => Err(Error::Unsupported {
                what: "color space",
                value: other.to_string(),
            }),
        }
    }
}

/// Maps a conversion pair onto the OpenCV conversion code, if one exists.
fn conversion_code(from: ColorSpace, to: ColorSpace) -> Option<i32> {
    use ColorSpace::*;
    let code = match (from, to) {
        (Bgr, Rgb) => imgproc::COLOR_BGR2RGB,
        (Rgb, Bgr) => imgproc::COLOR_RGB2BGR,
        (Bgr, Gray) => imgproc::COLOR_BGR2GRAY,
        (Rgb, Gray) => imgproc::COLOR_RGB2GRAY,
        (Gray, Bgr) => imgproc::COLOR_GRAY2BGR,
        (Gray, Rgb) => imgproc::COLOR_GRAY2RGB,
        (Bgr, Hsv) => imgproc::COLOR_BGR2HSV,
        (Rgb, Hsv) => imgproc::COLOR_RGB2HSV,
        (Hsv, Bgr) => imgproc::COLOR_HSV2BGR,
        (Hsv, Rgb) => imgproc::COLOR_HSV2RGB,
        (Bgr, Lab) => imgproc::COLOR_BGR2Lab,
        (Rgb, Lab) => imgproc::COLOR_RGB2Lab,
        (Lab, Bgr) => imgproc::COLOR_Lab2BGR,
        (Lab, Rgb) => imgproc::COLOR_Lab2RGB,
        (Bgr, Yuv) => imgproc::COLOR_BGR2YUV,
        (Rgb, Yuv) => imgproc::COLOR_RGB2YUV,
        (Yuv, Bgr) => imgproc::COLOR_YUV2BGR,
        (Yuv, Rgb) => imgproc::COLOR_YUV2RGB,
        _ => return None,
    };
    Some(code)
}

/// Interpolation strategy for [`resize_image`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    #[default]
    Linear,
    Cubic,
    /// Pixel-area relation, preferred when shrinking.
    Area,
    Lanczos,
}

impl Interpolation {
    pub(crate) fn flag(self) -> i32 {
        match self {
            Interpolation::Nearest => imgproc::INTER_NEAREST,
            Interpolation::Linear => imgproc::INTER_LINEAR,
            Interpolation::Cubic => imgproc::INTER_CUBIC,
            Interpolation::Area => imgproc::INTER_AREA,
            Interpolation::Lanczos => imgproc::INTER_LANCZOS4,
        }
    }
}

impl FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nearest" => Ok(Interpolation::Nearest),
            "linear" => Ok(Interpolation::Linear),
            "cubic" => Ok(Interpolation::Cubic),
            "area" => Ok(Interpolation::Area),
            "lanczos" => Ok(Interpolation::Lanczos),
            other => Err(Error::Unsupported {
                what: "interpolation",
                value: other.to_string(),
            }),
        }
    }
}

/// Target extent for [`resize_image`]. Any single dimension preserves the
/// source aspect ratio; `scale` overrides both.
#[derive(Clone, Debug, Default)]
pub struct ResizeSpec {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub scale: Option<f64>,
    pub interpolation: Interpolation,
}

impl ResizeSpec {
    /// Resize to an exact width, keeping the aspect ratio.
    pub fn width(width: i32) -> Self {
        ResizeSpec {
            width: Some(width),
            ..Default::default()
        }
    }

    /// Resize to an exact height, keeping the aspect ratio.
    pub fn height(height: i32) -> Self {
        ResizeSpec {
            height: Some(height),
            ..Default::default()
        }
    }

    /// Resize by a uniform factor.
    pub fn scale(scale: f64) -> Self {
        ResizeSpec {
            scale: Some(scale),
            ..Default::default()
        }
    }

    /// Resize to an exact extent.
    pub fn exact(width: i32, height: i32) -> Self {
        ResizeSpec {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }
}

/// Encoder knobs for [`save_image_with`].
#[derive(Clone, Debug, Default)]
pub struct SaveOptions {
    /// JPEG quality in `[0, 100]`.
    pub jpeg_quality: Option<i32>,
    /// PNG compression level in `[0, 9]`.
    pub png_compression: Option<i32>,
}

/// Basic facts about an image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: i32,
    pub height: i32,
    /// 1 for grayscale, 3 for BGR, 4 with alpha.
    pub channels: i32,
    /// Bits per channel.
    pub bit_depth: i32,
    pub size_bytes: usize,
}

/// Loads an image from disk.
pub fn load_image(path: impl AsRef<Path>, mode: ImageMode) -> Result<Mat> {
    let path = path.as_ref();
    let image = imgcodecs::imread(&path.to_string_lossy(), mode.imread_flag())?;
    if image.empty() {
        return Err(Error::ImageRead {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), cols = image.cols(), rows = image.rows(), "loaded image");
    Ok(image)
}

/// Saves an image using the codec implied by the file extension.
pub fn save_image(image: &Mat, path: impl AsRef<Path>) -> Result<()> {
    save_image_with(image, path, &SaveOptions::default())
}

/// Saves an image with explicit encoder options.
pub fn save_image_with(image: &Mat, path: impl AsRef<Path>, options: &SaveOptions) -> Result<()> {
    let path = path.as_ref();
    let mut params = core::Vector::<i32>::new();
    if let Some(q) = options.jpeg_quality {
        if !(0..=100).contains(&q) {
            return Err(Error::invalid(format!(
                "jpeg_quality must be within [0, 100], got {q}"
            )));
        }
        params.push(imgcodecs::IMWRITE_JPEG_QUALITY);
        params.push(q);
    }
    if let Some(level) = options.png_compression {
        if !(0..=9).contains(&level) {
            return Err(Error::invalid(format!(
                "png_compression must be within [0, 9], got {level}"
            )));
        }
        params.push(imgcodecs::IMWRITE_PNG_COMPRESSION);
        params.push(level);
    }
    let written = imgcodecs::imwrite(&path.to_string_lossy(), image, &params)?;
    if !written {
        return Err(Error::invalid(format!(
            "could not encode image for '{}' (unknown extension?)",
            path.display()
        )));
    }
    debug!(path = %path.display(), "saved image");
    Ok(())
}

/// Resizes an image according to `spec`.
///
/// Supplying only `width` or only `height` keeps the aspect ratio, so a
/// 100x100 input resized with `width = 50` comes out 50x50.
pub fn resize_image(image: &Mat, spec: &ResizeSpec) -> Result<Mat> {
    let (width, height) = resolve_size(
        image.cols(),
        image.rows(),
        spec.width,
        spec.height,
        spec.scale,
    )?;
    let mut resized = Mat::default();
    imgproc::resize(
        image,
        &mut resized,
        Size::new(width, height),
        0.0,
        0.0,
        spec.interpolation.flag(),
    )?;
    Ok(resized)
}

/// Crops a rectangle out of an image.
///
/// The rectangle must lie fully inside the image; out-of-bounds requests
/// fail instead of being clamped.
pub fn crop_image(image: &Mat, x: i32, y: i32, width: i32, height: i32) -> Result<Mat> {
    if width <= 0 || height <= 0 {
        return Err(Error::invalid(format!(
            "crop extent must be positive, got {width}x{height}"
        )));
    }
    if x < 0 || y < 0 {
        return Err(Error::invalid(format!(
            "crop origin must be non-negative, got ({x}, {y})"
        )));
    }
    let (cols, rows) = (image.cols(), image.rows());
    // Sum as i64 so extreme origins cannot overflow the bounds check.
    if i64::from(x) + i64::from(width) > i64::from(cols)
        || i64::from(y) + i64::from(height) > i64::from(rows)
    {
        return Err(Error::invalid(format!(
            "crop region ({x}, {y}) {width}x{height} exceeds image bounds {cols}x{rows}"
        )));
    }
    let roi = Mat::roi(image, core::Rect::new(x, y, width, height))?;
    Ok(roi.try_clone()?)
}

/// Converts an image between channel layouts by friendly name.
pub fn convert_color_space(image: &Mat, from: ColorSpace, to: ColorSpace) -> Result<Mat> {
    if from == to {
        return Ok(image.try_clone()?);
    }
    let code = conversion_code(from, to).ok_or_else(|| {
        Error::invalid(format!("no direct conversion from {from:?} to {to:?}"))
    })?;
    let mut converted = Mat::default();
    imgproc::cvt_color_def(image, &mut converted, code)?;
    Ok(converted)
}

/// Reports the dimensions, channel count and depth of an image.
pub fn get_image_info(image: &Mat) -> Result<ImageInfo> {
    let bit_depth = match image.depth() {
        core::CV_8U | core::CV_8S => 8,
        core::CV_16U | core::CV_16S | core::CV_16F => 16,
        core::CV_32S | core::CV_32F => 32,
        core::CV_64F => 64,
        _ => 0,
    };
    Ok(ImageInfo {
        width: image.cols(),
        height: image.rows(),
        channels: image.channels(),
        bit_depth,
        size_bytes: image.total() * image.elem_size()?,
    })
}

/// Creates a solid-color BGR image.
pub fn create_blank_image(width: i32, height: i32, color: Color) -> Result<Mat> {
    if width <= 0 || height <= 0 {
        return Err(Error::invalid(format!(
            "image extent must be positive, got {width}x{height}"
        )));
    }
    Ok(Mat::new_rows_cols_with_default(
        height,
        width,
        core::CV_8UC3,
        color.to_scalar(),
    )?)
}

/// Returns a single-channel copy, converting from BGR when needed.
pub(crate) fn to_gray(image: &Mat) -> Result<Mat> {
    if image.channels() == 1 {
        return Ok(image.try_clone()?);
    }
    let mut gray = Mat::default();
    imgproc::cvt_color_def(image, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    Ok(gray)
}

/// Shows an image in a highgui window. With `wait` the call blocks until a
/// key is pressed; otherwise the window is given one event-loop tick.
pub fn show_image(image: &Mat, title: &str, wait: bool) -> Result<()> {
    highgui::imshow(title, image)?;
    highgui::wait_key(if wait { 0 } else { 1 })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{conversion_code, ColorSpace, ImageMode, Interpolation};
    use crate::util::Error;

    #[test]
    fn color_space_parses_friendly_names() {
        assert_eq!("bgr".parse::<ColorSpace>().unwrap(), ColorSpace::Bgr);
        assert_eq!("grayscale".parse::<ColorSpace>().unwrap(), ColorSpace::Gray);
        let err = "cmyk".parse::<ColorSpace>().unwrap_err();
        assert!(matches!(err, Error::Unsupported { what: "color space", .. }));
    }

    #[test]
    fn conversion_table_covers_round_trips() {
        for space in [ColorSpace::Rgb, ColorSpace::Gray, ColorSpace::Hsv, ColorSpace::Lab] {
            assert!(conversion_code(ColorSpace::Bgr, space).is_some());
            assert!(conversion_code(space, ColorSpace::Bgr).is_some());
        }
    }

    #[test]
    fn conversion_table_rejects_indirect_pairs() {
        assert!(conversion_code(ColorSpace::Gray, ColorSpace::Hsv).is_none());
        assert!(conversion_code(ColorSpace::Hsv, ColorSpace::Lab).is_none());
    }

    #[test]
    fn interpolation_and_mode_parse() {
        assert_eq!("area".parse::<Interpolation>().unwrap(), Interpolation::Area);
        assert!("bilinear".parse::<Interpolation>().is_err());
        assert_eq!("gray".parse::<ImageMode>().unwrap(), ImageMode::Grayscale);
    }
}
