//! Smoothing, edge and stylization filters.
//!
//! Kernel sizes are validated up front; even values are rounded up to the
//! next odd number since OpenCV smoothing kernels require odd extents.

use std::str::FromStr;

use opencv::core::{self, Mat, Point, Size};
use opencv::imgproc;
use opencv::prelude::*;
use tracing::debug;

use crate::imgops::to_gray;
use crate::util::validate::{odd_kernel, unit_range};
use crate::util::{Error, Result};

/// Applies a Gaussian blur. `sigma = 0.0` lets OpenCV derive the standard
/// deviation from the kernel size.
pub fn gaussian_blur(image: &Mat, kernel_size: i32, sigma: f64) -> Result<Mat> {
    let k = odd_kernel("kernel_size", kernel_size)?;
    if sigma < 0.0 {
        return Err(Error::invalid(format!("sigma must be non-negative, got {sigma}")));
    }
    let mut blurred = Mat::default();
    imgproc::gaussian_blur_def(image, &mut blurred, Size::new(k, k), sigma)?;
    Ok(blurred)
}

/// Applies a median blur, useful against salt-and-pepper noise.
pub fn median_blur(image: &Mat, kernel_size: i32) -> Result<Mat> {
    let k = odd_kernel("kernel_size", kernel_size)?;
    let mut blurred = Mat::default();
    imgproc::median_blur(image, &mut blurred, k)?;
    Ok(blurred)
}

/// Applies an edge-preserving bilateral filter.
pub fn bilateral_filter(
    image: &Mat,
    diameter: i32,
    sigma_color: f64,
    sigma_space: f64,
) -> Result<Mat> {
    if diameter <= 0 {
        return Err(Error::invalid(format!(
            "diameter must be positive, got {diameter}"
        )));
    }
    let mut filtered = Mat::default();
    imgproc::bilateral_filter_def(image, &mut filtered, diameter, sigma_color, sigma_space)?;
    Ok(filtered)
}

/// Edge extraction algorithms supported by [`edge_detection`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EdgeMethod {
    #[default]
    Canny,
    Sobel,
    Laplacian,
}

impl FromStr for EdgeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "canny" => Ok(EdgeMethod::Canny),
            "sobel" => Ok(EdgeMethod::Sobel),
            "laplacian" => Ok(EdgeMethod::Laplacian),
            other => Err(Error::Unsupported {
                what: "edge method",
                value: other.to_string(),
            }),
        }
    }
}

/// Parameters for [`edge_detection`]. Thresholds only apply to Canny.
#[derive(Clone, Debug)]
pub struct EdgeSpec {
    pub method: EdgeMethod,
    pub low_threshold: f64,
    pub high_threshold: f64,
    /// Derivative kernel size; OpenCV accepts 3, 5 or 7.
    pub aperture: i32,
}

impl Default for EdgeSpec {
    fn default() -> Self {
        EdgeSpec {
            method: EdgeMethod::Canny,
            low_threshold: 50.0,
            high_threshold: 150.0,
            aperture: 3,
        }
    }
}

/// Extracts edges as a single-channel 8-bit image.
pub fn edge_detection(image: &Mat, spec: &EdgeSpec) -> Result<Mat> {
    if spec.low_threshold < 0.0 || spec.high_threshold < spec.low_threshold {
        return Err(Error::invalid(format!(
            "thresholds must satisfy 0 <= low <= high, got {} and {}",
            spec.low_threshold, spec.high_threshold
        )));
    }
    if !matches!(spec.aperture, 3 | 5 | 7) {
        return Err(Error::invalid(format!(
            "aperture must be 3, 5 or 7, got {}",
            spec.aperture
        )));
    }
    let gray = to_gray(image)?;
    debug!(method = ?spec.method, "running edge detection");
    match spec.method {
        EdgeMethod::Canny => {
            let mut edges = Mat::default();
            imgproc::canny(
                &gray,
                &mut edges,
                spec.low_threshold,
                spec.high_threshold,
                spec.aperture,
                false,
            )?;
            Ok(edges)
        }
        EdgeMethod::Sobel => {
            let mut gx = Mat::default();
            let mut gy = Mat::default();
            sobel_pass(&gray, &mut gx, 1, 0, spec.aperture)?;
            sobel_pass(&gray, &mut gy, 0, 1, spec.aperture)?;
            let mut ax = Mat::default();
            let mut ay = Mat::default();
            core::convert_scale_abs_def(&gx, &mut ax)?;
            core::convert_scale_abs_def(&gy, &mut ay)?;
            let mut edges = Mat::default();
            core::add_weighted_def(&ax, 0.5, &ay, 0.5, 0.0, &mut edges)?;
            Ok(edges)
        }
        EdgeMethod::Laplacian => {
            let mut lap = Mat::default();
            imgproc::laplacian(
                &gray,
                &mut lap,
                core::CV_16S,
                spec.aperture,
                1.0,
                0.0,
                core::BORDER_DEFAULT,
            )?;
            let mut edges = Mat::default();
            core::convert_scale_abs_def(&lap, &mut edges)?;
            Ok(edges)
        }
    }
}

fn sobel_pass(gray: &Mat, out: &mut Mat, dx: i32, dy: i32, aperture: i32) -> Result<()> {
    imgproc::sobel(
        gray,
        out,
        core::CV_16S,
        dx,
        dy,
        aperture,
        1.0,
        0.0,
        core::BORDER_DEFAULT,
    )?;
    Ok(())
}

/// Thresholding strategies for [`threshold`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ThresholdKind {
    #[default]
    Binary,
    BinaryInverted,
    Truncate,
    ToZero,
    /// Ignores `value` and picks the threshold via Otsu's method.
    Otsu,
    /// Per-pixel threshold from the local mean.
    AdaptiveMean,
    /// Per-pixel threshold from a Gaussian-weighted local mean.
    AdaptiveGaussian,
}

/// Parameters for [`threshold`].
#[derive(Clone, Debug)]
pub struct ThresholdSpec {
    pub kind: ThresholdKind,
    pub max_value: f64,
    /// Neighborhood size for the adaptive variants; must be odd and > 1.
    pub block_size: i32,
    /// Constant subtracted from the local mean in adaptive variants.
    pub c: f64,
}

impl Default for ThresholdSpec {
    fn default() -> Self {
        ThresholdSpec {
            kind: ThresholdKind::Binary,
            max_value: 255.0,
            block_size: 11,
            c: 2.0,
        }
    }
}

/// Thresholds an image, converting to grayscale first when needed.
pub fn threshold(image: &Mat, value: f64, spec: &ThresholdSpec) -> Result<Mat> {
    if !(0.0..=255.0).contains(&value) {
        return Err(Error::invalid(format!(
            "threshold value must be within [0, 255], got {value}"
        )));
    }
    let gray = to_gray(image)?;
    let mut binary = Mat::default();
    match spec.kind {
        ThresholdKind::Binary => {
            imgproc::threshold(&gray, &mut binary, value, spec.max_value, imgproc::THRESH_BINARY)?;
        }
        ThresholdKind::BinaryInverted => {
            imgproc::threshold(
                &gray,
                &mut binary,
                value,
                spec.max_value,
                imgproc::THRESH_BINARY_INV,
            )?;
        }
        ThresholdKind::Truncate => {
            imgproc::threshold(&gray, &mut binary, value, spec.max_value, imgproc::THRESH_TRUNC)?;
        }
        ThresholdKind::ToZero => {
            imgproc::threshold(&gray, &mut binary, value, spec.max_value, imgproc::THRESH_TOZERO)?;
        }
        ThresholdKind::Otsu => {
            imgproc::threshold(
                &gray,
                &mut binary,
                0.0,
                spec.max_value,
                imgproc::THRESH_BINARY + imgproc::THRESH_OTSU,
            )?;
        }
        ThresholdKind::AdaptiveMean | ThresholdKind::AdaptiveGaussian => {
            if spec.block_size < 3 || spec.block_size % 2 == 0 {
                return Err(Error::invalid(format!(
                    "block_size must be odd and at least 3, got {}",
                    spec.block_size
                )));
            }
            let method = if spec.kind == ThresholdKind::AdaptiveMean {
                imgproc::ADAPTIVE_THRESH_MEAN_C
            } else {
                imgproc::ADAPTIVE_THRESH_GAUSSIAN_C
            };
            imgproc::adaptive_threshold(
                &gray,
                &mut binary,
                spec.max_value,
                method,
                imgproc::THRESH_BINARY,
                spec.block_size,
                spec.c,
            )?;
        }
    }
    Ok(binary)
}

/// Applies an emboss effect via a directional convolution kernel.
pub fn emboss(image: &Mat) -> Result<Mat> {
    let kernel = Mat::from_slice_2d(&[
        [-2.0f32, -1.0, 0.0],
        [-1.0, 1.0, 1.0],
        [0.0, 1.0, 2.0],
    ])?;
    let mut embossed = Mat::default();
    imgproc::filter_2d(
        image,
        &mut embossed,
        -1,
        &kernel,
        Point::new(-1, -1),
        128.0,
        core::BORDER_DEFAULT,
    )?;
    Ok(embossed)
}

/// Sharpens by subtracting a Gaussian-blurred copy (unsharp masking).
pub fn unsharp_mask(image: &Mat, kernel_size: i32, sigma: f64, amount: f64) -> Result<Mat> {
    if amount < 0.0 {
        return Err(Error::invalid(format!(
            "amount must be non-negative, got {amount}"
        )));
    }
    let blurred = gaussian_blur(image, kernel_size, sigma)?;
    let mut sharpened = Mat::default();
    core::add_weighted_def(image, 1.0 + amount, &blurred, -amount, 0.0, &mut sharpened)?;
    Ok(sharpened)
}

/// Blends a sepia-toned copy over the original. `intensity` in `[0, 1]`
/// controls how strong the effect is.
pub fn vintage(image: &Mat, intensity: f64) -> Result<Mat> {
    let intensity = unit_range("intensity", intensity)?;
    // Sepia mix, rows ordered for BGR input and output.
    let kernel = Mat::from_slice_2d(&[
        [0.131f32, 0.534, 0.272],
        [0.168, 0.686, 0.349],
        [0.189, 0.769, 0.393],
    ])?;
    let mut sepia = Mat::default();
    core::transform(image, &mut sepia, &kernel)?;
    let mut blended = Mat::default();
    core::add_weighted_def(image, 1.0 - intensity, &sepia, intensity, 0.0, &mut blended)?;
    Ok(blended)
}

/// Cartoon effect: flattened colors from a bilateral filter masked by bold
/// adaptive-threshold edges.
pub fn cartoon(image: &Mat) -> Result<Mat> {
    let gray = to_gray(image)?;
    let mut smoothed_gray = Mat::default();
    imgproc::median_blur(&gray, &mut smoothed_gray, 5)?;
    let mut edges = Mat::default();
    imgproc::adaptive_threshold(
        &smoothed_gray,
        &mut edges,
        255.0,
        imgproc::ADAPTIVE_THRESH_MEAN_C,
        imgproc::THRESH_BINARY,
        9,
        9.0,
    )?;
    let mut flattened = Mat::default();
    imgproc::bilateral_filter_def(image, &mut flattened, 9, 250.0, 250.0)?;
    let mut edges_bgr = Mat::default();
    imgproc::cvt_color_def(&edges, &mut edges_bgr, imgproc::COLOR_GRAY2BGR)?;
    let mut toon = Mat::default();
    core::bitwise_and_def(&flattened, &edges_bgr, &mut toon)?;
    Ok(toon)
}

#[cfg(test)]
mod tests {
    use super::{EdgeMethod, EdgeSpec, ThresholdKind, ThresholdSpec};

    #[test]
    fn edge_method_parses() {
        assert_eq!("canny".parse::<EdgeMethod>().unwrap(), EdgeMethod::Canny);
        assert!("prewitt".parse::<EdgeMethod>().is_err());
    }

    #[test]
    fn edge_spec_defaults_are_canny() {
        let spec = EdgeSpec::default();
        assert_eq!(spec.method, EdgeMethod::Canny);
        assert!(spec.low_threshold < spec.high_threshold);
        assert_eq!(spec.aperture, 3);
    }

    #[test]
    fn threshold_spec_defaults() {
        let spec = ThresholdSpec::default();
        assert_eq!(spec.kind, ThresholdKind::Binary);
        assert_eq!(spec.block_size % 2, 1);
    }
}
