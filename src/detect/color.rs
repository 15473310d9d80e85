//! Color-based detection via HSV in-range masks.

use std::str::FromStr;

use opencv::core::{self, Mat, Point, Rect, Scalar, Vector};
use opencv::imgproc;
use opencv::prelude::*;
use tracing::debug;

use super::{process_source, Source};
use crate::color::Color;
use crate::draw::draw_rectangle;
use crate::util::{Error, Result};

/// Colors with predefined hue centers (OpenCV hue range is `[0, 179]`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl TargetColor {
    /// Center of the hue band for this color.
    fn hue_center(self) -> i32 {
        match self {
            TargetColor::Red => 0,
            TargetColor::Orange => 15,
            TargetColor::Yellow => 30,
            TargetColor::Green => 60,
            TargetColor::Blue => 120,
            TargetColor::Purple => 150,
        }
    }
}

impl FromStr for TargetColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "red" => Ok(TargetColor::Red),
            "orange" => Ok(TargetColor::Orange),
            "yellow" => Ok(TargetColor::Yellow),
            "green" => Ok(TargetColor::Green),
            "blue" => Ok(TargetColor::Blue),
            "purple" => Ok(TargetColor::Purple),
            other => Err(Error::Unsupported {
                what: "target color",
                value: other.to_string(),
            }),
        }
    }
}

/// Finds regions of a named color by thresholding in HSV space.
#[derive(Clone, Debug)]
pub struct ColorDetector {
    pub target: TargetColor,
    /// Half-width of the accepted hue band, in hue units.
    pub tolerance: i32,
    /// Minimum region area in square pixels.
    pub min_area: f64,
}

impl ColorDetector {
    /// Detector for `target` with the default tolerance (20) and minimum
    /// area (300 px2).
    pub fn new(target: TargetColor) -> Self {
        ColorDetector {
            target,
            tolerance: 20,
            min_area: 300.0,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=89).contains(&self.tolerance) {
            return Err(Error::invalid(format!(
                "tolerance must be within [1, 89], got {}",
                self.tolerance
            )));
        }
        if self.min_area < 0.0 {
            return Err(Error::invalid(format!(
                "min_area must be non-negative, got {}",
                self.min_area
            )));
        }
        Ok(())
    }

    /// Builds the binary mask of pixels matching the target color.
    pub fn mask(&self, image: &Mat) -> Result<Mat> {
        self.validate()?;
        let mut hsv = Mat::default();
        imgproc::cvt_color_def(image, &mut hsv, imgproc::COLOR_BGR2HSV)?;

        let band = |low: i32, high: i32| -> Result<Mat> {
            let lower = Scalar::new(f64::from(low), 50.0, 50.0, 0.0);
            let upper = Scalar::new(f64::from(high), 255.0, 255.0, 0.0);
            let mut mask = Mat::default();
            core::in_range(&hsv, &lower, &upper, &mut mask)?;
            Ok(mask)
        };

        let center = self.target.hue_center();
        let (low, high) = (center - self.tolerance, center + self.tolerance);
        if low < 0 {
            // Red wraps around the hue circle, so combine both ends.
            let head = band(0, high)?;
            let tail = band(180 + low, 179)?;
            let mut combined = Mat::default();
            core::bitwise_or_def(&head, &tail, &mut combined)?;
            Ok(combined)
        } else if high > 179 {
            let head = band(0, high - 180)?;
            let tail = band(low, 179)?;
            let mut combined = Mat::default();
            core::bitwise_or_def(&head, &tail, &mut combined)?;
            Ok(combined)
        } else {
            band(low, high)
        }
    }

    /// Returns bounding rectangles of sufficiently large matching regions.
    pub fn detect(&self, image: &Mat) -> Result<Vec<Rect>> {
        let mask = self.mask(image)?;
        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours_def(
            &mask,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
        )?;
        let mut regions = Vec::new();
        for contour in contours {
            if imgproc::contour_area_def(&contour)? >= self.min_area {
                regions.push(imgproc::bounding_rect(&contour)?);
            }
        }
        debug!(target = ?self.target, regions = regions.len(), "color regions");
        Ok(regions)
    }

    /// Source-driven variant with optional live preview; `q` stops streams.
    pub fn detect_from_source(
        &self,
        source: Option<Source>,
        show_live: bool,
    ) -> Result<Vec<Vec<Rect>>> {
        self.validate()?;
        let mut per_frame = Vec::new();
        let mut handle = |frame: &mut Mat| -> Result<()> {
            let regions = self.detect(frame)?;
            if show_live {
                for rect in &regions {
                    draw_rectangle(
                        frame,
                        (rect.x, rect.y),
                        (rect.x + rect.width, rect.y + rect.height),
                        Color::WHITE,
                        2,
                        false,
                    )?;
                }
            }
            per_frame.push(regions);
            Ok(())
        };
        process_source(source, show_live, "easycv color detection", &mut handle)?;
        Ok(per_frame)
    }
}

/// Convenience shim: one-shot color detection with default parameters.
pub fn detect_color(image: &Mat, target: TargetColor) -> Result<Vec<Rect>> {
    ColorDetector::new(target).detect(image)
}

#[cfg(test)]
mod tests {
    use super::{ColorDetector, TargetColor};

    #[test]
    fn target_color_parses() {
        assert_eq!("red".parse::<TargetColor>().unwrap(), TargetColor::Red);
        assert!("magenta".parse::<TargetColor>().is_err());
    }

    #[test]
    fn tolerance_is_bounded() {
        let mut detector = ColorDetector::new(TargetColor::Blue);
        detector.tolerance = 0;
        assert!(detector.validate().is_err());
        detector.tolerance = 90;
        assert!(detector.validate().is_err());
        detector.tolerance = 25;
        assert!(detector.validate().is_ok());
    }
}
