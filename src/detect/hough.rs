//! Circle and line detection via Hough transforms.

use opencv::core::{Mat, Point, Vec3f, Vec4i, Vector};
use opencv::imgproc;
use opencv::prelude::*;
use tracing::debug;

use super::{process_source, Source};
use crate::color::Color;
use crate::draw::{draw_circle, draw_line};
use crate::imgops::to_gray;
use crate::util::{Error, Result};

/// A circle found by [`CircleDetector`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DetectedCircle {
    pub center: Point,
    pub radius: i32,
}

/// Hough-gradient circle detector.
#[derive(Clone, Debug)]
pub struct CircleDetector {
    pub min_radius: i32,
    pub max_radius: i32,
    /// Accumulator threshold; lower values find more (and weaker) circles.
    pub sensitivity: f64,
}

impl Default for CircleDetector {
    fn default() -> Self {
        CircleDetector {
            min_radius: 10,
            max_radius: 100,
            sensitivity: 50.0,
        }
    }
}

impl CircleDetector {
    fn validate(&self) -> Result<()> {
        if self.min_radius < 0 || self.max_radius <= self.min_radius {
            return Err(Error::invalid(format!(
                "radius range must satisfy 0 <= min < max, got {}..{}",
                self.min_radius, self.max_radius
            )));
        }
        if self.sensitivity <= 0.0 {
            return Err(Error::invalid(format!(
                "sensitivity must be positive, got {}",
                self.sensitivity
            )));
        }
        Ok(())
    }

    /// Finds circles in one image.
    pub fn detect(&self, image: &Mat) -> Result<Vec<DetectedCircle>> {
        self.validate()?;
        let gray = to_gray(image)?;
        let mut smoothed = Mat::default();
        imgproc::median_blur(&gray, &mut smoothed, 5)?;

        let min_dist = f64::from(smoothed.rows()) / 8.0;
        let mut raw = Vector::<Vec3f>::new();
        imgproc::hough_circles(
            &smoothed,
            &mut raw,
            imgproc::HOUGH_GRADIENT,
            1.0,
            min_dist.max(1.0),
            100.0,
            self.sensitivity,
            self.min_radius,
            self.max_radius,
        )?;

        let circles: Vec<DetectedCircle> = raw
            .iter()
            .map(|c| DetectedCircle {
                center: Point::new(c[0].round() as i32, c[1].round() as i32),
                radius: c[2].round() as i32,
            })
            .collect();
        debug!(count = circles.len(), "hough circles");
        Ok(circles)
    }

    /// Source-driven variant with optional live preview; `q` stops streams.
    pub fn detect_from_source(
        &self,
        source: Option<Source>,
        show_live: bool,
    ) -> Result<Vec<Vec<DetectedCircle>>> {
        self.validate()?;
        let mut per_frame = Vec::new();
        let mut handle = |frame: &mut Mat| -> Result<()> {
            let circles = self.detect(frame)?;
            if show_live {
                for c in &circles {
                    let center = (c.center.x, c.center.y);
                    draw_circle(frame, center, c.radius, Color::YELLOW, 2, false)?;
                }
            }
            per_frame.push(circles);
            Ok(())
        };
        process_source(source, show_live, "easycv circle detection", &mut handle)?;
        Ok(per_frame)
    }
}

/// A line segment found by [`LineDetector`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DetectedLine {
    pub start: Point,
    pub end: Point,
}

/// Probabilistic Hough line-segment detector.
#[derive(Clone, Debug)]
pub struct LineDetector {
    /// Accumulator votes required to accept a line.
    pub threshold: i32,
    pub min_line_length: f64,
    pub max_line_gap: f64,
}

impl Default for LineDetector {
    fn default() -> Self {
        LineDetector {
            threshold: 100,
            min_line_length: 30.0,
            max_line_gap: 10.0,
        }
    }
}

impl LineDetector {
    fn validate(&self) -> Result<()> {
        if self.threshold <= 0 {
            return Err(Error::invalid(format!(
                "threshold must be positive, got {}",
                self.threshold
            )));
        }
        if self.min_line_length < 0.0 || self.max_line_gap < 0.0 {
            return Err(Error::invalid(
                "min_line_length and max_line_gap must be non-negative",
            ));
        }
        Ok(())
    }

    /// Finds line segments on a Canny edge map of the image.
    pub fn detect(&self, image: &Mat) -> Result<Vec<DetectedLine>> {
        self.validate()?;
        let gray = to_gray(image)?;
        let mut edges = Mat::default();
        imgproc::canny_def(&gray, &mut edges, 50.0, 150.0)?;

        let mut raw = Vector::<Vec4i>::new();
        imgproc::hough_lines_p(
            &edges,
            &mut raw,
            1.0,
            std::f64::consts::PI / 180.0,
            self.threshold,
            self.min_line_length,
            self.max_line_gap,
        )?;

        let lines: Vec<DetectedLine> = raw
            .iter()
            .map(|l| DetectedLine {
                start: Point::new(l[0], l[1]),
                end: Point::new(l[2], l[3]),
            })
            .collect();
        debug!(count = lines.len(), "hough line segments");
        Ok(lines)
    }

    /// Source-driven variant with optional live preview; `q` stops streams.
    pub fn detect_from_source(
        &self,
        source: Option<Source>,
        show_live: bool,
    ) -> Result<Vec<Vec<DetectedLine>>> {
        self.validate()?;
        let mut per_frame = Vec::new();
        let mut handle = |frame: &mut Mat| -> Result<()> {
            let lines = self.detect(frame)?;
            if show_live {
                for l in &lines {
                    draw_line(frame, (l.start.x, l.start.y), (l.end.x, l.end.y), Color::GREEN, 2)?;
                }
            }
            per_frame.push(lines);
            Ok(())
        };
        process_source(source, show_live, "easycv line detection", &mut handle)?;
        Ok(per_frame)
    }
}

/// Convenience shim: circle detection with default parameters.
pub fn detect_circles(image: &Mat) -> Result<Vec<DetectedCircle>> {
    CircleDetector::default().detect(image)
}

/// Convenience shim: line detection with default parameters.
pub fn detect_lines(image: &Mat) -> Result<Vec<DetectedLine>> {
    LineDetector::default().detect(image)
}
