//! Motion detection via OpenCV background subtraction.

use std::str::FromStr;

use opencv::core::{Mat, Point, Rect, Vector};
use opencv::prelude::*;
use opencv::video::{
    self, BackgroundSubtractorKNN, BackgroundSubtractorMOG2,
};
use opencv::{core, imgproc};
use tracing::debug;

use super::{process_source, Source};
use crate::color::Color;
use crate::draw::draw_rectangle;
use crate::util::{Error, Result};

/// Background model used by [`MotionDetector`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MotionMethod {
    /// Gaussian-mixture model, the common default.
    #[default]
    Mog2,
    /// K-nearest-neighbors model, better for slow scenes.
    Knn,
}

impl FromStr for MotionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mog2" => Ok(MotionMethod::Mog2),
            "knn" => Ok(MotionMethod::Knn),
            other => Err(Error::Unsupported {
                what: "motion method",
                value: other.to_string(),
            }),
        }
    }
}

enum Subtractor {
    Mog2(core::Ptr<BackgroundSubtractorMOG2>),
    Knn(core::Ptr<BackgroundSubtractorKNN>),
}

/// Flags frame regions that differ from a learned background model.
pub struct MotionDetector {
    subtractor: Subtractor,
    pub method: MotionMethod,
    /// Background adaptation rate in `[0, 1]`, or `-1` for automatic.
    pub learning_rate: f64,
    /// Minimum changed area in square pixels to count as motion.
    pub sensitivity: f64,
}

impl MotionDetector {
    /// Creates a detector with the documented defaults (MOG2, automatic
    /// learning rate, 500 px2 minimum area).
    pub fn new() -> Result<Self> {
        Self::with_options(MotionMethod::default(), -1.0, 500.0)
    }

    /// Creates a detector with explicit parameters.
    pub fn with_options(
        method: MotionMethod,
        learning_rate: f64,
        sensitivity: f64,
    ) -> Result<Self> {
        if learning_rate != -1.0 && !(0.0..=1.0).contains(&learning_rate) {
            return Err(Error::invalid(format!(
                "learning_rate must be -1 or within [0, 1], got {learning_rate}"
            )));
        }
        if sensitivity <= 0.0 {
            return Err(Error::invalid(format!(
                "sensitivity must be positive, got {sensitivity}"
            )));
        }
        let subtractor = match method {
            MotionMethod::Mog2 => {
                Subtractor::Mog2(video::create_background_subtractor_mog2_def()?)
            }
            MotionMethod::Knn => Subtractor::Knn(video::create_background_subtractor_knn_def()?),
        };
        Ok(MotionDetector {
            subtractor,
            method,
            learning_rate,
            sensitivity,
        })
    }

    /// Feeds one frame into the background model and returns the bounding
    /// rectangles of regions that moved.
    pub fn detect(&mut self, frame: &Mat) -> Result<Vec<Rect>> {
        let mut mask = Mat::default();
        match &mut self.subtractor {
            Subtractor::Mog2(s) => opencv::prelude::BackgroundSubtractorMOG2Trait::apply(
                s,
                frame,
                &mut mask,
                self.learning_rate,
            )?,
            Subtractor::Knn(s) => s.apply(frame, &mut mask, self.learning_rate)?,
        }
        // Drop the shadow value (127 in both models), keep hard foreground.
        let mut binary = Mat::default();
        imgproc::threshold(&mask, &mut binary, 200.0, 255.0, imgproc::THRESH_BINARY)?;

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours_def(
            &binary,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
        )?;

        let mut regions = Vec::new();
        for contour in contours {
            if imgproc::contour_area_def(&contour)? >= self.sensitivity {
                regions.push(imgproc::bounding_rect(&contour)?);
            }
        }
        debug!(regions = regions.len(), "motion regions");
        Ok(regions)
    }

    /// Streams frames from `source` (webcam 0 when `None`) through the
    /// detector; see [`CascadeDetector::detect_from_source`] for the loop
    /// semantics.
    ///
    /// [`CascadeDetector::detect_from_source`]: super::CascadeDetector::detect_from_source
    pub fn detect_from_source(
        &mut self,
        source: Option<Source>,
        show_live: bool,
    ) -> Result<Vec<Vec<Rect>>> {
        let mut per_frame = Vec::new();
        let mut handle = |frame: &mut Mat| -> Result<()> {
            let regions = self.detect(frame)?;
            if show_live {
                for rect in &regions {
                    draw_rectangle(
                        frame,
                        (rect.x, rect.y),
                        (rect.x + rect.width, rect.y + rect.height),
                        Color::RED,
                        2,
                        false,
                    )?;
                }
            }
            per_frame.push(regions);
            Ok(())
        };
        process_source(source, show_live, "easycv motion detection", &mut handle)?;
        Ok(per_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{MotionDetector, MotionMethod};

    #[test]
    fn method_parses() {
        assert_eq!("knn".parse::<MotionMethod>().unwrap(), MotionMethod::Knn);
        assert!("gmg".parse::<MotionMethod>().is_err());
    }

    #[test]
    fn rejects_bad_learning_rate() {
        assert!(MotionDetector::with_options(MotionMethod::Mog2, 2.0, 500.0).is_err());
        assert!(MotionDetector::with_options(MotionMethod::Mog2, -0.5, 500.0).is_err());
    }

    #[test]
    fn rejects_non_positive_sensitivity() {
        assert!(MotionDetector::with_options(MotionMethod::Knn, -1.0, 0.0).is_err());
    }
}
