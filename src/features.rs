//! Contour, corner and keypoint detection wrappers.

use std::str::FromStr;

use opencv::core::{KeyPoint, Mat, Point, Point2f, Rect, Vector};
use opencv::prelude::*;
use opencv::{features2d, imgproc};
use tracing::debug;

use crate::imgops::to_gray;
use crate::util::{Error, Result};

/// A detected contour with its precomputed area.
#[derive(Clone, Debug)]
pub struct Contour {
    points: Vector<Point>,
    area: f64,
}

impl Contour {
    /// The polygon vertices as returned by OpenCV.
    pub fn points(&self) -> &Vector<Point> {
        &self.points
    }

    /// Enclosed area in square pixels.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Axis-aligned bounding rectangle.
    pub fn bounding_rect(&self) -> Result<Rect> {
        Ok(imgproc::bounding_rect(&self.points)?)
    }

    /// Centroid from image moments; `None` for degenerate contours.
    pub fn centroid(&self) -> Result<Option<(f64, f64)>> {
        let m = imgproc::moments_def(&self.points)?;
        if m.m00.abs() < f64::EPSILON {
            return Ok(None);
        }
        Ok(Some((m.m10 / m.m00, m.m01 / m.m00)))
    }
}

/// Parameters for [`detect_contours`].
#[derive(Clone, Debug)]
pub struct ContourSpec {
    /// Binarization threshold applied before the contour scan.
    pub threshold_value: f64,
    /// Contours smaller than this many square pixels are dropped.
    pub min_area: f64,
    /// Optional upper area bound.
    pub max_area: Option<f64>,
    /// Only trace outermost contours.
    pub external_only: bool,
}

impl Default for ContourSpec {
    fn default() -> Self {
        ContourSpec {
            threshold_value: 127.0,
            min_area: 0.0,
            max_area: None,
            external_only: true,
        }
    }
}

/// Finds contours in a thresholded copy of the image.
pub fn detect_contours(image: &Mat, spec: &ContourSpec) -> Result<Vec<Contour>> {
    if !(0.0..=255.0).contains(&spec.threshold_value) {
        return Err(Error::invalid(format!(
            "threshold_value must be within [0, 255], got {}",
            spec.threshold_value
        )));
    }
    if spec.min_area < 0.0 {
        return Err(Error::invalid(format!(
            "min_area must be non-negative, got {}",
            spec.min_area
        )));
    }
    let gray = to_gray(image)?;
    let mut binary = Mat::default();
    imgproc::threshold(
        &gray,
        &mut binary,
        spec.threshold_value,
        255.0,
        imgproc::THRESH_BINARY,
    )?;

    let mode = if spec.external_only {
        imgproc::RETR_EXTERNAL
    } else {
        imgproc::RETR_LIST
    };
    let mut raw = Vector::<Vector<Point>>::new();
    imgproc::find_contours_def(&binary, &mut raw, mode, imgproc::CHAIN_APPROX_SIMPLE)?;

    let mut contours = Vec::new();
    for points in raw {
        let area = imgproc::contour_area_def(&points)?;
        if area < spec.min_area {
            continue;
        }
        if let Some(max) = spec.max_area {
            if area > max {
                continue;
            }
        }
        contours.push(Contour { points, area });
    }
    debug!(count = contours.len(), "detected contours");
    Ok(contours)
}

/// Parameters for [`detect_corners`] (Shi-Tomasi good features to track).
#[derive(Clone, Debug)]
pub struct CornerSpec {
    pub max_corners: i32,
    /// Minimal accepted corner quality relative to the best corner, `(0, 1]`.
    pub quality_level: f64,
    /// Minimum euclidean distance between returned corners.
    pub min_distance: f64,
}

impl Default for CornerSpec {
    fn default() -> Self {
        CornerSpec {
            max_corners: 100,
            quality_level: 0.01,
            min_distance: 10.0,
        }
    }
}

/// Finds prominent corners.
pub fn detect_corners(image: &Mat, spec: &CornerSpec) -> Result<Vec<Point2f>> {
    if spec.max_corners <= 0 {
        return Err(Error::invalid(format!(
            "max_corners must be positive, got {}",
            spec.max_corners
        )));
    }
    if !(0.0..=1.0).contains(&spec.quality_level) || spec.quality_level == 0.0 {
        return Err(Error::invalid(format!(
            "quality_level must be within (0, 1], got {}",
            spec.quality_level
        )));
    }
    let gray = to_gray(image)?;
    let mut corners = Vector::<Point2f>::new();
    imgproc::good_features_to_track_def(
        &gray,
        &mut corners,
        spec.max_corners,
        spec.quality_level,
        spec.min_distance,
    )?;
    Ok(corners.to_vec())
}

/// Keypoint detectors exposed by [`detect_keypoints`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum KeypointMethod {
    #[default]
    Orb,
    Akaze,
    Sift,
}

impl FromStr for KeypointMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "orb" => Ok(KeypointMethod::Orb),
            "akaze" => Ok(KeypointMethod::Akaze),
            "sift" => Ok(KeypointMethod::Sift),
            other => Err(Error::Unsupported {
                what: "keypoint method",
                value: other.to_string(),
            }),
        }
    }
}

/// Detects scale/rotation-robust keypoints with the chosen detector.
pub fn detect_keypoints(image: &Mat, method: KeypointMethod) -> Result<Vec<KeyPoint>> {
    let gray = to_gray(image)?;
    let mut keypoints = Vector::<KeyPoint>::new();
    match method {
        KeypointMethod::Orb => {
            let mut detector = features2d::ORB::create_def()?;
            detector.detect_def(&gray, &mut keypoints)?;
        }
        KeypointMethod::Akaze => {
            let mut detector = features2d::AKAZE::create_def()?;
            detector.detect_def(&gray, &mut keypoints)?;
        }
        KeypointMethod::Sift => {
            let mut detector = features2d::SIFT::create_def()?;
            detector.detect_def(&gray, &mut keypoints)?;
        }
    }
    debug!(method = ?method, count = keypoints.len(), "detected keypoints");
    Ok(keypoints.to_vec())
}
