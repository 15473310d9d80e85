//! Haar cascade detection with bundled classifier lookup.

use std::path::{Path, PathBuf};

use opencv::core::{Mat, Rect, Size};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use opencv::{core, imgproc};
use tracing::{debug, info};

use super::{process_source, Source};
use crate::color::Color;
use crate::draw::draw_rectangle;
use crate::imgops::to_gray;
use crate::util::{Error, Result};

/// Directories checked for OpenCV's bundled haarcascade files after
/// `core::find_file` comes up empty.
const CASCADE_DIRS: &[&str] = &[
    "/usr/share/opencv4/haarcascades",
    "/usr/local/share/opencv4/haarcascades",
    "/usr/share/opencv/haarcascades",
];

fn locate_cascade(name: &str) -> Result<PathBuf> {
    if let Ok(found) = core::find_file(&format!("haarcascades/{name}"), false, true) {
        if !found.is_empty() {
            return Ok(PathBuf::from(found));
        }
    }
    for dir in CASCADE_DIRS {
        let candidate = Path::new(dir).join(name);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(Error::ModelNotFound {
        path: PathBuf::from(name),
    })
}

/// Scan parameters shared by all cascade detectors.
#[derive(Clone, Debug)]
pub struct CascadeParams {
    /// Image pyramid step between scan scales.
    pub scale_factor: f64,
    /// Neighbor votes required to keep a detection.
    pub min_neighbors: i32,
    /// Smallest accepted object in pixels.
    pub min_size: (i32, i32),
}

impl Default for CascadeParams {
    fn default() -> Self {
        CascadeParams {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: (30, 30),
        }
    }
}

impl CascadeParams {
    fn validate(&self) -> Result<()> {
        if self.scale_factor <= 1.0 {
            return Err(Error::invalid(format!(
                "scale_factor must be greater than 1.0, got {}",
                self.scale_factor
            )));
        }
        if self.min_neighbors < 0 {
            return Err(Error::invalid(format!(
                "min_neighbors must be non-negative, got {}",
                self.min_neighbors
            )));
        }
        Ok(())
    }
}

/// A pretrained Haar cascade classifier plus its scan parameters.
pub struct CascadeDetector {
    cascade: CascadeClassifier,
    window: &'static str,
    pub params: CascadeParams,
}

impl CascadeDetector {
    /// Loads a cascade from an explicit XML file.
    pub fn from_file(path: impl AsRef<Path>, params: CascadeParams) -> Result<Self> {
        params.validate()?;
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ModelNotFound {
                path: path.to_path_buf(),
            });
        }
        let cascade = CascadeClassifier::new(&path.to_string_lossy())?;
        if cascade.empty()? {
            return Err(Error::ModelNotFound {
                path: path.to_path_buf(),
            });
        }
        info!(path = %path.display(), "loaded cascade classifier");
        Ok(CascadeDetector {
            cascade,
            window: "easycv detection",
            params,
        })
    }

    /// Frontal face detector from OpenCV's bundled cascade.
    pub fn face(params: CascadeParams) -> Result<Self> {
        let path = locate_cascade("haarcascade_frontalface_default.xml")?;
        let mut detector = Self::from_file(path, params)?;
        detector.window = "easycv face detection";
        Ok(detector)
    }

    /// Eye detector from OpenCV's bundled cascade.
    pub fn eye(params: CascadeParams) -> Result<Self> {
        let path = locate_cascade("haarcascade_eye.xml")?;
        let mut detector = Self::from_file(path, params)?;
        detector.window = "easycv eye detection";
        Ok(detector)
    }

    /// Full-body detector from OpenCV's bundled cascade.
    pub fn full_body(params: CascadeParams) -> Result<Self> {
        let path = locate_cascade("haarcascade_fullbody.xml")?;
        let mut detector = Self::from_file(path, params)?;
        detector.window = "easycv body detection";
        Ok(detector)
    }

    /// Runs the cascade over one image and returns the matched rectangles.
    pub fn detect(&mut self, image: &Mat) -> Result<Vec<Rect>> {
        let gray = to_gray(image)?;
        let mut equalized = Mat::default();
        imgproc::equalize_hist(&gray, &mut equalized)?;
        let mut objects = core::Vector::<Rect>::new();
        let (min_w, min_h) = self.params.min_size;
        self.cascade.detect_multi_scale(
            &equalized,
            &mut objects,
            self.params.scale_factor,
            self.params.min_neighbors,
            0,
            Size::new(min_w, min_h),
            Size::default(),
        )?;
        debug!(count = objects.len(), "cascade detections");
        Ok(objects.to_vec())
    }

    /// Reads frames from `source` (webcam 0 when `None`), detecting on each.
    ///
    /// With `show_live` the detections are drawn and previewed; press `q`
    /// to stop a stream early. Returns the detections of every processed
    /// frame.
    pub fn detect_from_source(
        &mut self,
        source: Option<Source>,
        show_live: bool,
    ) -> Result<Vec<Vec<Rect>>> {
        let mut per_frame = Vec::new();
        let window = self.window;
        // The closure needs &mut self for detect, so hoist results outside.
        let mut detect_and_draw = |frame: &mut Mat| -> Result<()> {
            let rects = self.detect(frame)?;
            if show_live {
                for rect in &rects {
                    draw_rectangle(
                        frame,
                        (rect.x, rect.y),
                        (rect.x + rect.width, rect.y + rect.height),
                        Color::GREEN,
                        2,
                        false,
                    )?;
                }
            }
            per_frame.push(rects);
            Ok(())
        };
        process_source(source, show_live, window, &mut detect_and_draw)?;
        Ok(per_frame)
    }
}

/// Convenience shim: one-shot face detection with default parameters.
pub fn detect_faces(image: &Mat) -> Result<Vec<Rect>> {
    CascadeDetector::face(CascadeParams::default())?.detect(image)
}

/// Convenience shim: one-shot eye detection with default parameters.
pub fn detect_eyes(image: &Mat) -> Result<Vec<Rect>> {
    CascadeDetector::eye(CascadeParams::default())?.detect(image)
}

#[cfg(test)]
mod tests {
    use super::{CascadeDetector, CascadeParams};
    use crate::util::Error;

    #[test]
    fn params_default_match_documented_values() {
        let params = CascadeParams::default();
        assert_eq!(params.scale_factor, 1.1);
        assert_eq!(params.min_neighbors, 5);
        assert_eq!(params.min_size, (30, 30));
    }

    #[test]
    fn missing_cascade_file_is_reported() {
        let err = CascadeDetector::from_file("/no/such/cascade.xml", CascadeParams::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::ModelNotFound { .. }));
    }

    #[test]
    fn bad_scale_factor_is_validation_error() {
        let params = CascadeParams {
            scale_factor: 0.9,
            ..Default::default()
        };
        let err = CascadeDetector::from_file("/no/such/cascade.xml", params)
            .err()
            .unwrap();
        assert!(err.is_validation());
    }
}
