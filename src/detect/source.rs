//! Frame sources for the detector preview loops.
//!
//! A source is a webcam index or a path; paths are classified as still
//! images or videos by extension. When no source is given the default
//! webcam is used, matching the convenience behavior of the original API.

use std::path::{Path, PathBuf};

use opencv::core::Mat;
use opencv::imgcodecs;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use tracing::{debug, info};

use crate::util::{Error, Result};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Where detector frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A camera index as understood by OpenCV.
    Webcam(i32),
    /// A still image or video file.
    Path(PathBuf),
}

impl From<i32> for Source {
    fn from(index: i32) -> Self {
        Source::Webcam(index)
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

enum Inner {
    /// A single decoded image, yielded exactly once.
    Still { image: Mat, consumed: bool },
    Stream(VideoCapture),
}

/// An open frame source. The underlying capture handle is released on drop.
pub struct ImageSource {
    inner: Inner,
    live: bool,
}

impl ImageSource {
    /// Opens the given source, falling back to webcam 0 when none is given.
    pub fn open(source: Option<Source>) -> Result<Self> {
        match source.unwrap_or(Source::Webcam(0)) {
            Source::Webcam(index) => {
                info!(index, "opening webcam");
                let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
                if !capture.is_opened()? {
                    return Err(Error::SourceOpen(format!("could not open webcam {index}")));
                }
                Ok(ImageSource {
                    inner: Inner::Stream(capture),
                    live: true,
                })
            }
            Source::Path(path) => {
                if !path.exists() {
                    return Err(Error::SourceOpen(format!(
                        "no such file: '{}'",
                        path.display()
                    )));
                }
                if is_image_path(&path) {
                    let image =
                        imgcodecs::imread(&path.to_string_lossy(), imgcodecs::IMREAD_COLOR)?;
                    if image.empty() {
                        return Err(Error::ImageRead { path });
                    }
                    debug!(path = %path.display(), "opened still image source");
                    Ok(ImageSource {
                        inner: Inner::Still {
                            image,
                            consumed: false,
                        },
                        live: false,
                    })
                } else {
                    let capture =
                        VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
                    if !capture.is_opened()? {
                        return Err(Error::SourceOpen(format!(
                            "could not open video '{}'",
                            path.display()
                        )));
                    }
                    debug!(path = %path.display(), "opened video source");
                    Ok(ImageSource {
                        inner: Inner::Stream(capture),
                        live: false,
                    })
                }
            }
        }
    }

    /// True when frames come from a camera rather than a file.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// True when the source is a single still image.
    pub fn is_still(&self) -> bool {
        matches!(self.inner, Inner::Still { .. })
    }

    /// Reads the next frame, or `None` once the source is exhausted.
    pub fn read(&mut self) -> Result<Option<Mat>> {
        match &mut self.inner {
            Inner::Still { image, consumed } => {
                if *consumed {
                    return Ok(None);
                }
                *consumed = true;
                Ok(Some(image.try_clone()?))
            }
            Inner::Stream(capture) => {
                let mut frame = Mat::default();
                if capture.read(&mut frame)? && !frame.empty() {
                    Ok(Some(frame))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

impl Drop for ImageSource {
    fn drop(&mut self) {
        if let Inner::Stream(capture) = &mut self.inner {
            let _ = capture.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_image_path, Source};
    use std::path::Path;

    #[test]
    fn path_classification_by_extension() {
        assert!(is_image_path(Path::new("photo.JPG")));
        assert!(is_image_path(Path::new("shot.png")));
        assert!(!is_image_path(Path::new("clip.mp4")));
        assert!(!is_image_path(Path::new("noext")));
    }

    #[test]
    fn source_conversions() {
        assert_eq!(Source::from(1), Source::Webcam(1));
        assert_eq!(Source::from("a.mp4"), Source::Path("a.mp4".into()));
    }
}
