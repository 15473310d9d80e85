//! Object detection wrappers: Haar cascades, background-subtraction motion
//! detection, Hough circles/lines, HSV color detection and DNN inference.
//!
//! Detectors share a common source model: [`Source`] names a webcam index or
//! a file, and every detector offers `detect_from_source` with an optional
//! live preview that exits on `q`.

mod cascade;
mod color;
mod dnn;
mod hough;
mod motion;
mod source;

pub use cascade::{detect_eyes, detect_faces, CascadeDetector, CascadeParams};
pub use color::{detect_color, ColorDetector, TargetColor};
pub use dnn::{Detection, DnnObjectDetector};
pub use hough::{
    detect_circles, detect_lines, CircleDetector, DetectedCircle, DetectedLine, LineDetector,
};
pub use motion::{MotionDetector, MotionMethod};
pub use source::{ImageSource, Source};

use opencv::core::Mat;
use opencv::highgui;

use crate::util::Result;

pub(crate) const QUIT_KEY: i32 = 'q' as i32;

/// Drives a read/annotate/display loop over a source.
///
/// The handler runs once per frame and may draw on it. With `show_live` the
/// annotated frame is displayed; a still image blocks until a key press,
/// streams poll once per frame and stop on [`QUIT_KEY`].
pub(crate) fn process_source<F>(
    source: Option<Source>,
    show_live: bool,
    window: &str,
    mut handle: F,
) -> Result<()>
where
    F: FnMut(&mut Mat) -> Result<()>,
{
    let mut src = ImageSource::open(source)?;
    while let Some(mut frame) = src.read()? {
        handle(&mut frame)?;
        if show_live {
            highgui::imshow(window, &frame)?;
            let delay = if src.is_still() { 0 } else { 1 };
            if highgui::wait_key(delay)? == QUIT_KEY {
                break;
            }
        }
    }
    if show_live {
        let _ = highgui::destroy_window(window);
    }
    Ok(())
}
