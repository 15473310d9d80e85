//! Video loading, saving, playback, analysis and frame extraction.
//!
//! Everything here is a thin layer over `videoio`: capture and writer
//! handles are owned by the calling code for the duration of a loop and
//! released when it exits.

mod analyze;
mod extract;
mod player;
mod webcam;

pub use analyze::{MotionSummary, VideoAnalyzer, VideoInfo};
pub use extract::FrameExtractor;
pub use player::VideoPlayer;
pub use webcam::WebcamCapture;

use std::path::Path;

use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoWriter};
use opencv::imgproc;
use tracing::{debug, info};

use crate::util::{Error, Result};

/// Opens a video file for reading.
pub fn open_video(path: impl AsRef<Path>) -> Result<VideoCapture> {
    let path = path.as_ref();
    let capture = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
    if !capture.is_opened()? {
        return Err(Error::SourceOpen(format!(
            "could not open video '{}'",
            path.display()
        )));
    }
    debug!(path = %path.display(), "opened video");
    Ok(capture)
}

/// Opens a camera by index.
pub fn open_webcam(index: i32) -> Result<VideoCapture> {
    let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
    if !capture.is_opened()? {
        return Err(Error::SourceOpen(format!("could not open webcam {index}")));
    }
    Ok(capture)
}

/// Encoding parameters for [`save_video`].
#[derive(Clone, Debug)]
pub struct VideoWriterSpec {
    pub fps: f64,
    /// FOURCC codec tag, e.g. `"mp4v"` or `"MJPG"`.
    pub codec: String,
}

impl Default for VideoWriterSpec {
    fn default() -> Self {
        VideoWriterSpec {
            fps: 30.0,
            codec: "mp4v".to_string(),
        }
    }
}

pub(crate) fn fourcc_code(codec: &str) -> Result<i32> {
    let chars: Vec<char> = codec.chars().collect();
    if chars.len() != 4 || !chars.iter().all(|c| c.is_ascii()) {
        return Err(Error::invalid(format!(
            "codec must be exactly four ASCII characters, got '{codec}'"
        )));
    }
    Ok(VideoWriter::fourcc(chars[0], chars[1], chars[2], chars[3])?)
}

/// Writes a sequence of frames to a video file.
///
/// All frames are resized to the first frame's extent before encoding.
pub fn save_video(frames: &[Mat], path: impl AsRef<Path>, spec: &VideoWriterSpec) -> Result<()> {
    let path = path.as_ref();
    if frames.is_empty() {
        return Err(Error::invalid("save_video needs at least one frame"));
    }
    if spec.fps <= 0.0 {
        return Err(Error::invalid(format!(
            "fps must be positive, got {}",
            spec.fps
        )));
    }
    let fourcc = fourcc_code(&spec.codec)?;
    let size = frames[0].size()?;
    let mut writer = VideoWriter::new(&path.to_string_lossy(), fourcc, spec.fps, size, true)?;
    if !writer.is_opened()? {
        return Err(Error::SourceOpen(format!(
            "could not open video writer for '{}' (codec '{}')",
            path.display(),
            spec.codec
        )));
    }
    for frame in frames {
        if frame.size()? == size {
            writer.write(frame)?;
        } else {
            let mut resized = Mat::default();
            imgproc::resize(
                frame,
                &mut resized,
                Size::new(size.width, size.height),
                0.0,
                0.0,
                imgproc::INTER_LINEAR,
            )?;
            writer.write(&resized)?;
        }
    }
    writer.release()?;
    info!(path = %path.display(), frames = frames.len(), "wrote video");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{fourcc_code, VideoWriterSpec};

    #[test]
    fn fourcc_requires_four_ascii_chars() {
        assert!(fourcc_code("mp4").is_err());
        assert!(fourcc_code("mjpeg").is_err());
        assert!(fourcc_code("mp4v").is_ok());
        assert!(fourcc_code("MJPG").is_ok());
    }

    #[test]
    fn writer_spec_defaults() {
        let spec = VideoWriterSpec::default();
        assert_eq!(spec.fps, 30.0);
        assert_eq!(spec.codec, "mp4v");
    }
}
