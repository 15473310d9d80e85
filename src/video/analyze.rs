//! Video metadata queries and coarse motion analysis.

use std::path::Path;

use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio;
use opencv::video;
use tracing::debug;

use super::open_video;
use crate::util::Result;

/// Container-level facts about a video file.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: i32,
    pub height: i32,
    pub fps: f64,
    pub frame_count: i64,
    pub duration_secs: f64,
    /// FOURCC tag as stored in the container, e.g. `"mp4v"`.
    pub fourcc: String,
}

/// Summary produced by [`VideoAnalyzer::analyze_motion`].
#[derive(Clone, Debug, PartialEq)]
pub struct MotionSummary {
    pub frames_analyzed: usize,
    /// Frames on which the foreground mask was non-trivial.
    pub frames_with_motion: usize,
    /// `frames_with_motion / frames_analyzed`, 0 for empty input.
    pub motion_ratio: f64,
}

/// Read-only inspection of video files.
#[derive(Clone, Copy, Debug, Default)]
pub struct VideoAnalyzer {
    /// Foreground pixels required to count a frame as "moving".
    pub motion_pixel_threshold: i32,
}

impl VideoAnalyzer {
    pub fn new() -> Self {
        VideoAnalyzer {
            motion_pixel_threshold: 500,
        }
    }

    /// Reads size, frame rate, frame count and codec tag.
    pub fn info(&self, path: impl AsRef<Path>) -> Result<VideoInfo> {
        let capture = open_video(path)?;
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)? as i64;
        let fourcc_raw = capture.get(videoio::CAP_PROP_FOURCC)? as i32;
        let duration_secs = if fps > 0.0 {
            frame_count as f64 / fps
        } else {
            0.0
        };
        Ok(VideoInfo {
            width,
            height,
            fps,
            frame_count,
            duration_secs,
            fourcc: decode_fourcc(fourcc_raw),
        })
    }

    /// Runs a background subtractor over the whole file and reports how
    /// many frames contained motion.
    pub fn analyze_motion(&self, path: impl AsRef<Path>) -> Result<MotionSummary> {
        let mut capture = open_video(path)?;
        let mut subtractor = video::create_background_subtractor_mog2_def()?;

        let mut frames_analyzed = 0usize;
        let mut frames_with_motion = 0usize;
        let mut frame = Mat::default();
        let mut mask = Mat::default();
        while capture.read(&mut frame)? && !frame.empty() {
            opencv::prelude::BackgroundSubtractorMOG2Trait::apply(
                &mut subtractor,
                &frame,
                &mut mask,
                -1.0,
            )?;
            frames_analyzed += 1;
            // The first frame only seeds the model.
            if frames_analyzed == 1 {
                continue;
            }
            if opencv::core::count_non_zero(&mask)? > self.motion_pixel_threshold {
                frames_with_motion += 1;
            }
        }
        capture.release()?;

        let motion_ratio = if frames_analyzed > 0 {
            frames_with_motion as f64 / frames_analyzed as f64
        } else {
            0.0
        };
        debug!(frames_analyzed, frames_with_motion, "motion analysis done");
        Ok(MotionSummary {
            frames_analyzed,
            frames_with_motion,
            motion_ratio,
        })
    }
}

fn decode_fourcc(code: i32) -> String {
    let bytes = code.to_le_bytes();
    bytes
        .iter()
        .map(|&b| {
            let c = b as char;
            if c.is_ascii_graphic() {
                c
            } else {
                '?'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::decode_fourcc;

    #[test]
    fn fourcc_decodes_ascii_tags() {
        let code = i32::from_le_bytes([b'M', b'J', b'P', b'G']);
        assert_eq!(decode_fourcc(code), "MJPG");
    }

    #[test]
    fn fourcc_masks_non_printable_bytes() {
        assert_eq!(decode_fourcc(0), "????");
    }
}
