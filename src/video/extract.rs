//! Dumping video frames to image files.

use std::path::{Path, PathBuf};

use opencv::core::Mat;
use opencv::prelude::*;
use tracing::info;

use super::open_video;
use crate::imgops::save_image;
use crate::util::{Error, Result};

/// Extracts frames from a video into numbered image files.
#[derive(Clone, Debug)]
pub struct FrameExtractor {
    /// Keep every n-th frame.
    pub frame_interval: usize,
    /// Stop after this many saved frames.
    pub max_frames: Option<usize>,
    /// Output image extension, `"png"` or `"jpg"`.
    pub format: String,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        FrameExtractor {
            frame_interval: 1,
            max_frames: None,
            format: "png".to_string(),
        }
    }
}

impl FrameExtractor {
    fn validate(&self) -> Result<()> {
        if self.frame_interval == 0 {
            return Err(Error::invalid("frame_interval must be at least 1"));
        }
        if self.max_frames == Some(0) {
            return Err(Error::invalid("max_frames must be at least 1 when set"));
        }
        match self.format.as_str() {
            "png" | "jpg" | "jpeg" | "bmp" => Ok(()),
            other => Err(Error::Unsupported {
                what: "frame format",
                value: other.to_string(),
            }),
        }
    }

    /// Reads `video_path` and writes the selected frames into `output_dir`
    /// (created if missing) as `frame_000042.<format>`. Returns the paths
    /// written, in frame order.
    pub fn extract(
        &self,
        video_path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        self.validate()?;
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let mut capture = open_video(&video_path)?;
        let mut written = Vec::new();
        let mut frame = Mat::default();
        let mut index = 0usize;
        while capture.read(&mut frame)? && !frame.empty() {
            if index % self.frame_interval == 0 {
                let name = format!("frame_{index:06}.{}", self.format);
                let path = output_dir.join(name);
                save_image(&frame, &path)?;
                written.push(path);
                if let Some(max) = self.max_frames {
                    if written.len() >= max {
                        break;
                    }
                }
            }
            index += 1;
        }
        capture.release()?;
        info!(
            video = %video_path.as_ref().display(),
            frames = written.len(),
            "extracted frames"
        );
        Ok(written)
    }
}
