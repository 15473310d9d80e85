//! Webcam preview with optional recording.

use std::path::Path;

use opencv::core::Mat;
use opencv::highgui;
use opencv::prelude::*;
use opencv::videoio::{self, VideoWriter};
use tracing::info;

use super::{fourcc_code, open_webcam, VideoWriterSpec};
use crate::color::Color;
use crate::draw::{draw_text, TextSpec};
use crate::util::Result;

const KEY_QUIT: i32 = 'q' as i32;
const KEY_RECORD: i32 = 'r' as i32;

/// Shows a live camera feed; `q` quits and `r` toggles recording when a
/// save path was given.
#[derive(Clone, Debug)]
pub struct WebcamCapture {
    pub camera_index: i32,
    pub writer_spec: VideoWriterSpec,
}

impl Default for WebcamCapture {
    fn default() -> Self {
        WebcamCapture {
            camera_index: 0,
            writer_spec: VideoWriterSpec::default(),
        }
    }
}

impl WebcamCapture {
    /// Runs the preview loop. Returns the number of frames recorded (zero
    /// when recording never started or no `save_path` was given).
    pub fn capture(&self, save_path: Option<&Path>) -> Result<usize> {
        let fourcc = fourcc_code(&self.writer_spec.codec)?;
        let mut capture = open_webcam(self.camera_index)?;
        let title = "easycv webcam";

        let mut writer: Option<VideoWriter> = None;
        let mut recording = false;
        let mut recorded_frames = 0usize;
        let mut frame = Mat::default();
        loop {
            if !capture.read(&mut frame)? || frame.empty() {
                break;
            }
            if recording {
                if let Some(w) = writer.as_mut() {
                    w.write(&frame)?;
                    recorded_frames += 1;
                }
                draw_text(
                    &mut frame,
                    "REC",
                    (10, 30),
                    &TextSpec {
                        color: Color::RED,
                        ..Default::default()
                    },
                )?;
            }
            highgui::imshow(title, &frame)?;
            match highgui::wait_key(1)? {
                KEY_QUIT => break,
                KEY_RECORD => {
                    if let Some(path) = save_path {
                        if writer.is_none() {
                            let size = frame.size()?;
                            let fps = capture.get(videoio::CAP_PROP_FPS)?;
                            let fps = if fps > 0.0 { fps } else { self.writer_spec.fps };
                            writer = Some(VideoWriter::new(
                                &path.to_string_lossy(),
                                fourcc,
                                fps,
                                size,
                                true,
                            )?);
                        }
                        recording = !recording;
                        info!(recording, "toggled recording");
                    }
                }
                _ => {}
            }
        }

        if let Some(mut w) = writer {
            w.release()?;
        }
        capture.release()?;
        let _ = highgui::destroy_window(title);
        Ok(recorded_frames)
    }
}
