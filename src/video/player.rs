//! Blocking video playback with keyboard controls.

use std::path::Path;

use opencv::core::Mat;
use opencv::highgui;
use opencv::prelude::*;
use opencv::videoio;
use tracing::debug;

use super::open_video;
use crate::util::{Error, Result};

const KEY_QUIT: i32 = 'q' as i32;
const KEY_PAUSE: i32 = ' ' as i32;
// X11 arrow key codes as reported by highgui::wait_key.
const KEY_LEFT: i32 = 81;
const KEY_RIGHT: i32 = 83;

/// Plays a video in a highgui window.
///
/// Controls: `q` quits, space toggles pause, and the left/right arrow keys
/// jump one second backward/forward.
#[derive(Clone, Debug)]
pub struct VideoPlayer {
    /// Playback speed multiplier.
    pub speed: f64,
    /// Restart from the beginning when the file ends.
    pub looped: bool,
}

impl Default for VideoPlayer {
    fn default() -> Self {
        VideoPlayer {
            speed: 1.0,
            looped: false,
        }
    }
}

impl VideoPlayer {
    /// Blocks until playback finishes or the user quits.
    pub fn play(&self, path: impl AsRef<Path>, title: &str) -> Result<()> {
        if self.speed <= 0.0 {
            return Err(Error::invalid(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        let mut capture = open_video(&path)?;
        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let fps = if fps > 0.0 { fps } else { 30.0 };
        let frame_delay_ms = ((1000.0 / fps) / self.speed).max(1.0) as i32;
        debug!(fps, frame_delay_ms, "starting playback");

        let mut frame = Mat::default();
        let mut paused = false;
        loop {
            if !paused {
                if !capture.read(&mut frame)? || frame.empty() {
                    if self.looped {
                        capture.set(videoio::CAP_PROP_POS_FRAMES, 0.0)?;
                        continue;
                    }
                    break;
                }
                highgui::imshow(title, &frame)?;
            }
            match highgui::wait_key(frame_delay_ms)? {
                KEY_QUIT => break,
                KEY_PAUSE => paused = !paused,
                KEY_LEFT => seek_by(&mut capture, -fps)?,
                KEY_RIGHT => seek_by(&mut capture, fps)?,
                _ => {}
            }
        }
        capture.release()?;
        let _ = highgui::destroy_window(title);
        Ok(())
    }
}

fn seek_by(capture: &mut videoio::VideoCapture, frames: f64) -> Result<()> {
    let position = capture.get(videoio::CAP_PROP_POS_FRAMES)?;
    let total = capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
    let target = (position + frames).clamp(0.0, (total - 1.0).max(0.0));
    capture.set(videoio::CAP_PROP_POS_FRAMES, target)?;
    Ok(())
}
