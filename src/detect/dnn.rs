//! Multi-class object detection with a pretrained SSD-style Caffe network.

use std::path::Path;

use opencv::core::{self, Mat, Rect, Scalar, Size};
use opencv::dnn::{self, Net};
use opencv::prelude::*;
use tracing::{debug, info};

use super::{process_source, Source};
use crate::color::Color;
use crate::draw::{draw_rectangle, draw_text, TextSpec};
use crate::util::{Error, Result};

/// One object found by [`DnnObjectDetector`].
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class_id: i32,
    pub label: String,
    pub confidence: f32,
    pub rect: Rect,
}

/// Wraps an OpenCV DNN loaded from Caffe prototxt/weights files.
///
/// Built for MobileNet-SSD style networks taking 300x300 inputs and
/// emitting `[id, class, confidence, x1, y1, x2, y2]` rows.
pub struct DnnObjectDetector {
    net: Net,
    class_names: Vec<String>,
    /// Detections below this confidence are dropped.
    pub confidence_threshold: f32,
    input_size: i32,
}

impl DnnObjectDetector {
    /// Loads a Caffe model. `class_names` must be indexed by the network's
    /// class ids.
    pub fn from_caffe(
        prototxt: impl AsRef<Path>,
        weights: impl AsRef<Path>,
        class_names: Vec<String>,
        confidence_threshold: f32,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(Error::invalid(format!(
                "confidence_threshold must be within [0, 1], got {confidence_threshold}"
            )));
        }
        for path in [prototxt.as_ref(), weights.as_ref()] {
            if !path.exists() {
                return Err(Error::ModelNotFound {
                    path: path.to_path_buf(),
                });
            }
        }
        let net = dnn::read_net_from_caffe(
            &prototxt.as_ref().to_string_lossy(),
            &weights.as_ref().to_string_lossy(),
        )?;
        info!(
            prototxt = %prototxt.as_ref().display(),
            weights = %weights.as_ref().display(),
            "loaded DNN model"
        );
        Ok(DnnObjectDetector {
            net,
            class_names,
            confidence_threshold,
            input_size: 300,
        })
    }

    fn label_for(&self, class_id: i32) -> String {
        self.class_names
            .get(class_id as usize)
            .cloned()
            .unwrap_or_else(|| format!("class {class_id}"))
    }

    /// Runs inference on one image and returns the confident detections.
    pub fn detect(&mut self, image: &Mat) -> Result<Vec<Detection>> {
        let blob = dnn::blob_from_image(
            image,
            0.007843,
            Size::new(self.input_size, self.input_size),
            Scalar::all(127.5),
            false,
            false,
            core::CV_32F,
        )?;
        self.net.set_input(&blob, "", 1.0, Scalar::default())?;
        let output = self.net.forward_single_def()?;

        // SSD output is a 1x1xNx7 tensor of f32 rows.
        let rows = output.total() / 7;
        let flat = output.reshape(1, 1)?;
        let data = flat.data_typed::<f32>()?;

        let (width, height) = (f64::from(image.cols()), f64::from(image.rows()));
        let mut detections = Vec::new();
        for row in 0..rows {
            let entry = &data[row * 7..row * 7 + 7];
            let confidence = entry[2];
            if confidence < self.confidence_threshold {
                continue;
            }
            let class_id = entry[1] as i32;
            let x1 = (f64::from(entry[3]) * width).round() as i32;
            let y1 = (f64::from(entry[4]) * height).round() as i32;
            let x2 = (f64::from(entry[5]) * width).round() as i32;
            let y2 = (f64::from(entry[6]) * height).round() as i32;
            let x1 = x1.clamp(0, image.cols() - 1);
            let y1 = y1.clamp(0, image.rows() - 1);
            let x2 = x2.clamp(x1, image.cols());
            let y2 = y2.clamp(y1, image.rows());
            detections.push(Detection {
                class_id,
                label: self.label_for(class_id),
                confidence,
                rect: Rect::new(x1, y1, x2 - x1, y2 - y1),
            });
        }
        debug!(count = detections.len(), "dnn detections");
        Ok(detections)
    }

    /// Source-driven variant with optional live preview; `q` stops streams.
    pub fn detect_from_source(
        &mut self,
        source: Option<Source>,
        show_live: bool,
    ) -> Result<Vec<Vec<Detection>>> {
        let mut per_frame = Vec::new();
        let mut handle = |frame: &mut Mat| -> Result<()> {
            let detections = self.detect(frame)?;
            if show_live {
                for d in &detections {
                    draw_rectangle(
                        frame,
                        (d.rect.x, d.rect.y),
                        (d.rect.x + d.rect.width, d.rect.y + d.rect.height),
                        Color::GREEN,
                        2,
                        false,
                    )?;
                    let caption = format!("{} {:.0}%", d.label, d.confidence * 100.0);
                    draw_text(
                        frame,
                        &caption,
                        (d.rect.x, (d.rect.y - 6).max(12)),
                        &TextSpec::default(),
                    )?;
                }
            }
            per_frame.push(detections);
            Ok(())
        };
        process_source(source, show_live, "easycv object detection", &mut handle)?;
        Ok(per_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::DnnObjectDetector;
    use crate::util::Error;

    #[test]
    fn missing_model_files_are_reported() {
        let err = DnnObjectDetector::from_caffe(
            "/no/such/net.prototxt",
            "/no/such/net.caffemodel",
            vec![],
            0.5,
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::ModelNotFound { .. }));
    }

    #[test]
    fn confidence_threshold_is_bounded() {
        let err =
            DnnObjectDetector::from_caffe("/no/such/a", "/no/such/b", vec![], 1.5).err().unwrap();
        assert!(err.is_validation());
    }
}
