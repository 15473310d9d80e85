//! EasyCV is a batteries-included convenience layer over OpenCV.
//!
//! Every function validates its friendly parameters up front, returns a
//! [`Result`] with a descriptive error, and delegates the actual pixel work
//! to OpenCV. Images are plain [`opencv::core::Mat`] buffers in BGR order,
//! so outputs plug straight back into raw OpenCV calls when needed.
//! Optional interop with the `image` crate lives behind the `image-io`
//! feature.

pub mod color;
pub mod detect;
pub mod draw;
pub mod features;
pub mod filters;
pub mod imgops;
#[cfg(feature = "image-io")]
pub mod io;
pub mod transform;
pub mod util;
pub mod utils;
pub mod video;

pub use color::Color;
pub use util::{Error, Result};

pub use imgops::{
    convert_color_space, create_blank_image, crop_image, get_image_info, load_image, resize_image,
    save_image, save_image_with, show_image, ColorSpace, ImageInfo, ImageMode, Interpolation,
    ResizeSpec, SaveOptions,
};

pub use filters::{
    bilateral_filter, cartoon, edge_detection, emboss, gaussian_blur, median_blur, threshold,
    unsharp_mask, vintage, EdgeMethod, EdgeSpec, ThresholdKind, ThresholdSpec,
};

pub use transform::{
    fisheye_effect, flip_image, resize_with_aspect_ratio, rotate_image, translate_image,
    warp_perspective, BorderMode, FlipDirection, RotationSpec,
};

pub use features::{
    detect_contours, detect_corners, detect_keypoints, Contour, ContourSpec, CornerSpec,
    KeypointMethod,
};

pub use detect::{
    CascadeDetector, CascadeParams, CircleDetector, ColorDetector, DetectedCircle, DetectedLine,
    Detection, DnnObjectDetector, ImageSource, LineDetector, MotionDetector, MotionMethod, Source,
    TargetColor,
};

pub use draw::{
    draw_arrow, draw_circle, draw_contours, draw_grid, draw_line, draw_polygon, draw_rectangle,
    draw_text, TextSpec,
};

pub use utils::{
    apply_watermark, color_at, convert_to_sketch, create_image_grid, image_comparison, FpsCounter,
    GridSpec, WatermarkPosition, WatermarkSpec,
};

pub use video::{
    open_video, open_webcam, save_video, FrameExtractor, MotionSummary, VideoAnalyzer, VideoInfo,
    VideoPlayer, VideoWriterSpec, WebcamCapture,
};
