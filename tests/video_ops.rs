//! Writing and inspecting real video files through the videoio wrappers.
//!
//! MJPG in an AVI container is the most portable writer configuration
//! across OpenCV builds, so every test encodes with it.

use easycv::{
    create_blank_image, draw_circle, open_video, save_video, Color, Error, FrameExtractor,
    VideoAnalyzer, VideoWriterSpec,
};

fn bouncing_dot_frames(count: usize) -> Vec<opencv::core::Mat> {
    (0..count)
        .map(|i| {
            let mut frame = create_blank_image(160, 120, Color::BLACK).unwrap();
            draw_circle(&mut frame, (20 + 10 * i as i32, 60), 10, Color::WHITE, 1, true).unwrap();
            frame
        })
        .collect()
}

fn mjpg_spec() -> VideoWriterSpec {
    VideoWriterSpec {
        fps: 10.0,
        codec: "MJPG".to_string(),
    }
}

#[test]
fn save_video_then_read_back_info() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dot.avi");
    save_video(&bouncing_dot_frames(12), &path, &mjpg_spec()).unwrap();

    let info = VideoAnalyzer::new().info(&path).unwrap();
    assert_eq!((info.width, info.height), (160, 120));
    assert!((info.fps - 10.0).abs() < 0.5);
    assert_eq!(info.frame_count, 12);
    assert!(info.duration_secs > 1.0);
}

#[test]
fn save_video_validates_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.avi");
    assert!(save_video(&[], &path, &mjpg_spec()).is_err());

    let frames = bouncing_dot_frames(2);
    let bad_fps = VideoWriterSpec {
        fps: 0.0,
        codec: "MJPG".to_string(),
    };
    assert!(save_video(&frames, &path, &bad_fps).is_err());

    let bad_codec = VideoWriterSpec {
        fps: 10.0,
        codec: "mjpeg".to_string(),
    };
    assert!(matches!(
        save_video(&frames, &path, &bad_codec),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn mixed_frame_sizes_are_normalized_to_the_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.avi");

    let mut frames = bouncing_dot_frames(3);
    frames.push(create_blank_image(320, 240, Color::WHITE).unwrap());
    save_video(&frames, &path, &mjpg_spec()).unwrap();

    let info = VideoAnalyzer::new().info(&path).unwrap();
    assert_eq!((info.width, info.height), (160, 120));
    assert_eq!(info.frame_count, 4);
}

#[test]
fn frame_extractor_writes_numbered_images() {
    let dir = tempfile::tempdir().unwrap();
    let video_path = dir.path().join("dot.avi");
    save_video(&bouncing_dot_frames(10), &video_path, &mjpg_spec()).unwrap();

    let extractor = FrameExtractor {
        frame_interval: 3,
        ..Default::default()
    };
    let written = extractor.extract(&video_path, dir.path().join("frames")).unwrap();
    // Frames 0, 3, 6, 9.
    assert_eq!(written.len(), 4);
    assert!(written[0].ends_with("frame_000000.png"));
    assert!(written.iter().all(|p| p.exists()));
}

#[test]
fn frame_extraction_failures_surface_as_errors() {
    let dir = tempfile::tempdir().unwrap();
    let video_path = dir.path().join("dot.avi");
    save_video(&bouncing_dot_frames(3), &video_path, &mjpg_spec()).unwrap();

    // A regular file where the output directory should go makes every
    // write impossible; no phantom paths may be reported.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let result = FrameExtractor::default().extract(&video_path, blocker.join("frames"));
    assert!(result.is_err());
}

#[test]
fn frame_extractor_honors_max_frames() {
    let dir = tempfile::tempdir().unwrap();
    let video_path = dir.path().join("dot.avi");
    save_video(&bouncing_dot_frames(10), &video_path, &mjpg_spec()).unwrap();

    let extractor = FrameExtractor {
        max_frames: Some(2),
        ..Default::default()
    };
    let written = extractor.extract(&video_path, dir.path().join("frames")).unwrap();
    assert_eq!(written.len(), 2);
}

#[test]
fn motion_analysis_sees_the_moving_dot() {
    let dir = tempfile::tempdir().unwrap();
    let video_path = dir.path().join("dot.avi");
    save_video(&bouncing_dot_frames(15), &video_path, &mjpg_spec()).unwrap();

    let analyzer = VideoAnalyzer {
        motion_pixel_threshold: 50,
    };
    let summary = analyzer.analyze_motion(&video_path).unwrap();
    assert_eq!(summary.frames_analyzed, 15);
    assert!(summary.frames_with_motion > 0);
    assert!(summary.motion_ratio > 0.0 && summary.motion_ratio <= 1.0);
}

#[test]
fn missing_video_is_a_source_error() {
    assert!(matches!(
        open_video("/no/such/clip.avi"),
        Err(Error::SourceOpen(_))
    ));
    assert!(VideoAnalyzer::new().info("/no/such/clip.avi").is_err());
}
