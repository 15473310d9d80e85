use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use easycv::{
    detect_contours, draw_rectangle, edge_detection, gaussian_blur, get_image_info, load_image,
    resize_image, save_image, CascadeDetector, CascadeParams, Color, ColorSpace, ContourSpec,
    EdgeMethod, EdgeSpec, FrameExtractor, ImageMode, Interpolation, ResizeSpec, VideoAnalyzer,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "EasyCV command line tools")]
struct Cli {
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print image metadata as JSON.
    Info { image: PathBuf },
    /// Resize an image, preserving aspect ratio unless both extents are given.
    Resize {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        width: Option<i32>,
        #[arg(long)]
        height: Option<i32>,
        #[arg(long)]
        scale: Option<f64>,
        #[arg(long, default_value = "linear")]
        interpolation: String,
    },
    /// Gaussian-blur an image.
    Blur {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 5)]
        kernel_size: i32,
        #[arg(long, default_value_t = 0.0)]
        sigma: f64,
    },
    /// Extract an edge map.
    Edges {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value = "canny")]
        method: String,
        #[arg(long, default_value_t = 50.0)]
        low: f64,
        #[arg(long, default_value_t = 150.0)]
        high: f64,
        #[arg(long, default_value_t = 3)]
        aperture: i32,
    },
    /// Convert between color spaces.
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value = "bgr")]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Count contours and print their bounding boxes as JSON.
    Contours {
        image: PathBuf,
        #[arg(long, default_value_t = 127.0)]
        threshold: f64,
        #[arg(long, default_value_t = 0.0)]
        min_area: f64,
    },
    /// Detect faces and write a copy with boxes drawn.
    DetectFaces {
        input: PathBuf,
        output: PathBuf,
        /// Explicit Haar cascade XML; the bundled one is used by default.
        #[arg(long)]
        cascade: Option<PathBuf>,
    },
    /// Print video metadata as JSON.
    VideoInfo { video: PathBuf },
    /// Dump video frames as numbered images.
    ExtractFrames {
        video: PathBuf,
        output_dir: PathBuf,
        #[arg(long, default_value_t = 1)]
        interval: usize,
        #[arg(long)]
        max_frames: Option<usize>,
        #[arg(long, default_value = "png")]
        format: String,
    },
}

#[derive(Debug, Serialize)]
struct ImageInfoRecord {
    width: i32,
    height: i32,
    channels: i32,
    bit_depth: i32,
    size_bytes: usize,
}

#[derive(Debug, Serialize)]
struct VideoInfoRecord {
    width: i32,
    height: i32,
    fps: f64,
    frame_count: i64,
    duration_secs: f64,
    fourcc: String,
}

#[derive(Debug, Serialize)]
struct RectRecord {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("easycv=debug".parse()?))
            .with_target(false)
            .init();
    }

    match cli.command {
        Command::Info { image } => {
            let info = get_image_info(&load_image(&image, ImageMode::Unchanged)?)?;
            let record = ImageInfoRecord {
                width: info.width,
                height: info.height,
                channels: info.channels,
                bit_depth: info.bit_depth,
                size_bytes: info.size_bytes,
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Resize {
            input,
            output,
            width,
            height,
            scale,
            interpolation,
        } => {
            let image = load_image(&input, ImageMode::Unchanged)?;
            let spec = ResizeSpec {
                width,
                height,
                scale,
                interpolation: interpolation.parse::<Interpolation>()?,
            };
            save_image(&resize_image(&image, &spec)?, &output)?;
        }
        Command::Blur {
            input,
            output,
            kernel_size,
            sigma,
        } => {
            let image = load_image(&input, ImageMode::Color)?;
            save_image(&gaussian_blur(&image, kernel_size, sigma)?, &output)?;
        }
        Command::Edges {
            input,
            output,
            method,
            low,
            high,
            aperture,
        } => {
            let image = load_image(&input, ImageMode::Color)?;
            let spec = EdgeSpec {
                method: method.parse::<EdgeMethod>()?,
                low_threshold: low,
                high_threshold: high,
                aperture,
            };
            save_image(&edge_detection(&image, &spec)?, &output)?;
        }
        Command::Convert {
            input,
            output,
            from,
            to,
        } => {
            let image = load_image(&input, ImageMode::Unchanged)?;
            let converted = easycv::convert_color_space(
                &image,
                from.parse::<ColorSpace>()?,
                to.parse::<ColorSpace>()?,
            )?;
            save_image(&converted, &output)?;
        }
        Command::Contours {
            image,
            threshold,
            min_area,
        } => {
            let buffer = load_image(&image, ImageMode::Color)?;
            let spec = ContourSpec {
                threshold_value: threshold,
                min_area,
                ..Default::default()
            };
            let contours = detect_contours(&buffer, &spec)?;
            let records: Vec<RectRecord> = contours
                .iter()
                .map(|c| {
                    let rect = c.bounding_rect()?;
                    Ok(RectRecord {
                        x: rect.x,
                        y: rect.y,
                        width: rect.width,
                        height: rect.height,
                    })
                })
                .collect::<easycv::Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::DetectFaces {
            input,
            output,
            cascade,
        } => {
            let mut image = load_image(&input, ImageMode::Color)?;
            let mut detector = match cascade {
                Some(path) => CascadeDetector::from_file(path, CascadeParams::default())?,
                None => CascadeDetector::face(CascadeParams::default())?,
            };
            let faces = detector.detect(&image)?;
            for rect in &faces {
                draw_rectangle(
                    &mut image,
                    (rect.x, rect.y),
                    (rect.x + rect.width, rect.y + rect.height),
                    Color::GREEN,
                    2,
                    false,
                )?;
            }
            save_image(&image, &output)?;
            eprintln!("{} face(s) found", faces.len());
        }
        Command::VideoInfo { video } => {
            let info = VideoAnalyzer::new().info(&video)?;
            let record = VideoInfoRecord {
                width: info.width,
                height: info.height,
                fps: info.fps,
                frame_count: info.frame_count,
                duration_secs: info.duration_secs,
                fourcc: info.fourcc,
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::ExtractFrames {
            video,
            output_dir,
            interval,
            max_frames,
            format,
        } => {
            let extractor = FrameExtractor {
                frame_interval: interval,
                max_frames,
                format,
            };
            let written = extractor.extract(&video, &output_dir)?;
            eprintln!("wrote {} frame(s)", written.len());
        }
    }

    Ok(())
}
