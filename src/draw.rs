//! Drawing primitives. All functions draw in place on a mutable image,
//! following OpenCV's own convention.

use opencv::core::{self, Mat, Point, Rect, Size, Vector};
use opencv::imgproc;
use opencv::prelude::*;

use crate::color::Color;
use crate::features::Contour;
use crate::util::{Error, Result};

fn line_thickness(thickness: i32) -> Result<i32> {
    if thickness <= 0 {
        return Err(Error::invalid(format!(
            "thickness must be positive, got {thickness}"
        )));
    }
    Ok(thickness)
}

/// Draws a rectangle given any two opposite corners.
pub fn draw_rectangle(
    image: &mut Mat,
    corner_a: (i32, i32),
    corner_b: (i32, i32),
    color: Color,
    thickness: i32,
    filled: bool,
) -> Result<()> {
    let thickness = if filled {
        imgproc::FILLED
    } else {
        line_thickness(thickness)?
    };
    let rect = Rect::new(
        corner_a.0.min(corner_b.0),
        corner_a.1.min(corner_b.1),
        (corner_a.0 - corner_b.0).abs(),
        (corner_a.1 - corner_b.1).abs(),
    );
    imgproc::rectangle(image, rect, color.to_scalar(), thickness, imgproc::LINE_8, 0)?;
    Ok(())
}

/// Draws a circle.
pub fn draw_circle(
    image: &mut Mat,
    center: (i32, i32),
    radius: i32,
    color: Color,
    thickness: i32,
    filled: bool,
) -> Result<()> {
    if radius <= 0 {
        return Err(Error::invalid(format!(
            "radius must be positive, got {radius}"
        )));
    }
    let thickness = if filled {
        imgproc::FILLED
    } else {
        line_thickness(thickness)?
    };
    imgproc::circle(
        image,
        Point::new(center.0, center.1),
        radius,
        color.to_scalar(),
        thickness,
        imgproc::LINE_8,
        0,
    )?;
    Ok(())
}

/// Draws a straight line segment.
pub fn draw_line(
    image: &mut Mat,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    thickness: i32,
) -> Result<()> {
    let thickness = line_thickness(thickness)?;
    imgproc::line(
        image,
        Point::new(start.0, start.1),
        Point::new(end.0, end.1),
        color.to_scalar(),
        thickness,
        imgproc::LINE_8,
        0,
    )?;
    Ok(())
}

/// Draws a line with an arrow head at `end`.
pub fn draw_arrow(
    image: &mut Mat,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    thickness: i32,
) -> Result<()> {
    let thickness = line_thickness(thickness)?;
    imgproc::arrowed_line(
        image,
        Point::new(start.0, start.1),
        Point::new(end.0, end.1),
        color.to_scalar(),
        thickness,
        imgproc::LINE_8,
        0,
        0.1,
    )?;
    Ok(())
}

/// Draws a polygon outline, or fills it when `filled` is set.
pub fn draw_polygon(
    image: &mut Mat,
    points: &[(i32, i32)],
    color: Color,
    thickness: i32,
    filled: bool,
) -> Result<()> {
    if points.len() < 3 {
        return Err(Error::invalid(format!(
            "polygon needs at least 3 points, got {}",
            points.len()
        )));
    }
    let vertices: Vector<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
    if filled {
        imgproc::fill_poly_def(image, &vertices, color.to_scalar())?;
    } else {
        let thickness = line_thickness(thickness)?;
        imgproc::polylines(
            image,
            &vertices,
            true,
            color.to_scalar(),
            thickness,
            imgproc::LINE_8,
            0,
        )?;
    }
    Ok(())
}

/// Text styling for [`draw_text`].
#[derive(Clone, Debug)]
pub struct TextSpec {
    pub font_scale: f64,
    pub color: Color,
    pub thickness: i32,
    /// Draw a filled box of this color behind the text.
    pub background: Option<Color>,
}

impl Default for TextSpec {
    fn default() -> Self {
        TextSpec {
            font_scale: 0.7,
            color: Color::WHITE,
            thickness: 2,
            background: None,
        }
    }
}

/// Draws text with `origin` at the baseline's left end.
pub fn draw_text(image: &mut Mat, text: &str, origin: (i32, i32), spec: &TextSpec) -> Result<()> {
    if spec.font_scale <= 0.0 {
        return Err(Error::invalid(format!(
            "font_scale must be positive, got {}",
            spec.font_scale
        )));
    }
    let thickness = line_thickness(spec.thickness)?;
    let font = imgproc::FONT_HERSHEY_SIMPLEX;
    if let Some(bg) = spec.background {
        let mut baseline = 0;
        let extent = imgproc::get_text_size(text, font, spec.font_scale, thickness, &mut baseline)?;
        draw_rectangle(
            image,
            (origin.0 - 2, origin.1 - extent.height - 2),
            (origin.0 + extent.width + 2, origin.1 + baseline + 2),
            bg,
            1,
            true,
        )?;
    }
    imgproc::put_text(
        image,
        text,
        Point::new(origin.0, origin.1),
        font,
        spec.font_scale,
        spec.color.to_scalar(),
        thickness,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}

/// Outlines detected contours.
pub fn draw_contours(
    image: &mut Mat,
    contours: &[Contour],
    color: Color,
    thickness: i32,
) -> Result<()> {
    let thickness = line_thickness(thickness)?;
    let mut all: Vector<Vector<Point>> = Vector::new();
    for contour in contours {
        all.push(contour.points().clone());
    }
    imgproc::draw_contours(
        image,
        &all,
        -1,
        color.to_scalar(),
        thickness,
        imgproc::LINE_8,
        &core::no_array(),
        i32::MAX,
        Point::new(0, 0),
    )?;
    Ok(())
}

/// Overlays an evenly spaced grid.
pub fn draw_grid(
    image: &mut Mat,
    rows: i32,
    cols: i32,
    color: Color,
    thickness: i32,
) -> Result<()> {
    if rows <= 0 || cols <= 0 {
        return Err(Error::invalid(format!(
            "grid must have positive dimensions, got {rows}x{cols}"
        )));
    }
    let thickness = line_thickness(thickness)?;
    let Size { width, height } = image.size()?;
    for row in 1..rows {
        let y = height * row / rows;
        draw_line(image, (0, y), (width, y), color, thickness)?;
    }
    for col in 1..cols {
        let x = width * col / cols;
        draw_line(image, (x, 0), (x, height), color, thickness)?;
    }
    Ok(())
}
