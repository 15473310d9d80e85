//! Small validation and geometry helpers shared across the wrappers.

use crate::util::error::{Error, Result};

/// Checks that a kernel size is positive and rounds even values up to the
/// next odd number, since OpenCV's smoothing kernels require odd extents.
pub(crate) fn odd_kernel(name: &str, kernel_size: i32) -> Result<i32> {
    if kernel_size <= 0 {
        return Err(Error::invalid(format!(
            "{name} must be positive, got {kernel_size}"
        )));
    }
    Ok(if kernel_size % 2 == 0 {
        kernel_size + 1
    } else {
        kernel_size
    })
}

/// Checks that a value lies in `[0, 1]`.
pub(crate) fn unit_range(name: &str, value: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::invalid(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(value)
}

/// Resolves a target size from optional width/height/scale, preserving
/// aspect ratio when only one dimension is given.
pub(crate) fn resolve_size(
    src_width: i32,
    src_height: i32,
    width: Option<i32>,
    height: Option<i32>,
    scale: Option<f64>,
) -> Result<(i32, i32)> {
    if let Some(s) = scale {
        if s <= 0.0 {
            return Err(Error::invalid(format!("scale must be positive, got {s}")));
        }
        let w = (f64::from(src_width) * s).round() as i32;
        let h = (f64::from(src_height) * s).round() as i32;
        return Ok((w.max(1), h.max(1)));
    }
    match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        (Some(w), None) if w > 0 => {
            let h = (f64::from(w) * f64::from(src_height) / f64::from(src_width)).round() as i32;
            Ok((w, h.max(1)))
        }
        (None, Some(h)) if h > 0 => {
            let w = (f64::from(h) * f64::from(src_width) / f64::from(src_height)).round() as i32;
            Ok((w.max(1), h))
        }
        (None, None) => Err(Error::invalid(
            "resize needs at least one of width, height or scale",
        )),
        _ => Err(Error::invalid("width and height must be positive")),
    }
}

/// Picks a grid layout for `count` cells: explicit `(rows, cols)` when
/// given, otherwise a near-square layout.
pub(crate) fn grid_layout(
    count: usize,
    requested: Option<(usize, usize)>,
) -> Result<(usize, usize)> {
    if count == 0 {
        return Err(Error::invalid("image grid needs at least one image"));
    }
    match requested {
        Some((rows, cols)) => {
            if rows == 0 || cols == 0 {
                return Err(Error::invalid("grid dimensions must be positive"));
            }
            if rows * cols < count {
                return Err(Error::invalid(format!(
                    "grid of {rows}x{cols} cannot hold {count} images"
                )));
            }
            Ok((rows, cols))
        }
        None => {
            let cols = (count as f64).sqrt().ceil() as usize;
            let rows = count.div_ceil(cols);
            Ok((rows, cols))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{grid_layout, odd_kernel, resolve_size, unit_range};

    #[test]
    fn odd_kernel_rejects_non_positive() {
        assert!(odd_kernel("kernel_size", 0).is_err());
        assert!(odd_kernel("kernel_size", -3).is_err());
    }

    #[test]
    fn odd_kernel_rounds_even_up() {
        assert_eq!(odd_kernel("kernel_size", 4).unwrap(), 5);
        assert_eq!(odd_kernel("kernel_size", 7).unwrap(), 7);
    }

    #[test]
    fn unit_range_bounds() {
        assert!(unit_range("opacity", -0.1).is_err());
        assert!(unit_range("opacity", 1.1).is_err());
        assert_eq!(unit_range("opacity", 0.5).unwrap(), 0.5);
    }

    #[test]
    fn resolve_size_preserves_aspect_ratio() {
        assert_eq!(resolve_size(100, 100, Some(50), None, None).unwrap(), (50, 50));
        assert_eq!(resolve_size(200, 100, Some(50), None, None).unwrap(), (50, 25));
        assert_eq!(resolve_size(200, 100, None, Some(50), None).unwrap(), (100, 50));
    }

    #[test]
    fn resolve_size_scale_wins() {
        assert_eq!(resolve_size(100, 60, None, None, Some(0.5)).unwrap(), (50, 30));
        assert!(resolve_size(100, 60, None, None, Some(0.0)).is_err());
    }

    #[test]
    fn resolve_size_requires_some_target() {
        assert!(resolve_size(100, 100, None, None, None).is_err());
        assert!(resolve_size(100, 100, Some(0), None, None).is_err());
    }

    #[test]
    fn grid_layout_near_square() {
        assert_eq!(grid_layout(1, None).unwrap(), (1, 1));
        assert_eq!(grid_layout(5, None).unwrap(), (2, 3));
        assert_eq!(grid_layout(9, None).unwrap(), (3, 3));
    }

    #[test]
    fn grid_layout_respects_request() {
        assert_eq!(grid_layout(6, Some((2, 4))).unwrap(), (2, 4));
        assert!(grid_layout(9, Some((2, 4))).is_err());
        assert!(grid_layout(1, Some((0, 4))).is_err());
    }
}
