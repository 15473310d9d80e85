//! Interop with the `image` crate, behind the `image-io` feature.
//!
//! OpenCV stores color pixels as BGR while `image` uses RGB, so every
//! conversion here swaps channels.

use image::{GrayImage, RgbImage};
use opencv::core::{Mat, Vec3b, CV_8UC1, CV_8UC3};
use opencv::prelude::*;

use crate::util::{Error, Result};

/// Converts a BGR `Mat` into an [`RgbImage`].
pub fn mat_to_rgb(image: &Mat) -> Result<RgbImage> {
    if image.typ() != CV_8UC3 {
        return Err(Error::invalid(format!(
            "expected an 8-bit 3-channel image, got type {}",
            image.typ()
        )));
    }
    let (width, height) = (image.cols() as u32, image.rows() as u32);
    let mut out = RgbImage::new(width, height);
    for y in 0..image.rows() {
        for x in 0..image.cols() {
            let px = image.at_2d::<Vec3b>(y, x)?;
            out.put_pixel(x as u32, y as u32, image::Rgb([px[2], px[1], px[0]]));
        }
    }
    Ok(out)
}

/// Converts an [`RgbImage`] into a BGR `Mat`.
pub fn rgb_to_mat(image: &RgbImage) -> Result<Mat> {
    let mut out = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        CV_8UC3,
        Default::default(),
    )?;
    for (x, y, pixel) in image.enumerate_pixels() {
        let image::Rgb([r, g, b]) = *pixel;
        *out.at_2d_mut::<Vec3b>(y as i32, x as i32)? = Vec3b::from([b, g, r]);
    }
    Ok(out)
}

/// Converts a single-channel `Mat` into a [`GrayImage`].
pub fn mat_to_gray(image: &Mat) -> Result<GrayImage> {
    if image.typ() != CV_8UC1 {
        return Err(Error::invalid(format!(
            "expected an 8-bit 1-channel image, got type {}",
            image.typ()
        )));
    }
    let (width, height) = (image.cols() as u32, image.rows() as u32);
    let mut out = GrayImage::new(width, height);
    for y in 0..image.rows() {
        for x in 0..image.cols() {
            out.put_pixel(x as u32, y as u32, image::Luma([*image.at_2d::<u8>(y, x)?]));
        }
    }
    Ok(out)
}

/// Converts a [`GrayImage`] into a single-channel `Mat`.
pub fn gray_to_mat(image: &GrayImage) -> Result<Mat> {
    let mut out = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        CV_8UC1,
        Default::default(),
    )?;
    for (x, y, pixel) in image.enumerate_pixels() {
        *out.at_2d_mut::<u8>(y as i32, x as i32)? = pixel.0[0];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_round_trip_swaps_channels_consistently() {
        let mut src = RgbImage::new(4, 3);
        src.put_pixel(1, 2, image::Rgb([10, 20, 30]));
        let mat = rgb_to_mat(&src).unwrap();
        let px = mat.at_2d::<Vec3b>(2, 1).unwrap();
        assert_eq!([px[0], px[1], px[2]], [30, 20, 10]);
        let back = mat_to_rgb(&mat).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn gray_round_trip_preserves_pixels() {
        let mut src = GrayImage::new(3, 3);
        src.put_pixel(0, 0, image::Luma([77]));
        let mat = gray_to_mat(&src).unwrap();
        assert_eq!(*mat.at_2d::<u8>(0, 0).unwrap(), 77);
        assert_eq!(mat_to_gray(&mat).unwrap(), src);
    }

    #[test]
    fn mat_to_rgb_rejects_gray_input() {
        let mat = Mat::new_rows_cols_with_default(2, 2, CV_8UC1, Default::default()).unwrap();
        assert!(mat_to_rgb(&mat).is_err());
    }
}
