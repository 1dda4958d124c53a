//! Image saving utilities.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use ndarray::{ArrayBase, Data, Ix3};

use crate::error::{Error, Result};

/// Save an HWC pixel array as a PNG file.
///
/// One channel is written as grayscale, three as RGB, four as RGBA. The file
/// is always PNG-encoded, whatever the extension of `path`.
///
/// # Errors
///
/// Returns an error if the channel count is unsupported or the image cannot be saved.
pub fn save_image<S, P>(pixels: &ArrayBase<S, Ix3>, path: P) -> Result<()>
where
    S: Data<Elem = u8>,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let img = array_to_image(pixels)?;

    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| Error::ImageSave {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!("Saved {:?} pixels to {}", pixels.shape(), path.display());

    Ok(())
}

/// Build an image from an HWC array, copying in standard (row-major) order.
fn array_to_image<S>(pixels: &ArrayBase<S, Ix3>) -> Result<DynamicImage>
where
    S: Data<Elem = u8>,
{
    let (height, width, channels) = pixels.dim();
    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(Error::ShapeMismatch {
            expected: "dimensions that fit in u32".to_string(),
            actual: format!("{:?}", pixels.shape()),
        });
    };

    let raw: Vec<u8> = pixels.iter().copied().collect();
    let mismatch = || Error::ShapeMismatch {
        expected: format!("{height}x{width}x{channels} buffer"),
        actual: format!("{} bytes", pixels.len()),
    };

    let img = match channels {
        1 => DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, raw).ok_or_else(mismatch)?),
        3 => DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, raw).ok_or_else(mismatch)?),
        4 => DynamicImage::ImageRgba8(RgbaImage::from_raw(w, h, raw).ok_or_else(mismatch)?),
        _ => return Err(Error::UnsupportedChannels { channels }),
    };

    Ok(img)
}
