//! Image loading utilities.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, RgbImage};
use ndarray::Array3;

use crate::error::{Error, Result};

use super::{normalize_pixels, ImageTensor, Normalization, PixelArray, IMAGE_SIZE, RGB_CHANNELS};

/// Load an image from disk as a normalized model input.
///
/// The image is:
/// 1. Loaded from the specified path
/// 2. Resized to 224x224 with Lanczos3
/// 3. Converted to RGB if necessary
/// 4. Normalized per channel with `normalization`
/// 5. Returned as a CHW tensor (3, 224, 224)
///
/// # Errors
///
/// Returns an error if the image cannot be loaded or the normalization is invalid.
pub fn load_image<P: AsRef<Path>>(path: P, normalization: &Normalization) -> Result<ImageTensor> {
    let path = path.as_ref();

    let img = open(path)?;
    tracing::debug!(
        "Loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );

    #[allow(clippy::cast_possible_truncation)]
    let size = IMAGE_SIZE as u32;
    let resized = img.resize_exact(size, size, FilterType::Lanczos3);

    normalize_pixels(&rgb_to_array(&resized.to_rgb8()), normalization)
}

/// Load an image from disk as an RGB HWC pixel array, without resizing.
///
/// # Errors
///
/// Returns an error if the image cannot be loaded.
pub fn load_pixels<P: AsRef<Path>>(path: P) -> Result<PixelArray> {
    let path = path.as_ref();
    let img = open(path)?;
    Ok(rgb_to_array(&img.to_rgb8()))
}

fn open(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert an RGB buffer to an HWC array.
#[allow(clippy::cast_possible_truncation)]
fn rgb_to_array(rgb: &RgbImage) -> PixelArray {
    let (width, height) = rgb.dimensions();
    Array3::from_shape_fn(
        (height as usize, width as usize, RGB_CHANNELS),
        // Safe: x and y are bounded by the image dimensions, which are u32
        |(y, x, c)| rgb.get_pixel(x as u32, y as u32)[c],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_tensor_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        DynamicImage::new_rgb8(100, 60).save(&path).unwrap();

        let tensor = load_image(&path, &Normalization::default()).unwrap();

        assert_eq!(tensor.shape(), &[RGB_CHANNELS, IMAGE_SIZE, IMAGE_SIZE]);
    }

    #[test]
    fn test_normalization_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("black.png");
        DynamicImage::new_rgb8(100, 100).save(&path).unwrap();

        let norm = Normalization::default();
        let tensor = load_image(&path, &norm).unwrap();

        // Black pixels normalize to -mean / std in every channel
        for c in 0..RGB_CHANNELS {
            let expected = -norm.mean[c] / norm.std[c];
            let channel = tensor.index_axis(ndarray::Axis(0), c);
            assert!(channel.iter().all(|v| (v - expected).abs() < 1e-4));
        }
    }

    #[test]
    fn test_load_pixels_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(3, 1, Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let pixels = load_pixels(&path).unwrap();

        assert_eq!(pixels.dim(), (2, 4, RGB_CHANNELS));
        assert_eq!(pixels[[1, 3, 0]], 10);
        assert_eq!(pixels[[1, 3, 1]], 20);
        assert_eq!(pixels[[1, 3, 2]], 30);
        assert_eq!(pixels[[0, 0, 0]], 0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_pixels(dir.path().join("nope.png"));
        assert!(matches!(result, Err(Error::ImageLoad { .. })));
    }
}
