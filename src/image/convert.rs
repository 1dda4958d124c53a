//! Conversion between normalized CHW tensors and HWC pixel arrays.

use ndarray::{Array3, ArrayBase, Data, Dimension, Ix3};

use crate::error::{Error, Result};

use super::{ImageTensor, Normalization, PixelArray, IMAGE_SIZE, RGB_CHANNELS};

/// Convert a normalized tensor back to displayable pixels.
///
/// The tensor is:
/// 1. Stripped of leading singleton axes, so `(1, 3, 224, 224)` batches are accepted
/// 2. Denormalized per channel (`value * std + mean`) and scaled to [0, 255]
/// 3. Rounded and clamped to `u8`
/// 4. Transposed from CHW to HWC
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the remaining shape is not `(3, 224, 224)`,
/// or an invalid-parameter error if the normalization is unusable.
pub fn convert_net<S, D>(
    tensor: &ArrayBase<S, D>,
    normalization: &Normalization,
) -> Result<PixelArray>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    normalization.validate()?;

    let shape = tensor.shape();
    let leading = shape.iter().take_while(|&&dim| dim == 1).count();
    if shape[leading..] != [RGB_CHANNELS, IMAGE_SIZE, IMAGE_SIZE] {
        return Err(Error::ShapeMismatch {
            expected: format!("[{RGB_CHANNELS}, {IMAGE_SIZE}, {IMAGE_SIZE}]"),
            actual: format!("{shape:?}"),
        });
    }

    let chw = Array3::from_shape_vec(
        (RGB_CHANNELS, IMAGE_SIZE, IMAGE_SIZE),
        tensor.iter().copied().collect(),
    )
    .map_err(|err| Error::ShapeMismatch {
        expected: format!("[{RGB_CHANNELS}, {IMAGE_SIZE}, {IMAGE_SIZE}]"),
        actual: err.to_string(),
    })?;
    let hwc = chw.permuted_axes([1, 2, 0]);

    tracing::debug!("Denormalizing tensor of shape {shape:?}");

    Ok(PixelArray::from_shape_fn(hwc.raw_dim(), |(y, x, c)| {
        denormalize(hwc[[y, x, c]], normalization.mean[c], normalization.std[c])
    }))
}

/// Normalize an HWC RGB pixel array into a CHW tensor.
///
/// # Errors
///
/// Returns an error if the array does not have three channels.
pub fn normalize_pixels<S>(
    pixels: &ArrayBase<S, Ix3>,
    normalization: &Normalization,
) -> Result<ImageTensor>
where
    S: Data<Elem = u8>,
{
    normalization.validate()?;

    let (height, width, channels) = pixels.dim();
    if channels != RGB_CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: format!("[H, W, {RGB_CHANNELS}]"),
            actual: format!("{:?}", pixels.shape()),
        });
    }

    Ok(ImageTensor::from_shape_fn((channels, height, width), |(c, y, x)| {
        (f32::from(pixels[[y, x, c]]) / 255.0 - normalization.mean[c]) / normalization.std[c]
    }))
}

/// Map a normalized value back to [0, 255] with rounding and clamping.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn denormalize(value: f32, mean: f32, std: f32) -> u8 {
    // Safe: clamped to [0, 255] before casting, NaN casts to 0
    let scaled = value.mul_add(std, mean) * 255.0;
    scaled.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array, Array4};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_pixels(seed: u64) -> PixelArray {
        let mut rng = StdRng::seed_from_u64(seed);
        PixelArray::from_shape_fn((IMAGE_SIZE, IMAGE_SIZE, RGB_CHANNELS), |_| rng.gen())
    }

    #[test]
    fn test_denormalize() {
        assert_eq!(denormalize(0.0, 0.5, 0.25), 128);
        assert_eq!(denormalize(2.0, 0.5, 0.25), 255);
        assert_eq!(denormalize(-2.0, 0.5, 0.25), 0);
    }

    #[test]
    fn test_denormalize_clamp() {
        assert_eq!(denormalize(100.0, 0.485, 0.229), 255);
        assert_eq!(denormalize(-100.0, 0.485, 0.229), 0);
        assert_eq!(denormalize(f32::NAN, 0.485, 0.229), 0);
    }

    #[test]
    fn test_round_trip() {
        let norm = Normalization::default();
        let pixels = random_pixels(7);
        let tensor = normalize_pixels(&pixels, &norm).unwrap();

        let restored = convert_net(&tensor, &norm).unwrap();
        assert_eq!(restored, pixels);

        let renormalized = normalize_pixels(&restored, &norm).unwrap();
        for (a, b) in tensor.iter().zip(renormalized.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_zero_tensor_maps_to_mean() {
        let norm = Normalization::default();
        let tensor = ImageTensor::zeros((RGB_CHANNELS, IMAGE_SIZE, IMAGE_SIZE));
        let pixels = convert_net(&tensor, &norm).unwrap();

        assert_eq!(pixels.dim(), (IMAGE_SIZE, IMAGE_SIZE, RGB_CHANNELS));
        // 0.485 * 255 = 123.675, 0.456 * 255 = 116.28, 0.406 * 255 = 103.53
        assert_eq!(pixels[[0, 0, 0]], 124);
        assert_eq!(pixels[[10, 20, 1]], 116);
        assert_eq!(pixels[[223, 223, 2]], 104);
    }

    #[test]
    fn test_channel_first_to_channel_last() {
        let norm = Normalization::default();
        let mut tensor = ImageTensor::zeros((RGB_CHANNELS, IMAGE_SIZE, IMAGE_SIZE));
        tensor[[2, 1, 5]] = 10.0;

        let pixels = convert_net(&tensor, &norm).unwrap();
        assert_eq!(pixels[[1, 5, 2]], 255);
        assert_eq!(pixels[[1, 5, 0]], 124);
        assert_eq!(pixels[[5, 1, 2]], 104);
    }

    #[test]
    fn test_batched_tensor_accepted() {
        let norm = Normalization::default();
        let batch = Array4::<f32>::zeros((1, RGB_CHANNELS, IMAGE_SIZE, IMAGE_SIZE));
        let pixels = convert_net(&batch, &norm).unwrap();
        assert_eq!(pixels.dim(), (IMAGE_SIZE, IMAGE_SIZE, RGB_CHANNELS));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let norm = Normalization::default();

        let small = ImageTensor::zeros((RGB_CHANNELS, 32, 32));
        assert!(matches!(
            convert_net(&small, &norm),
            Err(Error::ShapeMismatch { .. })
        ));

        let channels_last = ImageTensor::zeros((IMAGE_SIZE, IMAGE_SIZE, RGB_CHANNELS));
        assert!(convert_net(&channels_last, &norm).is_err());

        let flat = Array::<f32, _>::zeros(RGB_CHANNELS * IMAGE_SIZE * IMAGE_SIZE);
        assert!(convert_net(&flat, &norm).is_err());
    }

    #[test]
    fn test_normalize_requires_rgb() {
        let gray = PixelArray::zeros((4, 4, 1));
        assert!(normalize_pixels(&gray, &Normalization::default()).is_err());
    }
}
