//! Image conversion, loading, and saving utilities.

mod convert;
mod load;
mod save;

pub use convert::{convert_net, normalize_pixels};
pub use load::{load_image, load_pixels};
pub use save::save_image;

use ndarray::Array3;

use crate::error::{Error, Result};

/// Image tensor in CHW format (channels, height, width), normalized per channel.
pub type ImageTensor = Array3<f32>;

/// Pixel array in HWC format (height, width, channels) with values in [0, 255].
pub type PixelArray = Array3<u8>;

/// Input resolution of the classifiers the demo attacks.
pub const IMAGE_SIZE: usize = 224;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// Per-channel normalization applied before a model sees an image.
///
/// A normalized value is `(pixel / 255 - mean[c]) / std[c]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Per-channel mean in [0, 1] units.
    pub mean: [f32; RGB_CHANNELS],

    /// Per-channel standard deviation in [0, 1] units.
    pub std: [f32; RGB_CHANNELS],
}

impl Default for Normalization {
    /// ImageNet statistics.
    fn default() -> Self {
        Self {
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

impl Normalization {
    /// Validate the statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is not finite or a deviation is not positive.
    pub fn validate(&self) -> Result<()> {
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "mean".to_string(),
                reason: "must be finite".to_string(),
            });
        }

        if self.std.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(Error::InvalidParameter {
                name: "std".to_string(),
                reason: "must be finite and greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
