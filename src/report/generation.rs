//! Saving the original, adversarial, and difference images of one sample.

use std::path::PathBuf;

use ndarray::{ArrayBase, Data, Dimension, Zip};

use crate::error::Result;
use crate::image::{convert_net, save_image, Normalization, PixelArray};
use crate::output::OutputLayout;

/// Output category for ImageNet samples.
pub const IMAGENET: &str = "imagenet";

/// Attack method name used when the caller has none.
pub const DEFAULT_ATTACK_METHOD: &str = "FGSM";

/// Line printed after each generated sample.
const SEPARATOR: &str = "--------------------------------------------------";

/// Paths written by [`generation_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImages {
    /// Denormalized original image.
    pub original: PathBuf,
    /// Denormalized adversarial image.
    pub adversarial: PathBuf,
    /// Absolute difference of the two.
    pub diff: PathBuf,
}

/// Denormalize an original/adversarial tensor pair and save both plus their difference.
///
/// Files land in the `imagenet` category of `layout`:
/// `{id}_original-{label}-by-{method}.png`, `{id}_adversary-{label}-by-{method}.png`
/// and `{id}_diff-x-by-{method}.png`. The difference is the per-element absolute
/// difference of the two denormalized pixel arrays.
///
/// # Errors
///
/// Returns an error if a tensor has the wrong shape, the output directory
/// cannot be created, or an image cannot be written.
#[allow(clippy::too_many_arguments)]
pub fn generation_image<S1, D1, S2, D2>(
    layout: &OutputLayout,
    normalization: &Normalization,
    id: i64,
    original: &ArrayBase<S1, D1>,
    original_label: i64,
    adversarial: &ArrayBase<S2, D2>,
    adversarial_label: i64,
    attack_method: &str,
) -> Result<GeneratedImages>
where
    S1: Data<Elem = f32>,
    D1: Dimension,
    S2: Data<Elem = f32>,
    D2: Dimension,
{
    layout.check_output_directory(IMAGENET)?;

    let paths = GeneratedImages {
        original: layout.original_path(IMAGENET, id, original_label, attack_method),
        adversarial: layout.adversary_path(IMAGENET, id, adversarial_label, attack_method),
        diff: layout.diff_path(IMAGENET, id, attack_method),
    };

    let original_pixels = convert_net(original, normalization)?;
    let adversarial_pixels = convert_net(adversarial, normalization)?;
    let diff_pixels = abs_diff(&original_pixels, &adversarial_pixels);

    save_image(&original_pixels, &paths.original)?;
    save_image(&adversarial_pixels, &paths.adversarial)?;
    save_image(&diff_pixels, &paths.diff)?;

    tracing::info!(
        "Sample {id}: label {original_label} -> {adversarial_label} by {attack_method}, saved {}",
        paths.diff.display()
    );
    println!("{SEPARATOR}");

    Ok(paths)
}

/// Per-element `|a - b|` without wrap-around.
fn abs_diff(a: &PixelArray, b: &PixelArray) -> PixelArray {
    Zip::from(a).and(b).map_collect(|&x, &y| x.abs_diff(y))
}
