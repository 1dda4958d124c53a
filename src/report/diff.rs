//! Side-by-side comparison of an original and an adversarial image.

use std::fmt;
use std::path::PathBuf;

use image::{ImageFormat, RgbImage};
use ndarray::{Array, Array3, ArrayBase, Data, Dimension, Ix3, Zip};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{Error, Result};
use crate::output::OutputLayout;

/// Titles of the three figure panels, left to right.
pub const PANEL_TITLES: [&str; 3] = ["Original", "Adversarial", "Adversarial-Original"];

/// Space around each image inside its panel, in pixels.
const MARGIN: u32 = 8;

/// Height of the title strip above each panel, in pixels.
const TITLE_HEIGHT: u32 = 24;

const TITLE_FONT_SIZE: f64 = 16.0;

const FRAME: RGBColor = RGBColor(160, 160, 160);

/// `strftime` format of the figure timestamp.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Perturbation size between two images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffMetrics {
    /// Number of non-zero elements of the difference.
    pub l0: usize,
    /// Euclidean norm of the difference.
    pub l2: f64,
}

impl DiffMetrics {
    /// Measure a difference array.
    pub fn of<S, D>(difference: &ArrayBase<S, D>) -> Self
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        let l0 = difference.iter().filter(|&&v| v != 0.0).count();
        let l2 = difference
            .iter()
            .map(|&v| f64::from(v).powi(2))
            .sum::<f64>()
            .sqrt();
        Self { l0, l2 }
    }
}

impl fmt::Display for DiffMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l0={} l2={:?}", self.l0, self.l2)
    }
}

/// Everything computed when comparing two images.
#[derive(Debug, Clone)]
pub struct DiffReport {
    /// L0/L2 size of `difference`.
    pub metrics: DiffMetrics,
    /// `adversarial - original`, HWC.
    pub difference: Array3<f32>,
    /// Difference mapped into [0, 1], see [`normalize_difference`].
    pub normalized: Array3<f32>,
    /// Three-panel figure: original, adversarial, normalized difference.
    pub figure: RgbImage,
}

/// Compare two HWC pixel arrays of the same shape.
///
/// This does no I/O; [`show_images_diff`] is the variant that prints and saves.
///
/// # Errors
///
/// Returns an error if the shapes differ or the channel count is not 1 or 3.
pub fn compare_images<S1, S2>(
    original: &ArrayBase<S1, Ix3>,
    adversarial: &ArrayBase<S2, Ix3>,
) -> Result<DiffReport>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
{
    check_same_shape(original.shape(), adversarial.shape())?;

    let difference = Zip::from(adversarial)
        .and(original)
        .map_collect(|&adv, &orig| f32::from(adv) - f32::from(orig));
    let metrics = DiffMetrics::of(&difference);
    let normalized = normalize_difference(&difference);
    let figure = compose_figure(original, adversarial, &normalized)?;

    Ok(DiffReport {
        metrics,
        difference,
        normalized,
        figure,
    })
}

/// Map a signed difference from [-max, max] into [0, 1].
///
/// Each value becomes `v / max|v| / 2 + 0.5`. An all-zero difference maps to
/// 0.5 everywhere.
pub fn normalize_difference<S, D>(difference: &ArrayBase<S, D>) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let max = difference.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()));
    if max == 0.0 {
        return Array::from_elem(difference.raw_dim(), 0.5);
    }
    difference.mapv(|v| v / max / 2.0 + 0.5)
}

/// Lay out original, adversarial, and normalized difference side by side.
///
/// Each panel sits under its title (see [`PANEL_TITLES`]) inside a thin frame.
/// Grayscale inputs are drawn as gray RGB. Titles are skipped with a warning
/// when no font is available; the panels are drawn either way.
///
/// # Errors
///
/// Returns an error if the shapes differ, the channel count is not 1 or 3, or
/// the figure cannot be drawn.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub fn compose_figure<S1, S2, S3>(
    original: &ArrayBase<S1, Ix3>,
    adversarial: &ArrayBase<S2, Ix3>,
    normalized: &ArrayBase<S3, Ix3>,
) -> Result<RgbImage>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
    S3: Data<Elem = f32>,
{
    check_same_shape(original.shape(), adversarial.shape())?;
    check_same_shape(original.shape(), normalized.shape())?;

    let (height, width, channels) = original.dim();
    if channels != 1 && channels != 3 {
        return Err(Error::UnsupportedChannels { channels });
    }
    let (panel_width, figure_width, figure_height) =
        figure_size(width, height).ok_or_else(|| Error::ShapeMismatch {
            expected: "panel that fits in a figure".to_string(),
            actual: format!("{:?}", original.shape()),
        })?;

    let panels: [&dyn Fn(usize, usize, usize) -> u8; 3] = [
        &|y: usize, x: usize, c: usize| original[[y, x, c]],
        &|y: usize, x: usize, c: usize| adversarial[[y, x, c]],
        // Safe: clamped to [0, 255] before casting
        &|y: usize, x: usize, c: usize| {
            (normalized[[y, x, c]] * 255.0).round().clamp(0.0, 255.0) as u8
        },
    ];

    let mut buffer = vec![0_u8; figure_width as usize * figure_height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (figure_width, figure_height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(figure_error)?;

        let title_style = ("sans-serif", TITLE_FONT_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));

        let areas = root.split_evenly((1, 3));
        for ((area, title), panel) in areas.iter().zip(PANEL_TITLES).zip(panels) {
            let (title_area, body) = area.split_vertically(TITLE_HEIGHT as i32);

            let anchor = (panel_width as i32 / 2, TITLE_HEIGHT as i32 / 2);
            if let Err(err) = title_area.draw_text(title, &title_style, anchor) {
                tracing::warn!("Skipping panel title {title:?}: {err}");
            }

            let margin = MARGIN as i32;
            for y in 0..height {
                for x in 0..width {
                    let color = if channels == 1 {
                        let v = panel(y, x, 0);
                        RGBColor(v, v, v)
                    } else {
                        RGBColor(panel(y, x, 0), panel(y, x, 1), panel(y, x, 2))
                    };
                    body.draw_pixel((margin + x as i32, margin + y as i32), &color)
                        .map_err(figure_error)?;
                }
            }

            if width > 0 && height > 0 {
                let frame = Rectangle::new(
                    [
                        (margin - 1, margin - 1),
                        (margin + width as i32, margin + height as i32),
                    ],
                    FRAME.stroke_width(1),
                );
                body.draw(&frame).map_err(figure_error)?;
            }
        }

        root.present().map_err(figure_error)?;
    }

    RgbImage::from_raw(figure_width, figure_height, buffer).ok_or_else(|| Error::Figure {
        reason: "figure buffer does not match its dimensions".to_string(),
    })
}

/// Panel width, figure width and figure height for `width` x `height` images.
fn figure_size(width: usize, height: usize) -> Option<(u32, u32, u32)> {
    let panel_width = u32::try_from(width).ok()?.checked_add(2 * MARGIN)?;
    let figure_width = panel_width.checked_mul(3)?;
    let figure_height = u32::try_from(height)
        .ok()?
        .checked_add(TITLE_HEIGHT + 2 * MARGIN)?;
    // Each of the three panels and their frames must stay addressable as i32.
    i32::try_from(figure_width).ok()?;
    i32::try_from(figure_height).ok()?;
    Some((panel_width, figure_width, figure_height))
}

fn figure_error(err: impl fmt::Display) -> Error {
    Error::Figure {
        reason: err.to_string(),
    }
}

/// Compare two images, print their L0/L2 distance, and save the comparison figure.
///
/// The figure goes to `root/orig_adv_diff_{adversarial_label}_{YYYY-MM-DD HH:MM:SS}.png`.
///
/// # Errors
///
/// Returns an error if the images cannot be compared or the figure cannot be saved.
pub fn show_images_diff<S1, S2>(
    layout: &OutputLayout,
    original: &ArrayBase<S1, Ix3>,
    original_label: i64,
    adversarial: &ArrayBase<S2, Ix3>,
    adversarial_label: i64,
) -> Result<PathBuf>
where
    S1: Data<Elem = u8>,
    S2: Data<Elem = u8>,
{
    let report = compare_images(original, adversarial)?;
    println!("{}", report.metrics);

    layout.check_root()?;
    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    let path = layout.figure_path(adversarial_label, &timestamp);

    report
        .figure
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|source| Error::ImageSave {
            path: path.clone(),
            source,
        })?;

    tracing::info!(
        "Compared label {original_label} with {adversarial_label}: {}, figure at {}",
        report.metrics,
        path.display()
    );

    Ok(path)
}

fn check_same_shape(expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}
