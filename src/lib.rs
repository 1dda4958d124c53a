//! # `advbox-viz`
//!
//! Helpers around adversarial-example image classification demos: command-line
//! argument registration and printing, output folder bookkeeping, conversion of
//! normalized model inputs back to pixels, and images that compare an original
//! with its adversarial counterpart.
//!
//! ## Example
//!
//! ```no_run
//! use advbox_viz::image::{load_image, Normalization};
//! use advbox_viz::report::generation_image;
//! use advbox_viz::OutputLayout;
//!
//! # fn main() -> advbox_viz::Result<()> {
//! let norm = Normalization::default();
//! let layout = OutputLayout::default();
//!
//! let original = load_image("cat.png", &norm)?;
//! let adversarial = load_image("cat_adv.png", &norm)?;
//!
//! generation_image(&layout, &norm, 0, &original, 281, &adversarial, 285, "FGSM")?;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod error;
pub mod image;
pub mod output;
pub mod report;

pub use error::{Error, Result};
pub use output::OutputLayout;
