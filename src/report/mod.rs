//! Result images for original/adversarial pairs.

mod diff;
mod generation;
mod present;

pub use diff::{
    compare_images, compose_figure, normalize_difference, show_images_diff, DiffMetrics,
    DiffReport, PANEL_TITLES,
};
pub use generation::{generation_image, GeneratedImages, DEFAULT_ATTACK_METHOD, IMAGENET};
pub use present::present_figure;
