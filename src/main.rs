//! `advbox-viz` CLI - Save and compare original/adversarial image pairs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use advbox_viz::args::{
    add_arguments, add_arguments_with, argument_values, print_arguments, ArgKind,
};
use advbox_viz::image::{convert_net, load_image, Normalization};
use advbox_viz::output::DEFAULT_OUTPUT_ROOT;
use advbox_viz::report::{
    generation_image, present_figure, show_images_diff, DEFAULT_ATTACK_METHOD,
};
use advbox_viz::OutputLayout;

fn command() -> Command {
    let defaults = Normalization::default();

    let cmd = Command::new("advbox-viz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Save and compare original/adversarial image pairs")
        .arg(
            Arg::new("original")
                .long("original")
                .value_name("PATH")
                .help("Original input image.")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("adversarial")
                .long("adversarial")
                .value_name("PATH")
                .help("Adversarial image generated from the original.")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        );

    // Ids and labels may be negative, e.g. -1 for "no prediction".
    let signed = |arg: Arg| arg.allow_negative_numbers(true);
    let cmd = add_arguments_with(
        "id",
        ArgKind::Int,
        0,
        "Sample id used in file names.",
        cmd,
        signed,
    );
    let cmd = add_arguments_with(
        "original_label",
        ArgKind::Int,
        0,
        "Predicted label of the original.",
        cmd,
        signed,
    );
    let cmd = add_arguments_with(
        "adversarial_label",
        ArgKind::Int,
        0,
        "Predicted label of the adversarial image.",
        cmd,
        signed,
    );
    let cmd = add_arguments(
        "attack_method",
        ArgKind::Str,
        DEFAULT_ATTACK_METHOD,
        "Attack that produced the adversarial image.",
        cmd,
    );
    let cmd = add_arguments(
        "output",
        ArgKind::Str,
        DEFAULT_OUTPUT_ROOT,
        "Base output folder.",
        cmd,
    );
    let cmd = add_arguments(
        "mean",
        ArgKind::Str,
        join(&defaults.mean),
        "Per-channel normalization mean.",
        cmd,
    );
    let cmd = add_arguments(
        "std",
        ArgKind::Str,
        join(&defaults.std),
        "Per-channel normalization std.",
        cmd,
    );
    let cmd = add_arguments(
        "show_diff",
        ArgKind::Bool,
        true,
        "Save a side-by-side comparison figure.",
        cmd,
    );
    let cmd = add_arguments(
        "display",
        ArgKind::Bool,
        false,
        "Open the comparison figure in the default image viewer.",
        cmd,
    );
    add_arguments("verbose", ArgKind::Bool, false, "Enable verbose output.", cmd)
}

fn main() -> ExitCode {
    let matches = command().get_matches();

    // Initialize logging
    let verbose = matches.get_one::<bool>("verbose").copied().unwrap_or(false);
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("advbox_viz={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&matches) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(matches: &ArgMatches) -> Result<()> {
    print_arguments(argument_values(matches)).context("Failed to print arguments")?;

    let original_path: PathBuf = value(matches, "original")?;
    let adversarial_path: PathBuf = value(matches, "adversarial")?;
    let id: i64 = value(matches, "id")?;
    let original_label: i64 = value(matches, "original_label")?;
    let adversarial_label: i64 = value(matches, "adversarial_label")?;
    let attack_method: String = value(matches, "attack_method")?;
    let output: String = value(matches, "output")?;

    let normalization = Normalization {
        mean: parse_triplet(&value::<String>(matches, "mean")?).context("Invalid --mean")?,
        std: parse_triplet(&value::<String>(matches, "std")?).context("Invalid --std")?,
    };
    normalization.validate()?;
    let layout = OutputLayout::new(output);

    let original = load_image(&original_path, &normalization)
        .with_context(|| format!("Failed to load {}", original_path.display()))?;
    let adversarial = load_image(&adversarial_path, &normalization)
        .with_context(|| format!("Failed to load {}", adversarial_path.display()))?;

    let written = generation_image(
        &layout,
        &normalization,
        id,
        &original,
        original_label,
        &adversarial,
        adversarial_label,
        &attack_method,
    )
    .context("Failed to generate result images")?;

    println!(
        "Saved {}, {} and {}",
        written.original.display(),
        written.adversarial.display(),
        written.diff.display()
    );

    if value::<bool>(matches, "show_diff")? {
        let original_pixels = convert_net(&original, &normalization)?;
        let adversarial_pixels = convert_net(&adversarial, &normalization)?;
        let figure = show_images_diff(
            &layout,
            &original_pixels,
            original_label,
            &adversarial_pixels,
            adversarial_label,
        )
        .context("Failed to save comparison figure")?;
        println!("Saved {}", figure.display());

        if value::<bool>(matches, "display")? {
            present_figure(&figure).context("Failed to display comparison figure")?;
        }
    }

    Ok(())
}

fn value<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, name: &str) -> Result<T> {
    matches
        .get_one::<T>(name)
        .cloned()
        .with_context(|| format!("Missing --{name}"))
}

fn join(values: &[f32; 3]) -> String {
    values.map(|v| v.to_string()).join(",")
}

/// Parse `a,b,c` into three floats.
fn parse_triplet(raw: &str) -> Result<[f32; 3]> {
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("expected three comma-separated numbers, got {raw:?}"))?;

    <[f32; 3]>::try_from(parts)
        .map_err(|parts| anyhow::anyhow!("expected 3 values, got {}", parts.len()))
}
