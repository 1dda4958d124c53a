//! Command-line argument registration and printing.
//!
//! Options are registered one at a time on a [`clap::Command`], each with a
//! type, a default, and a help line that ends with the default value.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{self, Write};

use clap::builder::BoolishValueParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

/// First line of an argument dump.
pub const HEADER: &str = "-----------  Configuration Arguments -----------";

/// Last line of an argument dump.
pub const FOOTER: &str = "------------------------------------------------";

/// Value type of a registered option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// `y/yes/t/true/on/1` or `n/no/f/false/off/0`, case-insensitive.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Any string.
    Str,
}

/// Write `name: value` lines sorted by name, between [`HEADER`] and [`FOOTER`].
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_arguments<W, I, K, V>(out: &mut W, args: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    let mut entries: Vec<(String, String)> = args
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    entries.sort();

    writeln!(out, "{HEADER}")?;
    for (name, value) in &entries {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out, "{FOOTER}")
}

/// Print arguments to stdout, see [`write_arguments`].
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn print_arguments<I, K, V>(args: I) -> io::Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    write_arguments(&mut io::stdout().lock(), args)
}

/// Register `--name` on `command`.
///
/// The help text gets ` Default: {default}.` appended.
#[must_use]
pub fn add_arguments(
    name: &str,
    kind: ArgKind,
    default: impl Display,
    help: &str,
    command: Command,
) -> Command {
    add_arguments_with(name, kind, default, help, command, |arg| arg)
}

/// Register `--name` on `command`, letting `customize` adjust the option.
#[must_use]
pub fn add_arguments_with<F>(
    name: &str,
    kind: ArgKind,
    default: impl Display,
    help: &str,
    command: Command,
    customize: F,
) -> Command
where
    F: FnOnce(Arg) -> Arg,
{
    let default = default.to_string();
    let arg = Arg::new(name.to_string())
        .long(name.to_string())
        .action(ArgAction::Set)
        .help(format!("{help} Default: {default}."))
        .default_value(default);

    let arg = match kind {
        ArgKind::Bool => arg.value_parser(BoolishValueParser::new()),
        ArgKind::Int => arg.value_parser(value_parser!(i64)),
        ArgKind::Float => arg.value_parser(value_parser!(f64)),
        ArgKind::Str => arg.value_parser(value_parser!(String)),
    };

    command.arg(customize(arg))
}

/// Raw values of every matched option, defaults included.
///
/// Multiple values are joined with `,`.
#[must_use]
pub fn argument_values(matches: &ArgMatches) -> BTreeMap<String, String> {
    matches
        .ids()
        .filter_map(|id| {
            let raw = matches.try_get_raw(id.as_str()).ok().flatten()?;
            let value = raw
                .map(|v| v.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(",");
            Some((id.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_command() -> Command {
        let cmd = Command::new("demo");
        let cmd = add_arguments("use_gpu", ArgKind::Bool, true, "Whether to use GPU.", cmd);
        let cmd = add_arguments("batch_size", ArgKind::Int, 32, "Mini-batch size.", cmd);
        let cmd = add_arguments("epsilon", ArgKind::Float, 0.3, "Perturbation bound.", cmd);
        add_arguments("model", ArgKind::Str, "resnet50", "Model name.", cmd)
    }

    fn dump<I, K, V>(args: I) -> Vec<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Display,
    {
        let mut out = Vec::new();
        write_arguments(&mut out, args).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_sorted_output() {
        let lines = dump([("zeta", 1), ("alpha", 2), ("mid", 3)]);

        assert_eq!(lines, vec![HEADER, "alpha: 2", "mid: 3", "zeta: 1", FOOTER]);
    }

    #[test]
    fn test_sorted_regardless_of_order() {
        let forward = dump([("a", "x"), ("b", "y"), ("c", "z")]);
        let backward = dump([("c", "z"), ("b", "y"), ("a", "x")]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_dump() {
        assert_eq!(dump(Vec::<(String, String)>::new()), vec![HEADER, FOOTER]);
    }

    #[test]
    fn test_defaults() {
        let matches = demo_command().try_get_matches_from(["demo"]).unwrap();

        assert_eq!(matches.get_one::<bool>("use_gpu"), Some(&true));
        assert_eq!(matches.get_one::<i64>("batch_size"), Some(&32));
        assert_eq!(matches.get_one::<f64>("epsilon"), Some(&0.3));
        assert_eq!(
            matches.get_one::<String>("model").map(String::as_str),
            Some("resnet50")
        );
    }

    #[test]
    fn test_boolish_values() {
        let cases = [
            ("False", false),
            ("no", false),
            ("0", false),
            ("yes", true),
            ("T", true),
            ("on", true),
        ];
        for (raw, expected) in cases {
            let matches = demo_command()
                .try_get_matches_from(["demo", "--use_gpu", raw])
                .unwrap();
            assert_eq!(matches.get_one::<bool>("use_gpu"), Some(&expected), "{raw}");
        }

        assert!(demo_command()
            .try_get_matches_from(["demo", "--use_gpu", "maybe"])
            .is_err());
    }

    #[test]
    fn test_typed_values_rejected() {
        assert!(demo_command()
            .try_get_matches_from(["demo", "--batch_size", "many"])
            .is_err());
        assert!(demo_command()
            .try_get_matches_from(["demo", "--epsilon", "big"])
            .is_err());
    }

    #[test]
    fn test_help_mentions_default() {
        let cmd = demo_command();
        let help = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "batch_size")
            .and_then(Arg::get_help)
            .map(ToString::to_string);

        assert_eq!(help.as_deref(), Some("Mini-batch size. Default: 32."));
    }

    #[test]
    fn test_customize() {
        let cmd = add_arguments_with(
            "target",
            ArgKind::Int,
            -1,
            "Target class.",
            Command::new("demo"),
            |arg| arg.short('t').allow_negative_numbers(true),
        );

        let matches = cmd.try_get_matches_from(["demo", "-t", "-5"]).unwrap();
        assert_eq!(matches.get_one::<i64>("target"), Some(&-5));
    }

    #[test]
    fn test_argument_values() {
        let matches = demo_command()
            .try_get_matches_from(["demo", "--model", "vgg16", "--use_gpu", "no"])
            .unwrap();
        let values = argument_values(&matches);

        assert_eq!(values.get("model").map(String::as_str), Some("vgg16"));
        assert_eq!(values.get("use_gpu").map(String::as_str), Some("no"));
        assert_eq!(values.get("batch_size").map(String::as_str), Some("32"));

        let lines = dump(&values);
        assert_eq!(
            lines,
            vec![
                HEADER,
                "batch_size: 32",
                "epsilon: 0.3",
                "model: vgg16",
                "use_gpu: no",
                FOOTER
            ]
        );
    }
}
