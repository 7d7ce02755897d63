use std::io::{IsTerminal, Read};

use anyhow::Result;
use argh::FromArgs;

use crate::input;
use crate::pattern::Format;
use crate::tz;

const RFC3339_PATTERN: &str = "Y-mm-ddTHH:ii:ssz";
const RFC822_PATTERN: &str = "dd M y HH:ii Z";
const UNIX_PATTERN: &str = "D M d HH:ii:ss Z Y";

#[derive(FromArgs, PartialEq, Debug)]
/// Convert a timestamp to another format
pub(crate) struct Tsconv {
    /// output format: rfc3339, rfc822, unix, epoch, or a custom pattern
    /// (default: rfc3339)
    #[argh(option, default = "String::from(\"rfc3339\")")]
    pub out: String,

    /// display timezone: an abbreviation such as MST, or an offset such as
    /// -5 (default: the timezone of the input)
    #[argh(option, short = 'z')]
    pub timezone: Option<String>,

    /// timestamp to convert; read from stdin or defaulted to the current
    /// time when omitted
    #[argh(positional)]
    pub timestamp: Option<String>,
}

// === end of argh constructs

/// CLI entry point.
pub fn cli_main() -> Result<()> {
    let args: Tsconv = argh::from_env();
    let input = read_input(args.timestamp)?;
    println!("{}", convert(&args.out, args.timezone.as_deref(), &input)?);

    Ok(())
}

fn convert(out: &str, timezone: Option<&str>, input: &str) -> Result<String> {
    let mut t = input::parse(input)?;
    if let Some(spec) = timezone {
        t = t.to_zone(tz::resolve(spec)?);
    }

    Ok(Format::compile(output_pattern(out)).render(&t))
}

/// Map an output-format name to its pattern. Unknown names are taken to be
/// custom pattern strings.
fn output_pattern(out: &str) -> &str {
    match out.to_ascii_lowercase().as_str() {
        "rfc3339" | "3339" => RFC3339_PATTERN,
        "rfc822" | "822" => RFC822_PATTERN,
        "unix" => UNIX_PATTERN,
        "epoch" => "",
        _ => out,
    }
}

/// Pick the input string: the argument when present, otherwise piped stdin,
/// otherwise empty for the current time.
fn read_input(arg: Option<String>) -> Result<String> {
    if let Some(arg) = arg {
        return Ok(arg);
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    // a timestamp should never be more than 256 bytes
    let mut buf = String::new();
    stdin.take(256).read_to_string(&mut buf)?;

    Ok(buf.trim().to_string())
}

// tests

#[test]
fn test_output_pattern_selection() {
    assert_eq!(output_pattern("rfc3339"), RFC3339_PATTERN);
    assert_eq!(output_pattern("RFC822"), RFC822_PATTERN);
    assert_eq!(output_pattern("822"), RFC822_PATTERN);
    assert_eq!(output_pattern("unix"), UNIX_PATTERN);
    assert_eq!(output_pattern("epoch"), "");
    // anything else is a custom pattern, case preserved
    assert_eq!(output_pattern("Y-mm-dd"), "Y-mm-dd");
}

#[test]
fn test_convert_rfc822_in_mst() {
    let out = convert("rfc822", Some("MST"), "1671849943").unwrap();
    assert_eq!(out, "23 Dec 22 19:45 MST");
}

#[test]
fn test_convert_rfc3339_with_offset() {
    let out = convert("rfc3339", Some("-5"), "2022-12-24T02:47:52Z").unwrap();
    assert_eq!(out, "2022-12-23T21:47:52-05:00");
}

#[test]
fn test_convert_epoch_round_trip() {
    let out = convert("epoch", None, "2022-12-24T02:45:43Z").unwrap();
    assert_eq!(out, "1671849943");
    // epoch output is offset-independent
    let out = convert("epoch", Some("PST"), "2022-12-24T02:45:43Z").unwrap();
    assert_eq!(out, "1671849943");
}

#[test]
fn test_convert_unix_preset() {
    let out = convert("unix", None, "Sat Dec 24 02:45:43 UTC 2022").unwrap();
    assert_eq!(out, "Sat Dec 24 02:45:43 UTC 2022");
}

#[test]
fn test_convert_custom_pattern() {
    let out = convert("DD, MM d", None, "2022-12-24T02:45:43Z").unwrap();
    assert_eq!(out, "Saturday, December 24");
}

#[test]
fn test_convert_reports_bad_input() {
    assert!(convert("rfc3339", None, "yesterday-ish").is_err());
    assert!(convert("rfc3339", Some("Mars"), "1671849943").is_err());
}

#[test]
fn test_args_parse() {
    let args =
        Tsconv::from_args(&["tsconv"], &["--out", "822", "-z", "MST", "1671849943"]).unwrap();
    assert_eq!(args.out, "822");
    assert_eq!(args.timezone.as_deref(), Some("MST"));
    assert_eq!(args.timestamp.as_deref(), Some("1671849943"));
    let args = Tsconv::from_args(&["tsconv"], &[]).unwrap();
    assert_eq!(args.out, "rfc3339");
    assert_eq!(args.timestamp, None);
}
