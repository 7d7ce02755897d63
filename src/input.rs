use std::convert::TryFrom;

use anyhow::{anyhow, Result};
use time::format_description::well_known::Rfc3339;
use time::parsing::Parsed;
use time::{format_description::FormatItem, macros::format_description};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::tz::{self, Zone, ZonedTime};

// `24 Dec 22 02:45 UTC`; the zone token is split off and resolved separately
const RFC822: &[FormatItem] =
    format_description!("[day] [month repr:short] [year repr:last_two] [hour]:[minute]");

// `Sat Dec 24 02:45:43 UTC 2022`, likewise without the zone token
const UNIX_DATE: &[FormatItem] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:none] [hour]:[minute]:[second] [year]"
);

/// Parse a timestamp in any of the supported input formats: rfc3339, rfc822,
/// unix date, or a raw epoch-second integer, tried in that order. An empty
/// input means the current time.
pub fn parse(s: &str) -> Result<ZonedTime> {
    if s.is_empty() {
        return Ok(ZonedTime::new(OffsetDateTime::now_utc(), Some("UTC")));
    }

    let known = parse_rfc3339(s)
        .or_else(|| parse_rfc822(s))
        .or_else(|| parse_unix_date(s));
    if let Some(t) = known {
        return Ok(t);
    }

    if let Ok(epoch) = s.parse::<i64>() {
        return Ok(ZonedTime::new(
            OffsetDateTime::from_unix_timestamp(epoch)?,
            Some("UTC"),
        ));
    }

    Err(anyhow!("unable to parse input: {}", s))
}

fn parse_rfc3339(s: &str) -> Option<ZonedTime> {
    let t = OffsetDateTime::parse(s, &Rfc3339).ok()?;
    Some(ZonedTime::new(t, None))
}

fn parse_rfc822(s: &str) -> Option<ZonedTime> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    if tokens.len() != 5 {
        return None;
    }
    let zone = tz::resolve(tokens[4]).ok()?;

    let joined = tokens[..4].join(" ");
    let mut parsed = Parsed::new();
    let rest = parsed.parse_items(joined.as_bytes(), RFC822).ok()?;
    if !rest.is_empty() {
        return None;
    }
    let year = full_year(parsed.year_last_two()?);
    parsed.set_year(year)?;

    assume_zone(parsed, zone)
}

fn parse_unix_date(s: &str) -> Option<ZonedTime> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    if tokens.len() != 6 {
        return None;
    }
    let zone = tz::resolve(tokens[4]).ok()?;

    // reorder to weekday month day time year; rejoining also collapses the
    // double space a space-padded single-digit day leaves behind
    let joined = [tokens[0], tokens[1], tokens[2], tokens[3], tokens[5]].join(" ");
    let mut parsed = Parsed::new();
    let rest = parsed.parse_items(joined.as_bytes(), UNIX_DATE).ok()?;
    if !rest.is_empty() {
        return None;
    }

    assume_zone(parsed, zone)
}

fn assume_zone(parsed: Parsed, zone: Zone) -> Option<ZonedTime> {
    let dt = PrimitiveDateTime::try_from(parsed).ok()?;
    Some(ZonedTime::new(dt.assume_offset(zone.offset), zone.name))
}

/// Resolve a two-digit year: `[00,70)` is the 2000s, `[70,99]` the 1900s.
#[inline]
fn full_year(modulo: u8) -> i32 {
    if modulo >= 70 {
        1900 + i32::from(modulo)
    } else {
        2000 + i32::from(modulo)
    }
}

// tests

#[test]
fn test_parse_epoch() {
    let t = parse("1671849943").unwrap();
    assert_eq!(t.unix_timestamp(), 1671849943);
    assert_eq!(t.zone_name(), Some("UTC"));
    assert_eq!(parse("-86400").unwrap().unix_timestamp(), -86400);
}

#[test]
fn test_parse_rfc3339_input() {
    let t = parse("2022-12-24T02:45:43Z").unwrap();
    assert_eq!(t.unix_timestamp(), 1671849943);
    let t = parse("2022-12-23T21:45:43-05:00").unwrap();
    assert_eq!(t.unix_timestamp(), 1671849943);
    assert_eq!(t.offset_seconds(), -5 * 3600);
    assert_eq!(t.zone_name(), None);
}

#[test]
fn test_parse_rfc822_input() {
    let t = parse("24 Dec 22 02:45 UTC").unwrap();
    assert_eq!(t.unix_timestamp(), 1671849900);
    assert_eq!(t.zone_name(), Some("UTC"));
    // the zone shifts the instant
    let t = parse("23 Dec 22 19:45 MST").unwrap();
    assert_eq!(t.unix_timestamp(), 1671849900);
    assert_eq!(t.zone_name(), Some("MST"));
}

#[test]
fn test_parse_unix_date_input() {
    let t = parse("Sat Dec 24 02:45:43 UTC 2022").unwrap();
    assert_eq!(t.unix_timestamp(), 1671849943);
    assert_eq!(t.zone_name(), Some("UTC"));
    // single-digit days arrive space-padded
    let t = parse("Thu Dec  1 08:00:00 UTC 2022").unwrap();
    assert_eq!(t.day(), 1);
}

#[test]
fn test_two_digit_year_century() {
    assert_eq!(parse("01 Jan 70 00:00 UTC").unwrap().unix_timestamp(), 0);
    let t = parse("01 Jan 69 00:00 UTC").unwrap();
    assert_eq!(t.year(), 2069);
    let t = parse("01 Jan 99 00:00 UTC").unwrap();
    assert_eq!(t.year(), 1999);
}

#[test]
fn test_parse_rejects_unknown() {
    assert!(parse("not a timestamp").is_err());
    assert!(parse("12:30").is_err());
    assert!(parse("24 Dec 22 02:45 XYZ").is_err());
    assert!(parse("1671849943.5").is_err());
}
