use anyhow::{anyhow, Result};
use time::{Month, OffsetDateTime, UtcOffset, Weekday};

/// Well-known zone abbreviations and their whole-hour UTC offsets. These are
/// also the zone names accepted inside rfc822 and unix-date inputs.
const ZONES: &[(&str, i8)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("EST", -5),
    ("EDT", -4),
    ("CST", -6),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
];

/// A resolved timezone: a fixed UTC offset plus, for named zones, the
/// canonical abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub offset: UtcOffset,
    pub name: Option<&'static str>,
}

/// Resolve a timezone given as an abbreviation (`MST`) or as an offset
/// string (`-5`, `+05`, `-05:30`).
pub fn resolve(spec: &str) -> Result<Zone> {
    for &(name, hours) in ZONES {
        if spec.eq_ignore_ascii_case(name) {
            return Ok(Zone {
                offset: UtcOffset::from_hms(hours, 0, 0)?,
                name: Some(name),
            });
        }
    }

    parse_offset(spec).ok_or_else(|| anyhow!("unrecognized timezone: {}", spec))
}

/// Parse a `±HH` or `±HH:MM` offset string. The sign is mandatory.
fn parse_offset(spec: &str) -> Option<Zone> {
    let (sign, rest) = match spec.as_bytes().first()? {
        b'+' => (1, &spec[1..]),
        b'-' => (-1, &spec[1..]),
        _ => return None,
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (rest, None),
    };
    if hours.is_empty() || hours.len() > 2 {
        return None;
    }
    let hours: u8 = hours.parse().ok()?;
    let minutes: u8 = match minutes {
        Some(m) if m.len() == 2 => m.parse().ok()?,
        Some(_) => return None,
        None => 0,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    let offset = UtcOffset::from_hms(sign * hours as i8, sign * minutes as i8, 0).ok()?;
    Some(Zone { offset, name: None })
}

/// An instant paired with the timezone it should be displayed in.
#[derive(Debug, Clone, Copy)]
pub struct ZonedTime {
    time: OffsetDateTime,
    name: Option<&'static str>,
}

impl ZonedTime {
    pub fn new(time: OffsetDateTime, name: Option<&'static str>) -> ZonedTime {
        ZonedTime { time, name }
    }

    /// Re-express the same instant in the given zone.
    pub fn to_zone(&self, zone: Zone) -> ZonedTime {
        ZonedTime {
            time: self.time.to_offset(zone.offset),
            name: zone.name,
        }
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.time.year()
    }

    #[inline]
    pub fn month(&self) -> Month {
        self.time.month()
    }

    #[inline]
    pub fn day(&self) -> u8 {
        self.time.day()
    }

    #[inline]
    pub fn weekday(&self) -> Weekday {
        self.time.weekday()
    }

    #[inline]
    pub fn hour(&self) -> u8 {
        self.time.hour()
    }

    #[inline]
    pub fn minute(&self) -> u8 {
        self.time.minute()
    }

    #[inline]
    pub fn second(&self) -> u8 {
        self.time.second()
    }

    #[inline]
    pub fn offset_seconds(&self) -> i32 {
        self.time.offset().whole_seconds()
    }

    #[inline]
    pub fn zone_name(&self) -> Option<&'static str> {
        self.name
    }

    #[inline]
    pub fn unix_timestamp(&self) -> i64 {
        self.time.unix_timestamp()
    }
}

// tests

#[test]
fn test_resolve_abbreviation() {
    let zone = resolve("MST").unwrap();
    assert_eq!(zone.offset.whole_hours(), -7);
    assert_eq!(zone.name, Some("MST"));
    // abbreviations match case-insensitively but keep canonical spelling
    assert_eq!(resolve("utc").unwrap().name, Some("UTC"));
    assert_eq!(resolve("pdt").unwrap().offset.whole_hours(), -7);
}

#[test]
fn test_resolve_offset_string() {
    assert_eq!(resolve("-5").unwrap().offset.whole_hours(), -5);
    assert_eq!(resolve("+05").unwrap().offset.whole_hours(), 5);
    let zone = resolve("-05:30").unwrap();
    assert_eq!(zone.offset.whole_seconds(), -(5 * 3600 + 30 * 60));
    assert_eq!(zone.name, None);
}

#[test]
fn test_resolve_rejects_garbage() {
    assert!(resolve("").is_err());
    assert!(resolve("Mars").is_err());
    assert!(resolve("5").is_err());
    assert!(resolve("+24").is_err());
    assert!(resolve("+1:5").is_err());
    assert!(resolve("--5").is_err());
}

#[test]
fn test_to_zone_preserves_instant() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-12-24 02:45:43 UTC), Some("UTC"));
    let shifted = t.to_zone(resolve("MST").unwrap());
    assert_eq!(shifted.unix_timestamp(), t.unix_timestamp());
    assert_eq!(shifted.day(), 23);
    assert_eq!(shifted.hour(), 19);
    assert_eq!(shifted.zone_name(), Some("MST"));
}
