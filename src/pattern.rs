//! Output format pattern compiler and renderer

use crate::tz::ZonedTime;

const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const SHORT_DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A calendar, clock or timezone field extracted from a time value.
#[derive(Debug, Clone, Copy)]
enum Field {
    LongYear,
    ShortYear,
    LongMonthName,
    ShortMonthName,
    NumericMonth,
    LongWeekdayName,
    ShortWeekdayName,
    NumericDay,
    Hour24,
    Hour12,
    Minute,
    Second,
    TzOffset,
    TzName,
}

impl Field {
    fn eval(self, t: &ZonedTime) -> String {
        match self {
            Field::LongYear => t.year().to_string(),
            Field::ShortYear => last_n(&t.year().to_string(), 2).to_string(),
            Field::LongMonthName => t.month().to_string(),
            Field::ShortMonthName => SHORT_MONTHS[t.month() as usize - 1].to_string(),
            Field::NumericMonth => (t.month() as u8).to_string(),
            Field::LongWeekdayName => t.weekday().to_string(),
            Field::ShortWeekdayName => {
                SHORT_DAYS[t.weekday().number_days_from_sunday() as usize].to_string()
            }
            Field::NumericDay => t.day().to_string(),
            Field::Hour24 => t.hour().to_string(),
            // 12-hour clock without midnight/noon normalization, range 0-11
            Field::Hour12 => (t.hour() % 12).to_string(),
            Field::Minute => t.minute().to_string(),
            Field::Second => t.second().to_string(),
            Field::TzOffset => {
                let offset = t.offset_seconds();
                let sign = if offset < 0 { '-' } else { '+' };
                // minutes of the offset are never emitted
                format!("{}{:02}:00", sign, offset.abs() / 3600)
            }
            Field::TzName => t.zone_name().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug)]
enum Chunk {
    Lit(String),
    Slot { padded: bool },
}

/// A compiled output pattern. Immutable once built and reusable across any
/// number of renders.
#[derive(Debug)]
pub struct Format {
    template: Vec<Chunk>,
    fields: Vec<Field>,
}

impl Format {
    /// Compile a pattern string into a reusable format.
    ///
    /// Every input compiles: unrecognized characters pass through as
    /// literals, and `\` escapes the character after it. The empty pattern
    /// renders as epoch seconds.
    pub fn compile(pattern: &str) -> Format {
        let mut template = Vec::new();
        let mut fields = Vec::new();
        let mut chars = pattern.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == '\\' {
                // a trailing backslash stands for itself
                push_literal(&mut template, chars.next().unwrap_or('\\'));
                continue;
            }
            match directive(ch, chars.peek().copied()) {
                Some((field, consumed, padded)) => {
                    if consumed == 2 {
                        chars.next();
                    }
                    template.push(Chunk::Slot { padded });
                    fields.push(field);
                }
                None => push_literal(&mut template, ch),
            }
        }

        Format { template, fields }
    }

    /// Render a time value through the compiled pattern.
    pub fn render(&self, t: &ZonedTime) -> String {
        if self.template.is_empty() {
            return t.unix_timestamp().to_string();
        }

        let mut out = String::new();
        let mut fields = self.fields.iter();
        for chunk in &self.template {
            match chunk {
                Chunk::Lit(lit) => out.push_str(lit),
                Chunk::Slot { padded } => {
                    let val = fields.next().map_or_else(String::new, |f| f.eval(t));
                    if *padded {
                        out.push_str(&format!("{:0>2}", val));
                    } else {
                        out.push_str(&val);
                    }
                }
            }
        }

        out
    }
}

/// Decide whether `ch` starts a directive given one character of lookahead,
/// and if so which field it selects, how many characters it consumes and
/// whether its slot is zero-filled to two digits.
fn directive(ch: char, peek: Option<char>) -> Option<(Field, usize, bool)> {
    let doubled = peek == Some(ch);
    Some(match ch {
        'Y' => (Field::LongYear, 1, false),
        'y' => (Field::ShortYear, 1, false),
        'M' if doubled => (Field::LongMonthName, 2, false),
        'M' => (Field::ShortMonthName, 1, false),
        'm' if doubled => (Field::NumericMonth, 2, true),
        'm' => (Field::NumericMonth, 1, false),
        'D' if doubled => (Field::LongWeekdayName, 2, false),
        'D' => (Field::ShortWeekdayName, 1, false),
        'd' if doubled => (Field::NumericDay, 2, true),
        'd' => (Field::NumericDay, 1, false),
        'H' if doubled => (Field::Hour24, 2, true),
        'H' => (Field::Hour24, 1, false),
        'h' if doubled => (Field::Hour12, 2, true),
        'h' => (Field::Hour12, 1, false),
        'i' if doubled => (Field::Minute, 2, true),
        'i' => (Field::Minute, 1, false),
        's' if doubled => (Field::Second, 2, true),
        's' => (Field::Second, 1, false),
        'z' => (Field::TzOffset, 1, false),
        'Z' => (Field::TzName, 1, false),
        _ => return None,
    })
}

fn push_literal(template: &mut Vec<Chunk>, ch: char) {
    if let Some(Chunk::Lit(lit)) = template.last_mut() {
        lit.push(ch);
    } else {
        template.push(Chunk::Lit(ch.to_string()));
    }
}

/// The last `n` characters of the decimal string, textually. Shorter input
/// is returned whole.
fn last_n(s: &str, n: usize) -> &str {
    &s[s.len().saturating_sub(n)..]
}

// tests

#[test]
fn test_epoch_sentinel() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-12-24 02:45:43 UTC), Some("UTC"));
    assert_eq!(Format::compile("").render(&t), "1671849943");
}

#[test]
fn test_rfc3339_pattern() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-12-23 21:47:52 -5), None);
    assert_eq!(
        Format::compile("Y-mm-ddTHH:ii:ssz").render(&t),
        "2022-12-23T21:47:52-05:00"
    );
}

#[test]
fn test_rfc822_pattern() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-12-23 19:45:43 -7), Some("MST"));
    assert_eq!(
        Format::compile("dd M y HH:ii Z").render(&t),
        "23 Dec 22 19:45 MST"
    );
}

#[test]
fn test_padding_changes_width_only() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-01-05 07:08:09 UTC), Some("UTC"));
    assert_eq!(Format::compile("H").render(&t), "7");
    assert_eq!(Format::compile("HH").render(&t), "07");
    assert_eq!(Format::compile("m/d").render(&t), "1/5");
    assert_eq!(Format::compile("mm/dd").render(&t), "01/05");
    assert_eq!(Format::compile("ii:ss").render(&t), "08:09");
}

#[test]
fn test_escaped_literal() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-12-24 02:45:43 UTC), Some("UTC"));
    assert_eq!(Format::compile("\\Y").render(&t), "Y");
    assert_eq!(Format::compile("\\Y=Y").render(&t), "Y=2022");
    // a lone trailing backslash is a literal backslash, not the epoch form
    assert_eq!(Format::compile("\\").render(&t), "\\");
}

#[test]
fn test_unrecognized_pass_through() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-12-24 02:45:43 UTC), Some("UTC"));
    assert_eq!(Format::compile("Y#Y").render(&t), "2022#2022");
    assert_eq!(Format::compile("année Y").render(&t), "année 2022");
}

#[test]
fn test_trailing_directive_is_short_form() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-12-24 02:45:43 UTC), Some("UTC"));
    assert_eq!(Format::compile("s").render(&t), "43");
    assert_eq!(Format::compile("m").render(&t), "12");
    assert_eq!(Format::compile("H").render(&t), "2");
}

#[test]
fn test_hour12_keeps_zero() {
    use time::macros::datetime;
    let midnight = ZonedTime::new(datetime!(2022-12-24 00:15:00 UTC), Some("UTC"));
    let noon = ZonedTime::new(datetime!(2022-12-24 12:15:00 UTC), Some("UTC"));
    let evening = ZonedTime::new(datetime!(2022-12-24 13:15:00 UTC), Some("UTC"));
    assert_eq!(Format::compile("h").render(&midnight), "0");
    assert_eq!(Format::compile("h").render(&noon), "0");
    assert_eq!(Format::compile("hh").render(&midnight), "00");
    assert_eq!(Format::compile("h").render(&evening), "1");
}

#[test]
fn test_name_tables() {
    use time::macros::datetime;
    // 2023-01-01 was a Sunday
    let t = ZonedTime::new(datetime!(2023-01-01 08:00:00 UTC), Some("UTC"));
    assert_eq!(Format::compile("M").render(&t), "Jan");
    assert_eq!(Format::compile("MM").render(&t), "January");
    assert_eq!(Format::compile("D").render(&t), "Sun");
    assert_eq!(Format::compile("DD").render(&t), "Sunday");
}

#[test]
fn test_short_year_truncates_textually() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(0999-06-01 00:00:00 UTC), Some("UTC"));
    assert_eq!(Format::compile("y").render(&t), "99");
    let t = ZonedTime::new(datetime!(2022-06-01 00:00:00 UTC), Some("UTC"));
    assert_eq!(Format::compile("y").render(&t), "22");
}

#[test]
fn test_tz_offset_whole_hours() {
    use time::macros::datetime;
    let utc = ZonedTime::new(datetime!(2022-06-01 12:00:00 UTC), Some("UTC"));
    let east = ZonedTime::new(datetime!(2022-06-01 12:00:00 +5:30), None);
    let west = ZonedTime::new(datetime!(2022-06-01 12:00:00 -2), None);
    assert_eq!(Format::compile("z").render(&utc), "+00:00");
    assert_eq!(Format::compile("z").render(&east), "+05:00");
    assert_eq!(Format::compile("z").render(&west), "-02:00");
}

#[test]
fn test_tz_name_falls_back_to_empty() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-06-01 12:00:00 -2), None);
    assert_eq!(Format::compile("Z").render(&t), "");
    assert_eq!(Format::compile("[Z]").render(&t), "[]");
}

#[test]
fn test_slots_align_with_fields() {
    let f = Format::compile("Y-mm-dd \\H literal #");
    let slots = f
        .template
        .iter()
        .filter(|c| matches!(c, Chunk::Slot { .. }))
        .count();
    assert_eq!(slots, f.fields.len());
}

#[test]
fn test_render_is_deterministic() {
    use time::macros::datetime;
    let t = ZonedTime::new(datetime!(2022-12-24 02:45:43 UTC), Some("UTC"));
    let f = Format::compile("DD, MM d, Y h:ii Z");
    assert_eq!(f.render(&t), f.render(&t));
    assert_eq!(f.render(&t), "Saturday, December 24, 2022 2:45 UTC");
}
