//! Field normalizers for loosely-typed dataset values.
//!
//! Every function here is total: malformed input degrades to a documented
//! fallback instead of an error.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use regex::Regex;

pub const NOT_DISCLOSED: &str = "Not Disclosed";
pub const LAKH: f64 = 100_000.0;
pub const INDIA_COUNTRY_PREFIX: &str = "+91 ";

/// Offset the spreadsheet export applied when it stored local wall-clock
/// times as UTC (IST, +05:30).
pub const SOURCE_UTC_OFFSET_MINUTES: i64 = 5 * 60 + 30;

const MINUTES_PER_DAY: i64 = 24 * 60;

static CANONICAL_DATE_RE: OnceLock<Regex> = OnceLock::new();
static READABLE_TIME_RE: OnceLock<Regex> = OnceLock::new();
static FLOAT_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

fn canonical_date_re() -> &'static Regex {
    CANONICAL_DATE_RE
        .get_or_init(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("static date pattern"))
}

fn readable_time_re() -> &'static Regex {
    READABLE_TIME_RE
        .get_or_init(|| Regex::new(r"\d{1,2}:\d{2}.*[AaPp][Mm]").expect("static time pattern"))
}

fn float_prefix_re() -> &'static Regex {
    FLOAT_PREFIX_RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("static float pattern")
    })
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Trims, lower-cases, then upper-cases the first character of every word.
pub fn title_case(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut prev_is_word = false;
    for ch in lowered.chars() {
        let is_word = is_word_char(ch);
        if is_word && !prev_is_word {
            // Characters whose upper-case form expands (e.g. 'ß') are left as-is
            // so a second pass sees the same input.
            let mut upper = ch.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => out.push(u),
                _ => out.push(ch),
            }
        } else {
            out.push(ch);
        }
        prev_is_word = is_word;
    }
    out
}

/// Leading float of `value`, the way a lenient numeric parser reads it
/// ("12.5 LPA" -> 12.5). `None` when no digits lead the string.
pub fn parse_float_prefix(value: &str) -> Option<f64> {
    let m = float_prefix_re().find(value.trim_start())?;
    m.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Leading integer of `value` ("07th" -> 7). `None` when no digits lead.
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (h, t) = rest.split_at(rest.len() - 2);
        groups.push(t);
        rest = h;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

pub fn format_salary(value: &str) -> String {
    if value.trim().is_empty() {
        return NOT_DISCLOSED.to_string();
    }
    let cleaned = value.replace(',', "");
    match parse_float_prefix(cleaned.trim()) {
        None => title_case(value),
        Some(amount) if amount >= LAKH => {
            let tenths = round_tenths(amount / LAKH);
            format!("₹{}.{} LPA", tenths / 10, tenths % 10)
        }
        Some(amount) if amount > 0.0 => format!("₹{}", group_indian(amount.round() as u64)),
        Some(_) => NOT_DISCLOSED.to_string(),
    }
}

/// Tenths of a non-negative `value`, rounded on its exact binary value with
/// ties going up (1.45 is stored below the tie and gives 14).
fn round_tenths(value: f64) -> u64 {
    // 60 fractional digits cover the full expansion of any f64 >= 1.
    let exact = format!("{value:.60}");
    let Some((whole, fraction)) = exact.split_once('.') else {
        return u64::MAX;
    };
    let Ok(whole) = whole.parse::<u64>() else {
        return u64::MAX;
    };
    let mut digits = fraction.bytes();
    let tenth = digits.next().map_or(0, |d| u64::from(d - b'0'));
    let round_up = digits.next().is_some_and(|d| d >= b'5');
    whole
        .saturating_mul(10)
        .saturating_add(tenth)
        .saturating_add(u64::from(round_up))
}

/// Completed years between a 1-indexed birth date and `today`, floored at 0.
pub fn calculate_age(year: i32, month: u32, day: u32, today: NaiveDate) -> u32 {
    let age = i64::from(today.year()) - i64::from(year);
    let month_diff = i64::from(today.month()) - i64::from(month);
    let before_birthday =
        month_diff < 0 || (month_diff == 0 && i64::from(today.day()) < i64::from(day));
    let age = if before_birthday { age - 1 } else { age };
    u32::try_from(age.max(0)).unwrap_or(u32::MAX)
}

/// How a date-of-birth value arrived from the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateEncoding {
    Empty,
    /// Already `MM/DD/YYYY`.
    Formatted,
    Timestamp(DateTime<Utc>),
    Unrecognized,
}

/// How a time-of-birth value arrived from the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeEncoding {
    Empty,
    /// Already `H:MM[:SS] AM/PM`.
    Readable,
    Timestamp(DateTime<Utc>),
    Unrecognized,
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_in(value, &Utc)
}

/// RFC 3339 first. Date-times without an offset are wall-clock time in `tz`
/// (the earlier instant when a DST fold makes them ambiguous). A bare
/// `YYYY-MM-DD` is UTC midnight.
pub fn parse_timestamp_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let s = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

pub fn classify_date(value: &str) -> DateEncoding {
    classify_date_in(value, &Local)
}

pub fn classify_date_in<Tz: TimeZone>(value: &str, tz: &Tz) -> DateEncoding {
    if value.is_empty() {
        return DateEncoding::Empty;
    }
    if canonical_date_re().is_match(value) {
        return DateEncoding::Formatted;
    }
    match parse_timestamp_in(value, tz) {
        Some(ts) => DateEncoding::Timestamp(ts),
        None => DateEncoding::Unrecognized,
    }
}

pub fn classify_time(value: &str) -> TimeEncoding {
    if value.is_empty() {
        return TimeEncoding::Empty;
    }
    if readable_time_re().is_match(value) {
        return TimeEncoding::Readable;
    }
    match parse_timestamp(value) {
        Some(ts) => TimeEncoding::Timestamp(ts),
        None => TimeEncoding::Unrecognized,
    }
}

pub fn format_date(value: &str) -> String {
    format_date_in(value, &Local)
}

/// Canonical `MM/DD/YYYY` for `value`, reading timestamps as calendar dates
/// in `tz`. Unrecognized input is returned verbatim.
pub fn format_date_in<Tz: TimeZone>(value: &str, tz: &Tz) -> String {
    match classify_date_in(value, tz) {
        DateEncoding::Empty => String::new(),
        DateEncoding::Formatted | DateEncoding::Unrecognized => value.to_string(),
        DateEncoding::Timestamp(ts) => {
            let local = ts.with_timezone(tz);
            format!("{:02}/{:02}/{}", local.month(), local.day(), local.year())
        }
    }
}

/// `H:MM:SS AM/PM` for `value`. Timestamps carry the source's local time as
/// UTC on a reference date, so the fixed source offset is re-applied.
pub fn format_time(value: &str) -> String {
    match classify_time(value) {
        TimeEncoding::Empty => String::new(),
        TimeEncoding::Readable | TimeEncoding::Unrecognized => value.to_string(),
        TimeEncoding::Timestamp(ts) => {
            let total = (ts.hour() as i64 * 60 + ts.minute() as i64 + SOURCE_UTC_OFFSET_MINUTES)
                .rem_euclid(MINUTES_PER_DAY);
            let hour = total / 60;
            let minute = total % 60;
            let meridiem = if hour >= 12 { "PM" } else { "AM" };
            let hour12 = match hour % 12 {
                0 => 12,
                h => h,
            };
            format!("{hour12}:{minute:02}:{:02} {meridiem}", ts.second())
        }
    }
}

pub fn age_from_birth_date(value: &str, today: NaiveDate) -> u32 {
    age_from_birth_date_in(value, today, &Local)
}

/// Age for a raw date-of-birth value: timestamp-shaped values go through the
/// calendar date in `tz`, everything else is read as `MM/DD/YYYY`. 0 when the
/// value cannot be read.
pub fn age_from_birth_date_in<Tz: TimeZone>(value: &str, today: NaiveDate, tz: &Tz) -> u32 {
    if value.is_empty() {
        return 0;
    }
    if value.contains('T') {
        if let Some(ts) = parse_timestamp_in(value, tz) {
            let local = ts.with_timezone(tz);
            return calculate_age(local.year(), local.month(), local.day(), today);
        }
    }
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != 3 {
        return 0;
    }
    let (Some(month), Some(day), Some(year)) = (
        parse_int_prefix(parts[0]),
        parse_int_prefix(parts[1]),
        parse_int_prefix(parts[2]),
    ) else {
        return 0;
    };
    let (Ok(year), Ok(month), Ok(day)) = (
        i32::try_from(year),
        u32::try_from(month),
        u32::try_from(day),
    ) else {
        return 0;
    };
    calculate_age(year, month, day, today)
}

pub fn format_contact(value: &str) -> String {
    let s = value.trim();
    if s.starts_with('+') {
        return s.to_string();
    }
    if s.len() == 10 && s.chars().all(|c| c.is_ascii_digit()) {
        return format!("{INDIA_COUNTRY_PREFIX}{s}");
    }
    s.to_string()
}
