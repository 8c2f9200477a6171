//! The atom codec: per-primitive-kind literal parsing and formatting.
//!
//! Pure functions, no state, and strictly locale-independent: numeric,
//! temporal, and GUID text always uses one fixed convention regardless of
//! the host environment.
//!
//! [`parse`] interprets cooked token text against a declared [`AtomKind`];
//! [`format`] renders a [`Value`] back into the literal text the lexer would
//! re-tokenize. Binary, GUID, duration, and date-time atoms travel as string
//! literals (their text is not otherwise tokenizable); the float specials
//! `INF`, `-INF`, and `NaN` are likewise emitted as quoted string literals
//! reused as numeric sentinels.

use crate::meta::AtomKind;
use crate::value::{CiString, Decimal, Value};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, FixedOffset, Timelike};
use uuid::Uuid;

const TICKS_PER_SECOND: i64 = 10_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Parses cooked literal text as the given atom kind.
///
/// Returns `None` when the text is not a valid literal for the kind; the
/// parser reports that as an `InvalidAtomValue` diagnostic.
pub fn parse(kind: AtomKind, text: &str) -> Option<Value> {
    match kind {
        AtomKind::String => Some(Value::String(text.to_string())),
        AtomKind::IgnoreCaseString => Some(Value::CiString(CiString::new(text))),
        AtomKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        AtomKind::Bool => match text {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        AtomKind::I8 => parse_signed(text, i8::MIN as i64, i8::MAX as i64),
        AtomKind::I16 => parse_signed(text, i16::MIN as i64, i16::MAX as i64),
        AtomKind::I32 => parse_signed(text, i32::MIN as i64, i32::MAX as i64),
        AtomKind::I64 => parse_signed(text, i64::MIN, i64::MAX),
        AtomKind::U8 => parse_unsigned(text, u8::MAX as u64),
        AtomKind::U16 => parse_unsigned(text, u16::MAX as u64),
        AtomKind::U32 => parse_unsigned(text, u32::MAX as u64),
        AtomKind::U64 => parse_unsigned(text, u64::MAX),
        AtomKind::F32 => parse_float(text).map(|f| Value::F32(f as f32)),
        AtomKind::F64 => parse_float(text).map(Value::F64),
        AtomKind::Decimal => Decimal::parse(text).map(Value::Decimal),
        AtomKind::Binary => BASE64.decode(text).ok().map(Value::Binary),
        AtomKind::Guid => parse_guid(text).map(Value::Guid),
        AtomKind::Duration => parse_duration(text).map(Value::Duration),
        AtomKind::DateTime => parse_date_time(text).map(Value::DateTime),
    }
}

/// Renders a value as its literal token text.
///
/// Values with no atom literal form (objects, collections, enum values) fall
/// back to their debug rendering wrapped as a string literal; the serializer
/// never takes that path for well-formed graphs.
pub fn format(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::F32(f) => format_float(*f as f64),
        Value::F64(f) => format_float(*f),
        Value::Decimal(d) => d.to_string(),
        Value::Char(c) => format_char(*c),
        Value::String(s) => format_string(s),
        Value::CiString(s) => format_string(s.as_str()),
        Value::Binary(bytes) => format_string(&BASE64.encode(bytes)),
        Value::Guid(guid) => format_string(&guid.to_string()),
        Value::Duration(d) => format_string(&format_duration(*d)),
        Value::DateTime(dt) => format_string(&format_date_time(dt)),
        other => format_string(&format!("{:?}", other)),
    }
}

/// The string literal form: verbatim `@"..."` with internal quotes doubled.
/// The empty string is the two-character literal `""`.
pub fn format_string(text: &str) -> String {
    if text.is_empty() {
        return "\"\"".to_string();
    }
    let mut out = String::with_capacity(text.len() + 3);
    out.push_str("@\"");
    for c in text.chars() {
        if c == '"' {
            out.push_str("\"\"");
        } else {
            out.push(c);
        }
    }
    out.push('"');
    out
}

fn parse_signed(text: &str, min: i64, max: i64) -> Option<Value> {
    let value: i64 = text.parse().ok()?;
    if value < min || value > max {
        return None;
    }
    Some(Value::Int(value))
}

fn parse_unsigned(text: &str, max: u64) -> Option<Value> {
    let value: u64 = text.parse().ok()?;
    if value > max {
        return None;
    }
    Some(Value::UInt(value))
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "INF" => return Some(f64::INFINITY),
        "-INF" => return Some(f64::NEG_INFINITY),
        "NaN" => return Some(f64::NAN),
        _ => {}
    }
    // Rust's float parser accepts "inf"/"nan" spellings; only the literal
    // sentinels above are valid here.
    if text
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    text.parse().ok()
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        format_string("NaN")
    } else if f == f64::INFINITY {
        format_string("INF")
    } else if f == f64::NEG_INFINITY {
        format_string("-INF")
    } else {
        f.to_string()
    }
}

fn format_char(c: char) -> String {
    let code = c as u32;
    if code <= 0xFFFF {
        format!("'\\u{:04X}'", code)
    } else {
        // Astral characters have no 4-hex escape; emit them literally.
        format!("'{}'", c)
    }
}

fn parse_guid(text: &str) -> Option<Uuid> {
    // Canonical hyphenated form only: 8-4-4-4-12.
    if text.len() != 36 {
        return None;
    }
    let bytes = text.as_bytes();
    if bytes[8] != b'-' || bytes[13] != b'-' || bytes[18] != b'-' || bytes[23] != b'-' {
        return None;
    }
    Uuid::parse_str(text).ok()
}

/// Parses the constant duration format `[-][d.]hh:mm:ss[.fffffff]`.
fn parse_duration(text: &str) -> Option<Duration> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut parts = body.split(':');
    let head = parts.next()?;
    let minutes_text = parts.next()?;
    let seconds_text = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (days_text, hours_text) = match head.split_once('.') {
        Some((d, h)) => (Some(d), h),
        None => (None, head),
    };
    let (secs_text, frac_text) = match seconds_text.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (seconds_text, None),
    };

    let days: i64 = match days_text {
        Some(d) => parse_digits(d)?,
        None => 0,
    };
    let hours: i64 = parse_digits(hours_text)?;
    let minutes: i64 = parse_digits(minutes_text)?;
    let seconds: i64 = parse_digits(secs_text)?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    let ticks: i64 = match frac_text {
        Some(f) => {
            if f.is_empty() || f.len() > 7 || !f.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let mut padded = f.to_string();
            while padded.len() < 7 {
                padded.push('0');
            }
            padded.parse().ok()?
        }
        None => 0,
    };

    let mut total_ticks = ((days * SECONDS_PER_DAY + hours * 3600 + minutes * 60 + seconds)
        .checked_mul(TICKS_PER_SECOND)?)
    .checked_add(ticks)?;
    if negative {
        total_ticks = -total_ticks;
    }
    Some(Duration::nanoseconds(total_ticks.checked_mul(100)?))
}

fn parse_digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn format_duration(d: Duration) -> String {
    let ticks = match d.num_nanoseconds() {
        Some(n) => n / 100,
        None => d.num_seconds().saturating_mul(TICKS_PER_SECOND),
    };
    let sign = if ticks < 0 { "-" } else { "" };
    let t = ticks.unsigned_abs();
    let ticks_per_second = TICKS_PER_SECOND as u64;
    let total_seconds = t / ticks_per_second;
    let frac = t % ticks_per_second;
    let days = total_seconds / SECONDS_PER_DAY as u64;
    let hours = total_seconds / 3600 % 24;
    let minutes = total_seconds / 60 % 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    out.push_str(sign);
    if days > 0 {
        out.push_str(&days.to_string());
        out.push('.');
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if frac > 0 {
        out.push_str(&format!(".{:07}", frac));
    }
    out
}

/// Parses the fixed date-time layout `yyyy-MM-ddTHH:mm:ss.fffffffzzz`:
/// exactly seven fractional digits and a mandatory `±HH:MM` offset.
fn parse_date_time(text: &str) -> Option<DateTime<FixedOffset>> {
    // Fixed layout: the fraction dot sits at byte 19, the offset at 27.
    if text.len() != 33 || !text.is_ascii() {
        return None;
    }
    if text.as_bytes()[19] != b'.' {
        return None;
    }
    let frac = &text[20..27];
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let offset = &text[27..];
    if !offset.starts_with('+') && !offset.starts_with('-') {
        return None;
    }
    DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%:z").ok()
}

fn format_date_time(dt: &DateTime<FixedOffset>) -> String {
    let ticks = dt.nanosecond() / 100;
    let offset_seconds = dt.offset().local_minus_utc();
    let (sign, abs) = if offset_seconds < 0 {
        ('-', -offset_seconds)
    } else {
        ('+', offset_seconds)
    };
    format!(
        "{}.{:07}{}{:02}:{:02}",
        dt.format("%Y-%m-%dT%H:%M:%S"),
        ticks,
        sign,
        abs / 3600,
        abs % 3600 / 60
    )
}
