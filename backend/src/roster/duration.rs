//! Free-text duration normalization to whole seconds.
//!
//! Grammars are independent parse attempts evaluated in a fixed order;
//! the first one producing a positive result wins and they are never
//! combined:
//!
//! 1. colon form: `H:MM` or `H:MM:SS`
//! 2. unit-suffixed form: `1h 30m`, `1,5 horas`, `45 min 10 seg`
//! 3. positional numbers: 3 tokens = h/m/s, 2 = h/m, 1 = hours
//!
//! The positional fallback reads a lone number as hours, so `"90"` is
//! 90 hours, not 90 minutes.

use once_cell::sync::Lazy;
use regex::Regex;

static COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2})(?::(\d{2}))?$").expect("valid regex"));

static HOURS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:horas?|hours?|hrs?|h)").expect("valid regex")
});

static MINUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:minutos?|minutes?|mins?|m)").expect("valid regex")
});

static SECONDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:segundos?|seconds?|segs?|secs?|s)").expect("valid regex")
});

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid regex"));

type Grammar = fn(&str) -> Option<u64>;

/// Grammars in priority order.
const GRAMMARS: &[(&str, Grammar)] = &[
    ("colon", parse_colon),
    ("units", parse_units),
    ("positional", parse_positional),
];

/// Convert a duration text into seconds. Returns 0 when nothing matches.
pub fn parse_duration(text: &str) -> u64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }
    GRAMMARS
        .iter()
        .find_map(|(_, grammar)| grammar(text).filter(|secs| *secs > 0))
        .unwrap_or(0)
}

/// Name of the grammar that would produce the result, if any.
pub fn matching_grammar(text: &str) -> Option<&'static str> {
    let text = text.trim();
    GRAMMARS
        .iter()
        .find(|(_, grammar)| grammar(text).is_some_and(|secs| secs > 0))
        .map(|(name, _)| *name)
}

/// Render seconds as `HHh MMm SSs`.
pub fn format_duration(total_seconds: u64) -> String {
    format!(
        "{:02}h {:02}m {:02}s",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

fn parse_colon(text: &str) -> Option<u64> {
    let caps = COLON.captures(text)?;
    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = match caps.get(3) {
        Some(s) => s.as_str().parse().ok()?,
        None => 0,
    };
    // absurd hour counts are no match rather than a wrapped value
    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)
}

fn parse_units(text: &str) -> Option<u64> {
    let hours = unit_value(&HOURS, text);
    let minutes = unit_value(&MINUTES, text);
    let seconds = unit_value(&SECONDS, text);

    if hours.is_none() && minutes.is_none() && seconds.is_none() {
        return None;
    }

    // sum at full precision, round once
    let total = hours.unwrap_or(0.0) * 3600.0 + minutes.unwrap_or(0.0) * 60.0 + seconds.unwrap_or(0.0);
    Some(round_seconds(total))
}

fn unit_value(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|caps| parse_decimal(&caps[1]))
}

fn parse_positional(text: &str) -> Option<u64> {
    let numbers: Vec<f64> = NUMBER
        .find_iter(text)
        .filter_map(|m| parse_decimal(m.as_str()))
        .collect();

    let total = match numbers.as_slice() {
        [h, m, s] => h * 3600.0 + m * 60.0 + s,
        [h, m] => h * 3600.0 + m * 60.0,
        [h] => h * 3600.0,
        _ => return None,
    };
    Some(round_seconds(total))
}

fn parse_decimal(token: &str) -> Option<f64> {
    token.replace(',', ".").parse().ok()
}

fn round_seconds(total: f64) -> u64 {
    if total.is_finite() && total > 0.0 {
        total.round() as u64
    } else {
        0
    }
}
