//! Roster assembly from raw rows.
//!
//! A row is kept only when both a name and a duration text resolve.
//! The result is sorted by accumulated time, least first, so outreach
//! starts with the least engaged students.

use super::duration::{format_duration, parse_duration};
use super::fields::{resolve, CanonicalField};
use crate::models::{ParsedStudent, RawRow, Roster};

/// Build a roster from rows in source order.
///
/// An empty result is legal; turning it into an error is the caller's call.
pub fn build_roster(rows: &[RawRow]) -> Roster {
    Roster::from_students(rows.iter().filter_map(parse_student).collect())
}

/// Apply the inclusion predicate and parse one row.
pub fn parse_student(row: &RawRow) -> Option<ParsedStudent> {
    let full_name = resolve(row, CanonicalField::FullName);
    let duration_text = resolve(row, CanonicalField::DurationText);

    if full_name.is_empty() || duration_text.is_empty() {
        return None;
    }

    let email = Some(resolve(row, CanonicalField::Email)).filter(|e| !e.is_empty());
    let total_seconds = parse_duration(&duration_text);
    let display_time = if total_seconds > 0 {
        format_duration(total_seconds)
    } else {
        duration_text
    };

    Some(ParsedStudent {
        full_name,
        email,
        total_seconds,
        display_time,
    })
}
