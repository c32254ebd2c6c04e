//! Domain models for the roster pipeline.
//!
//! - [`SelectedFile`] - the uploaded file as handed over by the caller
//! - [`RawValue`] / [`RawRow`] - loosely-typed rows produced by the extractors
//! - [`ParsedStudent`] - one retained student record
//! - [`Roster`] - the sorted result of one upload attempt

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

// =============================================================================
// Selected File
// =============================================================================

/// A file chosen for submission: payload, declared media type and name.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk. The media type is left to the caller.
    pub fn from_path(
        path: &std::path::Path,
        media_type: Option<&str>,
    ) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(name, media_type.unwrap_or(""), bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// =============================================================================
// Raw Rows
// =============================================================================

/// A cell or element value as found in the source file.
///
/// Numbers are kept as numbers and only stringified on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Number(_) => false,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            // f64 Display prints the shortest exact form: 5400 and 1.5, never 5400.0
            RawValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawValue::Text(s) => serializer.serialize_str(s),
            RawValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

/// An ordered key/value row with arbitrary key spelling.
///
/// Keys keep their source order and may repeat; lookups are done by
/// the field resolver, not by the row itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    entries: Vec<(String, RawValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether a key with this spelling (case-insensitive) is present with a non-blank value.
    pub fn has_value_for(&self, key: &str) -> bool {
        let key = key.trim().to_lowercase();
        self.entries
            .iter()
            .any(|(k, v)| k.trim().to_lowercase() == key && !v.is_blank())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every value is blank.
    pub fn is_blank(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_blank())
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.push(k, v);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// =============================================================================
// Students and Roster
// =============================================================================

/// One student retained by the roster builder.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStudent {
    /// Never empty.
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub total_seconds: u64,
    /// `HHh MMm SSs` when `total_seconds > 0`, otherwise the trimmed source text.
    pub display_time: String,
}

/// Students sorted ascending by accumulated time, stable on ties.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Roster {
    students: Vec<ParsedStudent>,
}

impl Roster {
    /// Sort and wrap. The sort is stable so equal durations keep row order.
    pub fn from_students(mut students: Vec<ParsedStudent>) -> Self {
        students.sort_by_key(|s| s.total_seconds);
        Self { students }
    }

    pub fn students(&self) -> &[ParsedStudent] {
        &self.students
    }

    pub fn into_students(self) -> Vec<ParsedStudent> {
        self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParsedStudent> {
        self.students.iter()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a ParsedStudent;
    type IntoIter = std::slice::Iter<'a, ParsedStudent>;

    fn into_iter(self) -> Self::IntoIter {
        self.students.iter()
    }
}
