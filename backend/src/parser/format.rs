//! File format classification from name and declared media type.
//!
//! No content is read here: a file whose type is already wrong never
//! reaches the decoders.

use serde::Serialize;
use std::fmt;

/// Structural family of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Spreadsheet or delimited text: a grid with a header row.
    Tabular,
    /// Markup export: a tree of repeating elements.
    Hierarchical,
    /// Anything else: uploaded as is, never parsed.
    Unsupported,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Tabular => "tabular",
            FileFormat::Hierarchical => "hierarchical",
            FileFormat::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv"];
const MARKUP_EXTENSIONS: &[&str] = &["xml"];

/// Classify a file. The media type wins when it clearly names a family,
/// otherwise the filename suffix decides.
pub fn detect_format(media_type: &str, file_name: &str) -> FileFormat {
    match format_from_media_type(media_type) {
        Some(format) => format,
        None => format_from_extension(file_name),
    }
}

fn format_from_media_type(media_type: &str) -> Option<FileFormat> {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    if essence.is_empty() {
        return None;
    }

    // spreadsheetml media types also contain "xml", so tabular is checked first
    if essence.contains("spreadsheet")
        || essence.contains("ms-excel")
        || essence == "text/csv"
        || essence == "application/csv"
        || essence == "text/tab-separated-values"
    {
        return Some(FileFormat::Tabular);
    }

    if essence == "application/xml" || essence == "text/xml" || essence.ends_with("+xml") {
        return Some(FileFormat::Hierarchical);
    }

    None
}

fn format_from_extension(file_name: &str) -> FileFormat {
    let ext = extension(file_name);

    if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) || DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
        FileFormat::Tabular
    } else if MARKUP_EXTENSIONS.contains(&ext.as_str()) {
        FileFormat::Hierarchical
    } else {
        FileFormat::Unsupported
    }
}

/// Whether a tabular file is delimited text rather than a binary workbook.
pub fn is_delimited_text(media_type: &str, file_name: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim().to_lowercase();
    matches!(
        essence.as_str(),
        "text/csv" | "application/csv" | "text/tab-separated-values"
    ) || DELIMITED_EXTENSIONS.contains(&extension(file_name).as_str())
}

fn extension(file_name: &str) -> String {
    std::path::Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
