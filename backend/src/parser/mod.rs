//! Row extraction from uploaded files.
//!
//! [`detect_format`] classifies a file from its name and media type;
//! [`extract_rows`] decodes its content into raw rows:
//!
//! - tabular: binary workbooks via [`workbook`], delimited text via [`delimited`]
//! - hierarchical: XML exports via [`markup`]
//!
//! An empty row list is a legal result, not an error.

pub mod delimited;
pub mod format;
pub mod markup;
pub mod workbook;

pub use delimited::{decode_content, detect_delimiter, detect_encoding, parse_delimited};
pub use format::{detect_format, is_delimited_text, FileFormat};
pub use markup::{parse_markup, parse_markup_bytes, ROW_ELEMENT_NAMES};
pub use workbook::{parse_workbook, rows_from_range};

use crate::error::{FormatError, FormatResult};
use crate::models::{RawRow, SelectedFile};

/// Decode a file's content according to an already-detected format.
pub fn extract_rows(file: &SelectedFile, format: FileFormat) -> FormatResult<Vec<RawRow>> {
    match format {
        FileFormat::Tabular if is_delimited_text(&file.media_type, &file.name) => {
            parse_delimited(&file.bytes)
        }
        FileFormat::Tabular => parse_workbook(&file.bytes),
        FileFormat::Hierarchical => parse_markup_bytes(&file.bytes),
        FileFormat::Unsupported => Err(FormatError::Unsupported(describe(file))),
    }
}

fn describe(file: &SelectedFile) -> String {
    if file.media_type.is_empty() {
        file.name.clone()
    } else {
        format!("{} ({})", file.name, file.media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_dispatch() {
        let file = SelectedFile::new("notas.csv", "", b"name;time\nAna;1:00\n".to_vec());
        let rows = extract_rows(&file, detect_format(&file.media_type, &file.name)).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_xml_dispatch() {
        let file = SelectedFile::new("a.xml", "text/xml", b"<r><alumno><name>A</name></alumno></r>".to_vec());
        let rows = extract_rows(&file, FileFormat::Hierarchical).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_workbook_dispatch_rejects_garbage() {
        let file = SelectedFile::new("a.xlsx", "", b"garbage".to_vec());
        assert!(matches!(
            extract_rows(&file, FileFormat::Tabular),
            Err(FormatError::UnreadableWorkbook(_))
        ));
    }

    #[test]
    fn test_unsupported() {
        let file = SelectedFile::new("a.pdf", "application/pdf", Vec::new());
        let err = extract_rows(&file, FileFormat::Unsupported).unwrap_err();
        assert!(err.to_string().contains("a.pdf"));
    }
}
