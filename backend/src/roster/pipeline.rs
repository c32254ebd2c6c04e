//! File to roster orchestration.
//!
//! Runs detection, extraction and roster building for one file and
//! reports each step on the log stream. The steps themselves are pure.
//!
//! # Example
//!
//! ```rust,ignore
//! use rosterload::{load_roster, SelectedFile};
//!
//! let file = SelectedFile::from_path(Path::new("curso.xlsx"), None)?;
//! let loaded = load_roster(&file)?;
//! for student in loaded.roster.iter() {
//!     println!("{} {}", student.display_time, student.full_name);
//! }
//! ```

use serde::Serialize;

use super::builder::build_roster;
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::{FormatError, FormatResult};
use crate::models::{Roster, SelectedFile};
use crate::parser::{detect_format, extract_rows, FileFormat};

/// A roster together with what was learned about the file on the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedRoster {
    pub format: FileFormat,
    /// Rows extracted before the inclusion predicate.
    pub row_count: usize,
    pub roster: Roster,
}

impl LoadedRoster {
    /// Rows dropped for lacking a name or a duration.
    pub fn skipped_rows(&self) -> usize {
        self.row_count - self.roster.len()
    }
}

/// Detect, extract and build. An empty roster is returned as is.
pub fn load_roster(file: &SelectedFile) -> FormatResult<LoadedRoster> {
    log_info(format!("📖 Reading {} ({} bytes)", file.name, file.size()));

    let format = detect_format(&file.media_type, &file.name);
    if format == FileFormat::Unsupported {
        log_warning(format!("Unsupported file type: {}", file.name));
        return Err(FormatError::Unsupported(file.name.clone()));
    }
    log_success(format!("Detected {} format", format));

    let rows = extract_rows(file, format)?;
    log_success(format!("Extracted {} rows", rows.len()));

    let roster = build_roster(&rows);
    let loaded = LoadedRoster {
        format,
        row_count: rows.len(),
        roster,
    };

    if loaded.roster.is_empty() {
        log_warning("No row has both a student name and a recorded time");
    } else {
        log_success(format!("{} students in roster", loaded.roster.len()));
        if loaded.skipped_rows() > 0 {
            log_info_indent(
                format!("{} rows skipped (missing name or time)", loaded.skipped_rows()),
                1,
            );
        }
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParsedStudent;

    fn summary(students: &[ParsedStudent]) -> Vec<(String, u64, String)> {
        students
            .iter()
            .map(|s| (s.full_name.clone(), s.total_seconds, s.display_time.clone()))
            .collect()
    }

    #[test]
    fn test_csv_and_xml_produce_identical_rosters() {
        let csv = "Nombre;Apellidos;Correo;Tiempo total\n\
                   María;Pérez;maria@example.com;01h 30m 00s\n\
                   Carlos;López;carlos@example.com;00h 45m 00s\n";
        let xml = r#"<alumnos>
              <alumno><Nombre>María</Nombre><Apellidos>Pérez</Apellidos><Correo>maria@example.com</Correo><TiempoTotal>01h 30m 00s</TiempoTotal></alumno>
              <alumno><Nombre>Carlos</Nombre><Apellidos>López</Apellidos><Correo>carlos@example.com</Correo><TiempoTotal>00h 45m 00s</TiempoTotal></alumno>
            </alumnos>"#;

        let tabular = load_roster(&SelectedFile::new("curso.csv", "text/csv", csv.as_bytes().to_vec())).unwrap();
        let hierarchical = load_roster(&SelectedFile::new("curso.xml", "", xml.as_bytes().to_vec())).unwrap();

        assert_eq!(tabular.format, FileFormat::Tabular);
        assert_eq!(hierarchical.format, FileFormat::Hierarchical);
        assert_eq!(tabular.roster, hierarchical.roster);
        assert_eq!(
            summary(tabular.roster.students()),
            vec![
                ("Carlos López".to_string(), 2700, "00h 45m 00s".to_string()),
                ("María Pérez".to_string(), 5400, "01h 30m 00s".to_string()),
            ]
        );
    }

    #[test]
    fn test_workbook_roster_ignores_later_sheets() {
        let bytes = include_bytes!("../parser/fixtures/two_sheets.xlsx").to_vec();
        let loaded = load_roster(&SelectedFile::new("curso.xlsx", "", bytes)).unwrap();

        assert_eq!(loaded.format, FileFormat::Tabular);
        assert_eq!(
            summary(loaded.roster.students()),
            vec![
                ("Carlos López".to_string(), 2700, "00h 45m 00s".to_string()),
                ("María Pérez".to_string(), 5400, "01h 30m 00s".to_string()),
            ]
        );
    }

    #[test]
    fn test_skipped_rows_counted() {
        let csv = "name;time\nAna;1:00\nLuis;\n;2:00\n";
        let loaded = load_roster(&SelectedFile::new("a.csv", "", csv.as_bytes().to_vec())).unwrap();
        assert_eq!(loaded.row_count, 3);
        assert_eq!(loaded.skipped_rows(), 2);
    }

    #[test]
    fn test_unsupported_file() {
        let err = load_roster(&SelectedFile::new("a.docx", "", vec![1, 2, 3])).unwrap_err();
        assert!(matches!(err, FormatError::Unsupported(_)));
    }

    #[test]
    fn test_malformed_markup() {
        let file = SelectedFile::new("a.xml", "application/xml", b"<alumnos><alumno>".to_vec());
        assert!(matches!(load_roster(&file), Err(FormatError::MalformedMarkup(_))));
    }
}
