//! Delimited text (CSV/TSV) decoding with encoding and delimiter auto-detection.

use csv::ReaderBuilder;

use crate::error::{FormatError, FormatResult};
use crate::models::RawRow;

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(bytes);

    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [b';', b',', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep as char).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode delimited bytes into rows keyed by the header line.
///
/// Every value is kept as text; fully blank lines are skipped.
pub fn parse_delimited(bytes: &[u8]) -> FormatResult<Vec<RawRow>> {
    // valid UTF-8 is taken as is; chardet only arbitrates legacy encodings
    let encoding = match std::str::from_utf8(bytes) {
        Ok(_) => "utf-8".to_string(),
        Err(_) => detect_encoding(bytes),
    };
    let content = decode_content(bytes, &encoding);
    parse_delimited_str(&content, detect_delimiter(&content))
}

/// Parse already-decoded text with an explicit delimiter.
pub fn parse_delimited_str(content: &str, delimiter: u8) -> FormatResult<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| FormatError::UnreadableText(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| FormatError::UnreadableText(e.to_string()))?;

        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();

        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;

    fn value<'a>(row: &'a RawRow, key: &str) -> Option<&'a RawValue> {
        row.entries().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    #[test]
    fn test_semicolon_rows() {
        let rows = parse_delimited(b"Nombre;Apellidos;Tiempo total\nAna;Garc\xC3\xADa;1:30\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(value(&rows[0], "Apellidos"), Some(&RawValue::from("García")));
        assert_eq!(value(&rows[0], "Tiempo total"), Some(&RawValue::from("1:30")));
    }

    #[test]
    fn test_quoted_values_keep_delimiters() {
        let csv = "name,time\n\"Pérez, Ana\",\"1,5 horas\"\n";
        let rows = parse_delimited_str(csv, b',').unwrap();
        assert_eq!(value(&rows[0], "name"), Some(&RawValue::from("Pérez, Ana")));
        assert_eq!(value(&rows[0], "time"), Some(&RawValue::from("1,5 horas")));
    }

    #[test]
    fn test_missing_cells_become_empty_text() {
        let rows = parse_delimited_str("a;b;c\n1\n", b';').unwrap();
        assert_eq!(value(&rows[0], "b"), Some(&RawValue::from("")));
        assert_eq!(value(&rows[0], "c"), Some(&RawValue::from("")));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let rows = parse_delimited_str("a;b\n1;2\n;\n3;4\n", b';').unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = parse_delimited(b"Nombre;Correo\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a|b|c"), b'|');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Duración" in ISO-8859-1
        let bytes: &[u8] = &[0x44, 0x75, 0x72, 0x61, 0x63, 0x69, 0xF3, 0x6E];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "Duración");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let rows = parse_delimited(b"\xEF\xBB\xBFNombre;Tiempo\nAna;1:00\n").unwrap();
        assert_eq!(value(&rows[0], "Nombre"), Some(&RawValue::from("Ana")));
    }
}
