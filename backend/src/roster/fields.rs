//! Canonical field resolution over rows with arbitrary key spelling.
//!
//! Each canonical field owns a static, ordered alias group. Keys are
//! compared case-insensitively after trimming; the first alias (in group
//! order) whose value is non-empty wins. Resolution never fails: a total
//! miss is an empty string.

use crate::models::RawRow;

/// The vocabulary downstream logic depends on, whatever the source columns are called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    FirstName,
    LastName,
    FullName,
    Email,
    DurationText,
}

const FIRST_NAME_ALIASES: &[&str] = &[
    "nombre",
    "nombres",
    "first name",
    "firstname",
    "first_name",
    "given name",
    "givenname",
];

const LAST_NAME_ALIASES: &[&str] = &[
    "apellidos",
    "apellido",
    "last name",
    "lastname",
    "last_name",
    "surname",
    "family name",
    "familyname",
];

const FULL_NAME_ALIASES: &[&str] = &[
    "nombre completo",
    "nombrecompleto",
    "nombre_completo",
    "nombre y apellidos",
    "full name",
    "fullname",
    "full_name",
    "alumno",
    "estudiante",
    "student",
    "participante",
    "usuario",
    "name",
];

const EMAIL_ALIASES: &[&str] = &[
    "correo",
    "correo electrónico",
    "correo electronico",
    "correoelectronico",
    "email",
    "e-mail",
    "mail",
    "email address",
    "dirección de correo",
    "direccion de correo",
];

const DURATION_ALIASES: &[&str] = &[
    "tiempo total",
    "tiempototal",
    "tiempo_total",
    "tiempo dedicado",
    "tiempodedicado",
    "tiempo",
    "duración",
    "duracion",
    "dedicación",
    "dedicacion",
    "total time",
    "totaltime",
    "total_time",
    "time spent",
    "timespent",
    "time",
    "duration",
    "horas",
];

impl CanonicalField {
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::FullName,
        CanonicalField::Email,
        CanonicalField::DurationText,
    ];

    /// Recognized source names, lowercase, in priority order.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::FirstName => FIRST_NAME_ALIASES,
            CanonicalField::LastName => LAST_NAME_ALIASES,
            CanonicalField::FullName => FULL_NAME_ALIASES,
            CanonicalField::Email => EMAIL_ALIASES,
            CanonicalField::DurationText => DURATION_ALIASES,
        }
    }
}

/// Resolve one canonical field against a row.
///
/// `FullName` is composed from first and last name when both are present;
/// only when that composite is empty is the full-name alias group consulted.
pub fn resolve(row: &RawRow, field: CanonicalField) -> String {
    match field {
        CanonicalField::FullName => {
            let composite = compose_name(
                &lookup(row, CanonicalField::FirstName.aliases()),
                &lookup(row, CanonicalField::LastName.aliases()),
            );
            if composite.is_empty() {
                lookup(row, CanonicalField::FullName.aliases())
            } else {
                composite
            }
        }
        other => lookup(row, other.aliases()),
    }
}

fn compose_name(first: &str, last: &str) -> String {
    if first.is_empty() || last.is_empty() {
        return String::new();
    }
    format!("{} {}", first, last)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup(row: &RawRow, aliases: &[&str]) -> String {
    for alias in aliases {
        let hit = row
            .entries()
            .filter(|(key, _)| key.trim().to_lowercase() == *alias)
            .map(|(_, value)| value.to_string().trim().to_string())
            .find(|value| !value.is_empty());
        if let Some(value) = hit {
            return value;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_case_insensitive_trimmed_keys() {
        let r = row(&[("  CORREO ", "ana@example.com"), ("Tiempo Total", " 1:30 ")]);
        assert_eq!(resolve(&r, CanonicalField::Email), "ana@example.com");
        assert_eq!(resolve(&r, CanonicalField::DurationText), "1:30");
    }

    #[test]
    fn test_alias_order_beats_column_order() {
        // "tiempo total" precedes "time" in the group even though "time" comes first in the row
        let r = row(&[("time", "0:10"), ("Tiempo total", "2:00")]);
        assert_eq!(resolve(&r, CanonicalField::DurationText), "2:00");
    }

    #[test]
    fn test_empty_value_skipped_for_next_alias() {
        let r = row(&[("Tiempo total", "  "), ("Duración", "1h")]);
        assert_eq!(resolve(&r, CanonicalField::DurationText), "1h");
    }

    #[test]
    fn test_numeric_values_stringified() {
        let mut r = RawRow::new();
        r.push("Horas", RawValue::Number(1.5));
        assert_eq!(resolve(&r, CanonicalField::DurationText), "1.5");
    }

    #[test]
    fn test_full_name_composite() {
        let r = row(&[("Nombre", " María "), ("Apellidos", "Pérez  López"), ("Nombre completo", "X")]);
        assert_eq!(resolve(&r, CanonicalField::FullName), "María Pérez López");
    }

    #[test]
    fn test_full_name_falls_back_to_dedicated_column() {
        let r = row(&[("Full name", "Carlos López"), ("Email", "c@example.com")]);
        assert_eq!(resolve(&r, CanonicalField::FullName), "Carlos López");
    }

    #[test]
    fn test_full_name_needs_both_parts_for_composite() {
        let r = row(&[("Nombre", "Ana"), ("Alumno", "Ana García")]);
        assert_eq!(resolve(&r, CanonicalField::FullName), "Ana García");
    }

    #[test]
    fn test_total_miss_is_empty() {
        let r = row(&[("Curso", "PRL")]);
        for field in CanonicalField::ALL {
            assert_eq!(resolve(&r, field), "");
        }
    }

    #[test]
    fn test_aliases_are_lowercase_and_trimmed() {
        for field in CanonicalField::ALL {
            for alias in field.aliases() {
                assert_eq!(*alias, alias.trim().to_lowercase());
            }
        }
    }
}
