//! XML export decoding.
//!
//! The document must be well-formed; there is no partial recovery.
//! Row elements are found by a fixed list of names, falling back to the
//! direct children of the root element.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{FormatError, FormatResult};
use crate::models::RawRow;
use crate::roster::fields::CanonicalField;

/// Element names that denote one record, in priority order.
pub const ROW_ELEMENT_NAMES: &[&str] = &[
    "alumno",
    "estudiante",
    "student",
    "participante",
    "participant",
    "usuario",
    "user",
    "row",
    "fila",
    "registro",
    "record",
];

/// Parse markup text into one row per record element.
pub fn parse_markup(text: &str) -> FormatResult<Vec<RawRow>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)
        .map_err(|e| FormatError::MalformedMarkup(e.to_string()))?;

    Ok(record_elements(&doc).into_iter().map(element_to_row).collect())
}

/// Decode bytes as UTF-8 and parse. Invalid UTF-8 is a format error.
pub fn parse_markup_bytes(bytes: &[u8]) -> FormatResult<Vec<RawRow>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| FormatError::MalformedMarkup(format!("not valid UTF-8: {}", e)))?;
    parse_markup(text.trim_start_matches('\u{feff}'))
}

fn record_elements<'a, 'input>(doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
    let root = doc.root_element();

    for name in ROW_ELEMENT_NAMES {
        let matched: Vec<Node> = root
            .descendants()
            .skip(1)
            .filter(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case(name))
            .collect();
        if !matched.is_empty() {
            return matched;
        }
    }

    root.children().filter(|n| n.is_element()).collect()
}

/// Direct children become entries as they are. Each canonical field not
/// covered by a child is then taken from an attribute, and failing that
/// from the first matching descendant at any depth. The first source that
/// yields a value wins for the field; later sources are not added.
fn element_to_row(element: Node) -> RawRow {
    let mut row = RawRow::new();

    for child in element.children().filter(|n| n.is_element()) {
        row.push(child.tag_name().name(), text_content(child));
    }

    for field in CanonicalField::ALL {
        let aliases = field.aliases();
        if aliases.iter().any(|alias| row.has_value_for(alias)) {
            continue;
        }
        if let Some((name, value)) = alias_attribute(element, aliases) {
            row.push(name, value);
        } else if let Some((name, value)) = alias_descendant(element, aliases) {
            row.push(name, value);
        }
    }

    // attributes outside every alias group are kept for the raw row
    for attr in element.attributes() {
        if !is_alias(attr.name()) {
            row.push(attr.name(), attr.value());
        }
    }

    row
}

fn is_alias(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    CanonicalField::ALL
        .iter()
        .any(|field| field.aliases().iter().any(|alias| *alias == name))
}

fn alias_attribute<'a>(element: Node<'a, '_>, aliases: &[&str]) -> Option<(&'a str, String)> {
    aliases.iter().find_map(|alias| {
        element
            .attributes()
            .find(|attr| attr.name().trim().to_lowercase() == *alias && !attr.value().trim().is_empty())
            .map(|attr| (attr.name(), attr.value().trim().to_string()))
    })
}

fn alias_descendant<'a>(element: Node<'a, '_>, aliases: &[&str]) -> Option<(&'a str, String)> {
    aliases.iter().find_map(|alias| {
        element
            .descendants()
            .skip(1)
            .filter(|n| n.is_element() && n.tag_name().name().to_lowercase() == *alias)
            .map(|n| (n.tag_name().name(), text_content(n)))
            .find(|(_, text)| !text.is_empty())
    })
}

fn text_content(node: Node) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}
