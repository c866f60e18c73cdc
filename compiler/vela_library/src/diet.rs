//! Serialized library API ("diet" form).
//!
//! A library's public surface can be written out as signature-only source
//! and restored later without re-parsing the full library. The serialized
//! form is a concatenation of unit sections, each introduced by two marker
//! lines:
//!
//! ```text
//! --- unit-name: main.vela
//! --- unit-uri: file:///pkg/main.vela
//! class A {
//!   int foo(int a);
//! }
//! ```
//!
//! Restored units are marked diet and carry no executable bodies. Saving a
//! restored library reproduces the serialized text exactly.

use thiserror::Error;
use vela_ast::printer::unit_diet_source;
use vela_ast::{SharedInterner, StringInterner, Unit};

use crate::library::Library;
use crate::reader::{self, Token};

/// Marker line prefix introducing a unit section.
pub const UNIT_NAME_MARKER: &str = "--- unit-name: ";
/// Marker line prefix carrying the unit's URI.
pub const UNIT_URI_MARKER: &str = "--- unit-uri: ";

/// Failure restoring a library from its serialized API.
#[derive(Debug, Error)]
pub enum DietError {
    /// Serialized text does not begin with a unit-name marker.
    #[error("serialized API does not start with a '--- unit-name: ' marker")]
    MissingNameMarker,
    /// Unit-name marker not followed by a unit-uri marker.
    #[error("unit '{unit}' is missing its '--- unit-uri: ' marker")]
    MissingUriMarker { unit: String },
    /// Text the signature lexer cannot tokenize.
    #[error("{file}: unrecognized text at offset {offset}")]
    InvalidToken { file: String, offset: u32 },
    /// Token that does not fit the signature grammar.
    #[error("{file}: unexpected {found:?} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        file: String,
        found: Token,
        offset: u32,
        expected: &'static str,
    },
    /// Signature text ended mid-declaration.
    #[error("{file}: unexpected end of unit, expected {expected}")]
    UnexpectedEof {
        file: String,
        expected: &'static str,
    },
}

/// Serialize a library's API. Units are emitted in file-name order.
pub fn save_api(library: &Library, interner: &StringInterner) -> String {
    let mut out = String::new();
    let units = library.units();
    for (name, unit) in units.iter() {
        out.push_str(UNIT_NAME_MARKER);
        out.push_str(name);
        out.push('\n');
        out.push_str(UNIT_URI_MARKER);
        out.push_str(&unit.uri);
        out.push('\n');
        out.push_str(&unit_diet_source(unit, interner));
    }
    out
}

/// Restore units from a serialized API. The caller puts them into a
/// library and proceeds as with parsed units.
pub fn load_api(text: &str, interner: &SharedInterner) -> Result<Vec<Unit>, DietError> {
    let mut units = Vec::new();
    let mut expect_uri: Option<String> = None;
    let mut pending: Option<(String, String, String)> = None;

    for line in text.lines() {
        if let Some(name) = line.strip_prefix(UNIT_NAME_MARKER) {
            if let Some(unit) = expect_uri.take() {
                return Err(DietError::MissingUriMarker { unit });
            }
            if let Some((unit_name, uri, body)) = pending.take() {
                units.push(reader::read_unit(&unit_name, &uri, &body, interner)?);
            }
            expect_uri = Some(name.to_owned());
        } else if let Some(unit) = expect_uri.take() {
            let Some(uri) = line.strip_prefix(UNIT_URI_MARKER) else {
                return Err(DietError::MissingUriMarker { unit });
            };
            pending = Some((unit, uri.to_owned(), String::new()));
        } else if let Some((_, _, body)) = pending.as_mut() {
            body.push_str(line);
            body.push('\n');
        } else if !line.trim().is_empty() {
            return Err(DietError::MissingNameMarker);
        }
    }
    if let Some(unit) = expect_uri {
        return Err(DietError::MissingUriMarker { unit });
    }
    if let Some((unit_name, uri, body)) = pending {
        units.push(reader::read_unit(&unit_name, &uri, &body, interner)?);
    }
    tracing::debug!(units = units.len(), "restored library API");
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vela_ast::LibraryId;

    const API: &str = "\
--- unit-name: a.vela
--- unit-uri: file:///pkg/a.vela
library \"app\";
import \"core\" as core;
class A extends B implements I, J {
  int foo(int a, [int b]);
  static Dynamic bar;
}
interface I default F {
  factory I.foo(num a, bool b, Object c);
  int get x();
  set y(int v);
}
Dynamic main();
--- unit-name: b.vela
--- unit-uri: file:///pkg/b.vela
class B {
}
";

    #[test]
    fn load_then_save_is_a_fixed_point() {
        let interner = SharedInterner::new();
        let units = load_api(API, &interner).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|u| u.diet));

        let library = Library::new("app", "file:///pkg", LibraryId::new(0));
        for unit in units {
            library.put_unit(unit);
        }
        assert_eq!(save_api(&library, &interner), API);
    }

    #[test]
    fn missing_uri_marker_is_reported() {
        let interner = SharedInterner::new();
        let err = load_api("--- unit-name: a.vela\nclass A {\n}\n", &interner).unwrap_err();
        assert!(matches!(err, DietError::MissingUriMarker { .. }));
    }

    #[test]
    fn leading_garbage_is_reported() {
        let interner = SharedInterner::new();
        let err = load_api("class A {\n}\n", &interner).unwrap_err();
        assert!(matches!(err, DietError::MissingNameMarker));
    }

    #[test]
    fn empty_text_restores_nothing() {
        let interner = SharedInterner::new();
        let units = load_api("", &interner).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(units.len(), 0);
    }
}
