//! Named-generator registry.
//!
//! Override rules may delegate to a generator by dotted path, the way the
//! rule files have always spelled them (`person.first_name`,
//! `internet.email`). Paths resolve through a flat pre-registered map; the
//! value-generation collaborator consumes the resulting kind. Unknown paths
//! are a lint finding at configuration time and degrade to plain text at
//! classification time.

use log::warn;
use serde::Serialize;

use crate::field::FieldType;

/// What a registered generator produces, as far as this crate cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    FieldValue(FieldType),
    Number,
    Word,
    Sentence,
    Text,
}

/// Registered dotted paths, exact-match lookup.
pub const REGISTRY: &[(&str, GeneratorKind)] = &[
    ("person.first_name", GeneratorKind::FieldValue(FieldType::FirstName)),
    ("person.last_name", GeneratorKind::FieldValue(FieldType::LastName)),
    ("person.full_name", GeneratorKind::FieldValue(FieldType::FullName)),
    ("person.job_title", GeneratorKind::FieldValue(FieldType::JobTitle)),
    ("internet.email", GeneratorKind::FieldValue(FieldType::Email)),
    ("internet.username", GeneratorKind::FieldValue(FieldType::Username)),
    ("internet.password", GeneratorKind::FieldValue(FieldType::Password)),
    ("internet.url", GeneratorKind::FieldValue(FieldType::Website)),
    ("phone.number", GeneratorKind::FieldValue(FieldType::Phone)),
    ("address.street", GeneratorKind::FieldValue(FieldType::Address1)),
    ("address.city", GeneratorKind::FieldValue(FieldType::City)),
    ("address.state", GeneratorKind::FieldValue(FieldType::State)),
    ("address.zip", GeneratorKind::FieldValue(FieldType::PostalCode)),
    ("address.country", GeneratorKind::FieldValue(FieldType::Country)),
    ("company.name", GeneratorKind::FieldValue(FieldType::Company)),
    ("date.birthday", GeneratorKind::FieldValue(FieldType::BirthDate)),
    ("number.integer", GeneratorKind::Number),
    ("lorem.word", GeneratorKind::Word),
    ("lorem.sentence", GeneratorKind::Sentence),
];

/// Exact lookup; `None` means the path was never registered.
pub fn lookup(path: &str) -> Option<GeneratorKind> {
    REGISTRY.iter().find(|(p, _)| *p == path).map(|(_, kind)| *kind)
}

/// Lookup with the documented fallback: unknown paths degrade to text.
pub fn resolve(path: &str) -> GeneratorKind {
    lookup(path).unwrap_or_else(|| {
        warn!("unknown generator path '{path}', falling back to text");
        GeneratorKind::Text
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_resolve_to_their_kind() {
        assert_eq!(lookup("internet.email"), Some(GeneratorKind::FieldValue(FieldType::Email)));
        assert_eq!(lookup("lorem.word"), Some(GeneratorKind::Word));
    }

    #[test]
    fn unknown_path_falls_back_to_text() {
        assert_eq!(lookup("no.such.generator"), None);
        assert_eq!(resolve("no.such.generator"), GeneratorKind::Text);
    }

    #[test]
    fn registry_paths_are_unique() {
        for (idx, (path, _)) in REGISTRY.iter().enumerate() {
            assert!(
                !REGISTRY[idx + 1..].iter().any(|(other, _)| other == path),
                "duplicate registry path {path}"
            );
        }
    }
}
