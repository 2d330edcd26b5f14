//! Heuristic fallback classification.
//!
//! This stage only sees fields the rule tables gave up on: free-text inputs
//! whose signals contain no known keyword. Signal text is tokenized and
//! scored against a weighted pattern table; surrounding context (sibling
//! field names, label text) contributes a smaller bonus, and an ensemble
//! step lifts confidence when independent evidence corroborates the guess.
//! Confidence is capped below certainty on principle: a heuristic is never
//! allowed to look as sure as an explicit rule.

use anyhow::{Result, ensure};
use itertools::Itertools;

use crate::{
    field::{FieldType, NativeKind},
    signals::FieldSignals,
};

/// Hard ceiling on heuristic confidence.
const CONFIDENCE_CAP: f64 = 0.98;
/// Bonus when a context keyword appears near the field.
const CONTEXT_BONUS: f64 = 0.15;
/// Boost when the native kind already hints at the same family.
const KIND_AGREEMENT_BOOST: f64 = 0.10;
/// Boost when a placeholder contains "@" and the guess is email.
const AT_SIGN_BOOST: f64 = 0.10;
/// Boost when two or more independent signals matched.
const MULTI_SIGNAL_BOOST: f64 = 0.05;

/// One weighted training pattern.
#[derive(Debug)]
pub struct TrainingPattern {
    pub field_type: FieldType,
    /// Substrings looked up inside signal tokens.
    pub substrings: &'static [&'static str],
    /// Pattern weight in [0, 1].
    pub weight: f64,
    /// Keywords that boost confidence when found in surrounding context.
    pub context: &'static [&'static str],
}

pub const TRAINING_PATTERNS: &[TrainingPattern] = &[
    TrainingPattern {
        field_type: FieldType::Email,
        substrings: &["mail", "eml", "correo"],
        weight: 0.90,
        context: &["contact", "newsletter", "subscribe"],
    },
    TrainingPattern {
        field_type: FieldType::Phone,
        substrings: &["phone", "fone", "mobile", "msisdn"],
        weight: 0.85,
        context: &["contact", "extension", "country code"],
    },
    TrainingPattern {
        field_type: FieldType::BirthDate,
        substrings: &["birth", "bday", "dob"],
        weight: 0.80,
        context: &["age", "year", "calendar"],
    },
    TrainingPattern {
        field_type: FieldType::FirstName,
        substrings: &["fname", "given", "firstn"],
        weight: 0.80,
        context: &["lastname", "surname", "lname"],
    },
    TrainingPattern {
        field_type: FieldType::LastName,
        substrings: &["lname", "surname", "lastn"],
        weight: 0.80,
        context: &["firstname", "given", "fname"],
    },
    TrainingPattern {
        field_type: FieldType::PostalCode,
        substrings: &["zip", "postal", "postcode"],
        weight: 0.80,
        context: &["city", "state", "country"],
    },
    TrainingPattern {
        field_type: FieldType::Password,
        substrings: &["pass", "pwd", "secret"],
        weight: 0.75,
        context: &["login", "username", "confirm"],
    },
    TrainingPattern {
        field_type: FieldType::Address1,
        substrings: &["street", "addr"],
        weight: 0.70,
        context: &["city", "zip", "apartment"],
    },
    TrainingPattern {
        field_type: FieldType::City,
        substrings: &["city", "town"],
        weight: 0.70,
        context: &["zip", "state", "street"],
    },
    TrainingPattern {
        field_type: FieldType::CardNumber,
        substrings: &["card", "ccnum"],
        weight: 0.65,
        context: &["cvv", "cvc", "expiry"],
    },
    TrainingPattern {
        field_type: FieldType::Username,
        substrings: &["user", "login", "nick"],
        weight: 0.60,
        context: &["password", "register", "account"],
    },
    TrainingPattern {
        field_type: FieldType::Website,
        substrings: &["url", "site", "web"],
        weight: 0.60,
        context: &["http", "www"],
    },
    TrainingPattern {
        field_type: FieldType::Company,
        substrings: &["company", "org", "firm"],
        weight: 0.60,
        context: &["position", "title", "vat"],
    },
];

/// Splits signal text into lowercase alphanumeric tokens.
fn tokenize<'a>(sources: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    sources
        .into_iter()
        .flat_map(|s| s.split(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .unique()
        .collect()
}

fn kind_agrees(kind: NativeKind, field_type: FieldType) -> bool {
    matches!(
        (kind, field_type),
        (NativeKind::Tel, FieldType::Phone)
            | (NativeKind::Email, FieldType::Email)
            | (NativeKind::Url, FieldType::Website)
            | (NativeKind::Password, FieldType::Password)
    )
}

/// Counts how many distinct signal fields contain any matched substring,
/// for the corroboration boost.
fn matching_signal_fields(signals: &FieldSignals, pattern: &TrainingPattern) -> usize {
    signals
        .primary()
        .iter()
        .filter(|s| !s.is_empty() && pattern.substrings.iter().any(|sub| s.contains(sub)))
        .count()
}

/// Scores all patterns and returns the best guess at or above `threshold`
/// (a [0,1] confidence). Fields with no usable tokens score nothing.
pub fn classify(signals: &FieldSignals, threshold: f64) -> Result<Option<(FieldType, f64)>> {
    let tokens = tokenize(
        signals
            .primary()
            .into_iter()
            .chain(signals.classes.iter().map(|c| c.as_str()))
            .chain(signals.data_attributes.iter().map(|(k, _)| k.as_str()))
            .chain(signals.data_attributes.iter().map(|(_, v)| v.as_str())),
    );
    if tokens.is_empty() {
        return Ok(None);
    }
    let context_tokens = tokenize(
        signals
            .context
            .iter()
            .map(|s| s.as_str())
            .chain([signals.label.as_str()]),
    );

    let mut best: Option<(FieldType, f64)> = None;
    for pattern in TRAINING_PATTERNS {
        ensure!(
            (0.0..=1.0).contains(&pattern.weight),
            "Training pattern for {} carries weight {} outside [0,1]",
            pattern.field_type,
            pattern.weight
        );
        let hits = pattern
            .substrings
            .iter()
            .filter(|sub| tokens.iter().any(|t| t.contains(*sub)))
            .count();
        if hits == 0 {
            continue;
        }
        let ratio = hits as f64 / pattern.substrings.len() as f64;
        // One solid substring hit is already strong evidence; further
        // variants of the same pattern only firm it up.
        let mut score = pattern.weight * (0.6 + 0.4 * ratio);
        if pattern
            .context
            .iter()
            .any(|c| context_tokens.iter().any(|t| t.contains(c)))
        {
            score += CONTEXT_BONUS;
        }
        if kind_agrees(signals.kind, pattern.field_type) {
            score += KIND_AGREEMENT_BOOST;
        }
        if pattern.field_type == FieldType::Email && signals.placeholder.contains('@') {
            score += AT_SIGN_BOOST;
        }
        if matching_signal_fields(signals, pattern) >= 2 {
            score += MULTI_SIGNAL_BOOST;
        }
        let score = score.min(CONFIDENCE_CAP);
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((pattern.field_type, score));
        }
    }

    Ok(best.filter(|(_, score)| *score >= threshold))
}
