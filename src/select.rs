//! Dropdown classification and option selection.
//!
//! Selects carry a signal text fields do not have: their option lists. The
//! classifier here scores each [`SelectDetectionRule`] from three cues —
//! name/id/label keywords (the dominant weight), option-text keywords (at
//! least two distinct hits, so one stray "male" in a country list does not
//! flip the verdict), and option-count plausibility. The best-scoring rule
//! wins only when the name component matched; otherwise the select stays
//! unknown.
//!
//! The smart selector then turns a classified type into a concrete option:
//! year and age dropdowns are constrained to the configured age window,
//! a few types carry preferred values, and everything else picks uniformly
//! among non-placeholder options.

use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::{
    field::{FieldType, SelectOption},
    signals::FieldSignals,
};

const NAME_WEIGHT: f64 = 0.60;
const OPTION_WEIGHT: f64 = 0.25;
const COUNT_WEIGHT: f64 = 0.15;
/// Minimum score for a verdict; equals the name component alone.
const MIN_SCORE: f64 = NAME_WEIGHT;
/// Distinct option-keyword hits required before option text counts.
const MIN_OPTION_HITS: usize = 2;

/// One entry of the select detection table.
#[derive(Debug)]
pub struct SelectDetectionRule {
    pub field_type: FieldType,
    /// Keywords matched against name/id/label signals.
    pub name_keywords: &'static [&'static str],
    /// Keywords matched against option text.
    pub option_keywords: &'static [&'static str],
    /// Inclusive plausible option-count range.
    pub count_range: Option<(usize, usize)>,
}

pub const SELECT_RULES: &[SelectDetectionRule] = &[
    SelectDetectionRule {
        field_type: FieldType::Country,
        name_keywords: &["country", "nation"],
        option_keywords: &[
            "united states",
            "united kingdom",
            "germany",
            "france",
            "canada",
            "australia",
            "japan",
            "brazil",
        ],
        count_range: Some((30, 300)),
    },
    SelectDetectionRule {
        field_type: FieldType::State,
        name_keywords: &["state", "province", "region"],
        option_keywords: &["alabama", "california", "texas", "new york", "ontario", "quebec"],
        count_range: Some((10, 80)),
    },
    SelectDetectionRule {
        field_type: FieldType::Gender,
        name_keywords: &["gender", "sex"],
        option_keywords: &["male", "female", "non-binary", "prefer not"],
        count_range: Some((2, 10)),
    },
    SelectDetectionRule {
        field_type: FieldType::Salutation,
        name_keywords: &["salutation", "title", "prefix"],
        option_keywords: &["mr", "mrs", "ms", "dr", "prof"],
        count_range: Some((2, 12)),
    },
    SelectDetectionRule {
        field_type: FieldType::ExpiryMonth,
        name_keywords: &["exp_month", "expmonth", "expiry_month", "expiration_month"],
        option_keywords: &[],
        count_range: Some((12, 13)),
    },
    SelectDetectionRule {
        field_type: FieldType::ExpiryYear,
        name_keywords: &["exp_year", "expyear", "expiry_year", "expiration_year"],
        option_keywords: &[],
        count_range: Some((5, 30)),
    },
    SelectDetectionRule {
        field_type: FieldType::Month,
        name_keywords: &["month"],
        option_keywords: &["january", "february", "march", "april", "may", "june", "december"],
        count_range: Some((12, 13)),
    },
    SelectDetectionRule {
        field_type: FieldType::Day,
        name_keywords: &["day"],
        option_keywords: &[],
        count_range: Some((28, 32)),
    },
    SelectDetectionRule {
        field_type: FieldType::Year,
        name_keywords: &["year", "birthyear", "birth_year"],
        option_keywords: &[],
        count_range: Some((20, 150)),
    },
    SelectDetectionRule {
        field_type: FieldType::Age,
        name_keywords: &["age"],
        option_keywords: &[],
        count_range: Some((20, 110)),
    },
];

/// Placeholder option text, across supported languages.
const PLACEHOLDER_TOKENS: &[&str] = &[
    "select",
    "choose",
    "please",
    "pick one",
    "wählen",
    "bitte",
    "choisir",
    "sélection",
    "seleccion",
    "selecion",
    "kies",
    "wybierz",
    "выберите",
    "選択",
    "请选择",
];

/// Preferred option substrings per type, consulted before a uniform pick.
const PREFERRED_VALUES: &[(FieldType, &[&str])] = &[
    (FieldType::Country, &["united states", "usa", "germany", "united kingdom"]),
    (FieldType::Gender, &["male", "female"]),
    (FieldType::Salutation, &["mr", "ms"]),
];

/// Scores every rule against the signals and option list; returns the
/// winner and its score as confidence, or `Unknown` when nothing clears
/// the minimum.
pub fn classify(signals: &FieldSignals, options: &[SelectOption]) -> (FieldType, f64) {
    let lowered: Vec<String> = options.iter().map(|o| o.text.to_lowercase()).collect();
    let mut best: Option<(FieldType, f64)> = None;
    for rule in SELECT_RULES {
        let mut score = 0.0;
        if rule.name_keywords.iter().any(|k| signals.any_contains(k)) {
            score += NAME_WEIGHT;
        }
        if !rule.option_keywords.is_empty() {
            let hits = rule
                .option_keywords
                .iter()
                .filter(|k| lowered.iter().any(|text| text.contains(*k)))
                .count();
            if hits >= MIN_OPTION_HITS {
                score += OPTION_WEIGHT;
            }
        }
        if let Some((lo, hi)) = rule.count_range
            && (lo..=hi).contains(&options.len())
        {
            score += COUNT_WEIGHT;
        }
        // Strict comparison keeps ties on the first-declared rule.
        if best.map(|(_, s)| score > s).unwrap_or(score > 0.0) {
            best = Some((rule.field_type, score));
        }
    }
    match best {
        Some((field_type, score)) if score >= MIN_SCORE => (field_type, score.min(1.0)),
        _ => (FieldType::Unknown, 0.0),
    }
}

/// Why the smart selector picked the option it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PickReason {
    AgeWindow,
    Preferred,
    Random,
}

/// A concrete recommendation for a classified select.
#[derive(Debug, Clone, Serialize)]
pub struct OptionPick {
    pub value: String,
    pub text: String,
    pub reason: PickReason,
}

/// Age constraints resolved against the calendar.
#[derive(Debug, Clone, Copy)]
pub struct AgeWindow {
    pub min_age: u32,
    pub max_age: u32,
    pub current_year: i32,
}

impl AgeWindow {
    /// Inclusive birth-year range implied by the ages.
    pub fn year_range(&self) -> (i32, i32) {
        (
            self.current_year - self.max_age as i32,
            self.current_year - self.min_age as i32,
        )
    }
}

fn is_placeholder(option: &SelectOption) -> bool {
    if option.disabled {
        return true;
    }
    let value = option.value.trim();
    if value.is_empty() || value == "0" {
        return true;
    }
    let text = option.text.trim().to_lowercase();
    text.is_empty()
        || text.starts_with("--")
        || PLACEHOLDER_TOKENS.iter().any(|token| text.contains(token))
}

fn numeric_value(option: &SelectOption) -> Option<i32> {
    option
        .value
        .trim()
        .parse::<i32>()
        .or_else(|_| option.text.trim().parse::<i32>())
        .ok()
}

fn uniform_pick<'a, R: Rng>(candidates: &[&'a SelectOption], rng: &mut R) -> &'a SelectOption {
    candidates[rng.gen_range(0..candidates.len())]
}

/// Picks an option for a classified select, or `None` when every option is
/// disabled or placeholder-looking.
pub fn pick_option<R: Rng>(
    field_type: FieldType,
    options: &[SelectOption],
    window: AgeWindow,
    rng: &mut R,
) -> Option<OptionPick> {
    let eligible: Vec<&SelectOption> = options.iter().filter(|o| !is_placeholder(o)).collect();
    if eligible.is_empty() {
        return None;
    }

    match field_type {
        FieldType::Year | FieldType::BirthDate => {
            let (lo, hi) = window.year_range();
            let in_window: Vec<&SelectOption> = eligible
                .iter()
                .copied()
                .filter(|o| numeric_value(o).map(|y| (lo..=hi).contains(&y)).unwrap_or(false))
                .collect();
            if !in_window.is_empty() {
                let chosen = uniform_pick(&in_window, rng);
                return Some(OptionPick {
                    value: chosen.value.clone(),
                    text: chosen.text.clone(),
                    reason: PickReason::AgeWindow,
                });
            }
            debug!("no year option inside {lo}..={hi}, falling back to uniform pick");
        }
        FieldType::Age => {
            let (lo, hi) = (window.min_age as i32, window.max_age as i32);
            let in_window: Vec<&SelectOption> = eligible
                .iter()
                .copied()
                .filter(|o| numeric_value(o).map(|a| (lo..=hi).contains(&a)).unwrap_or(false))
                .collect();
            if !in_window.is_empty() {
                let chosen = uniform_pick(&in_window, rng);
                return Some(OptionPick {
                    value: chosen.value.clone(),
                    text: chosen.text.clone(),
                    reason: PickReason::AgeWindow,
                });
            }
        }
        _ => {}
    }

    if let Some((_, substrings)) = PREFERRED_VALUES.iter().find(|(t, _)| *t == field_type) {
        let preferred: Vec<&SelectOption> = eligible
            .iter()
            .copied()
            .filter(|o| {
                let text = o.text.to_lowercase();
                let value = o.value.to_lowercase();
                substrings.iter().any(|s| text.contains(s) || value.contains(s))
            })
            .collect();
        if !preferred.is_empty() {
            let chosen = uniform_pick(&preferred, rng);
            return Some(OptionPick {
                value: chosen.value.clone(),
                text: chosen.text.clone(),
                reason: PickReason::Preferred,
            });
        }
    }

    let chosen = uniform_pick(&eligible, rng);
    Some(OptionPick {
        value: chosen.value.clone(),
        text: chosen.text.clone(),
        reason: PickReason::Random,
    })
}
