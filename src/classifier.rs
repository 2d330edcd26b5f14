//! Classification orchestration.
//!
//! One fixed priority policy for every field kind: a user override always
//! wins, a non-generic rule-table verdict comes next, the heuristic
//! fallback only ever sees genuinely ambiguous text fields, and whatever
//! is left lands on the generic default. The policy is a hard contract —
//! a heuristic guess at 0.97 still loses to an override, and a confident
//! rule match is never second-guessed.
//!
//! The orchestrator also owns the signal cache for the current fill pass;
//! callers must invoke [`Classifier::end_pass`] between passes.

use chrono::Datelike;
use log::{debug, warn};
use rand::Rng;
use serde::Serialize;

use crate::{
    field::{FieldHandle, FieldType, NativeKind},
    generators::{self, GeneratorKind},
    heuristic,
    overrides::{self, RuleAction},
    rules,
    select::{self, AgeWindow, OptionPick},
    settings::Settings,
    signals::SignalCache,
};

/// Which stage produced a classification. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Override,
    Rules,
    SelectRules,
    Heuristic,
    Default,
}

/// Final verdict for one field.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub source: Source,
    /// Present when an override rule matched; carries its action payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<RuleAction>,
}

impl Classification {
    fn plain(field_type: FieldType, source: Source) -> Self {
        Self { field_type, confidence: None, source, action: None }
    }
}

/// Stateful classifier for one fill pass.
#[derive(Debug)]
pub struct Classifier {
    settings: Settings,
    cache: SignalCache,
}

impl Classifier {
    pub fn new(settings: Settings) -> Self {
        Self { settings: settings.clamped(), cache: SignalCache::new() }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Clears per-pass state. Must run between fill passes so attribute
    /// changes on reused handles are observed.
    pub fn end_pass(&mut self) {
        debug!("clearing signal cache ({} entries)", self.cache.len());
        self.cache.clear();
    }

    /// The age window used for year/age selects, anchored to today.
    pub fn age_window(&self) -> AgeWindow {
        AgeWindow {
            min_age: self.settings.min_age,
            max_age: self.settings.max_age,
            current_year: chrono::Local::now().year(),
        }
    }

    /// Classifies one field through the full priority chain.
    pub fn classify(&mut self, handle: &FieldHandle) -> Classification {
        let signals = self.cache.signals(handle);

        if let Some(rule) = overrides::find_match(
            &self.settings.custom_rules,
            handle,
            &signals.label,
            self.settings.match_labels,
        ) {
            let field_type = match &rule.action {
                RuleAction::Generator { path } => match generators::resolve(path) {
                    GeneratorKind::FieldValue(t) => t,
                    _ => FieldType::Text,
                },
                _ => FieldType::Text,
            };
            return Classification {
                field_type,
                confidence: None,
                source: Source::Override,
                action: Some(rule.action.clone()),
            };
        }

        if handle.kind == NativeKind::Select {
            let (field_type, confidence) = select::classify(&signals, &handle.options);
            if field_type != FieldType::Unknown {
                return Classification {
                    field_type,
                    confidence: Some(confidence),
                    source: Source::SelectRules,
                    action: None,
                };
            }
            return Classification::plain(FieldType::Unknown, Source::Default);
        }

        let ruled = rules::classify(&signals);
        if !ruled.is_generic() {
            return Classification::plain(ruled, Source::Rules);
        }

        if signals.kind.is_text_like() && self.settings.heuristics_enabled {
            match heuristic::classify(&signals, self.settings.threshold_fraction()) {
                Ok(Some((field_type, confidence))) => {
                    return Classification {
                        field_type,
                        confidence: Some(confidence),
                        source: Source::Heuristic,
                        action: None,
                    };
                }
                Ok(None) => {}
                Err(err) => {
                    // A broken pattern table must never take the pass down.
                    warn!("heuristic classifier unavailable: {err:#}");
                }
            }
        }

        Classification::plain(ruled, Source::Default)
    }

    /// Classifies a select and recommends a concrete option for it.
    pub fn recommend_option<R: Rng>(
        &mut self,
        handle: &FieldHandle,
        rng: &mut R,
    ) -> Option<OptionPick> {
        let verdict = self.classify(handle);
        select::pick_option(verdict.field_type, &handle.options, self.age_window(), rng)
    }
}
