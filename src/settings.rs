//! Classifier settings.
//!
//! Settings arrive from the storage collaborator as YAML. Numeric knobs are
//! clamped to their documented bounds at load time so the rest of the crate
//! never has to re-check them.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::overrides::CustomRule;

/// Confidence threshold bounds, on the percent scale the settings UI uses.
pub const MIN_THRESHOLD: u8 = 30;
pub const MAX_THRESHOLD: u8 = 95;
/// Age bounds for date-like fields.
pub const MIN_AGE_BOUND: u32 = 1;
pub const MAX_AGE_BOUND: u32 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// BCP47-ish locale tag; informational, normalization tries every table.
    pub locale: String,
    /// Whether the heuristic fallback classifier runs at all.
    pub heuristics_enabled: bool,
    /// Minimum heuristic confidence, percent, clamped to 30..=95.
    pub confidence_threshold: u8,
    /// Age window for year/age selects, clamped to 1..=120.
    pub min_age: u32,
    pub max_age: u32,
    /// Whether override patterns may also match label-like text.
    pub match_labels: bool,
    /// User-authored override rules, evaluated in author order.
    pub custom_rules: Vec<CustomRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            heuristics_enabled: true,
            confidence_threshold: 60,
            min_age: 18,
            max_age: 65,
            match_labels: false,
            custom_rules: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening settings file {path:?}"))?;
        let reader = BufReader::new(file);
        let settings: Settings =
            serde_yaml::from_reader(reader).context("Parsing settings YAML")?;
        Ok(settings.clamped())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating settings file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing settings YAML")
    }

    /// Forces every numeric knob into bounds; swapped age limits are
    /// reordered rather than rejected.
    pub fn clamped(mut self) -> Self {
        self.confidence_threshold = self.confidence_threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
        self.min_age = self.min_age.clamp(MIN_AGE_BOUND, MAX_AGE_BOUND);
        self.max_age = self.max_age.clamp(MIN_AGE_BOUND, MAX_AGE_BOUND);
        if self.min_age > self.max_age {
            std::mem::swap(&mut self.min_age, &mut self.max_age);
        }
        self
    }

    /// The threshold on the [0,1] scale the heuristic classifier expects.
    pub fn threshold_fraction(&self) -> f64 {
        f64::from(self.confidence_threshold) / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_bounds() {
        let settings = Settings::default().clamped();
        assert_eq!(settings.confidence_threshold, 60);
        assert_eq!((settings.min_age, settings.max_age), (18, 65));
        assert!(settings.heuristics_enabled);
    }

    #[test]
    fn threshold_is_clamped_both_ways() {
        let low = Settings { confidence_threshold: 10, ..Default::default() }.clamped();
        assert_eq!(low.confidence_threshold, MIN_THRESHOLD);
        let high = Settings { confidence_threshold: 99, ..Default::default() }.clamped();
        assert_eq!(high.confidence_threshold, MAX_THRESHOLD);
        assert!((high.threshold_fraction() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn swapped_ages_are_reordered() {
        let settings = Settings { min_age: 70, max_age: 30, ..Default::default() }.clamped();
        assert_eq!((settings.min_age, settings.max_age), (30, 70));
        let wild = Settings { min_age: 0, max_age: 500, ..Default::default() }.clamped();
        assert_eq!((wild.min_age, wild.max_age), (MIN_AGE_BOUND, MAX_AGE_BOUND));
    }
}
