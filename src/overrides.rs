//! User-authored override rules.
//!
//! Overrides pre-empt every automatic classifier: the first rule whose
//! pattern matches a field wins outright. Patterns come in three shapes,
//! told apart by their leading characters — `.foo` matches class tokens,
//! `[attr="value"]` matches a named attribute, and anything else matches
//! name/id as a substring. All three accept `*` at either end for
//! prefix/suffix/contains semantics.
//!
//! Rules are authored in YAML and cannot be trusted: regex payloads are
//! checked for length and catastrophic-backtracking shapes before any use,
//! and a rule that fails validation simply never matches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::FieldHandle;

/// Longest regex payload accepted from a rule file.
const MAX_REGEX_LEN: usize = 256;

#[derive(Debug, Error, PartialEq)]
pub enum PatternError {
    #[error("regex exceeds {MAX_REGEX_LEN} characters ({0})")]
    TooLong(usize),
    #[error("regex contains a nested quantifier shape: {0}")]
    NestedQuantifier(String),
    #[error("regex failed to parse: {0}")]
    Invalid(String),
}

/// What to do with a field once its rule matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuleAction {
    /// Pick one of an enumerated value list.
    Values { values: Vec<String> },
    /// Generate a value from a regex pattern.
    Regex { pattern: String },
    /// Delegate to a named generator by dotted path.
    Generator { path: String },
}

/// One user-authored override rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomRule {
    /// Match pattern; empty patterns never match.
    #[serde(default)]
    pub pattern: String,
    pub action: RuleAction,
}

/// Wildcard semantics: `*x*` contains, `x*` prefix, `*x` suffix. A bare
/// pattern falls back to `default_contains` (substring patterns are
/// contains-matches, class/attribute values are exact).
fn wildcard_matches(pattern: &str, candidate: &str, default_contains: bool) -> bool {
    let starts = pattern.starts_with('*');
    let ends = pattern.len() > 1 && pattern.ends_with('*');
    let core = pattern.trim_matches('*');
    if core.is_empty() {
        // "*" or "**" matches anything non-empty.
        return (starts || ends) && !candidate.is_empty();
    }
    match (starts, ends) {
        (true, true) => candidate.contains(core),
        (false, true) => candidate.starts_with(core),
        (true, false) => candidate.ends_with(core),
        (false, false) => {
            if default_contains {
                candidate.contains(core)
            } else {
                candidate == core
            }
        }
    }
}

/// Parses the `[name="value"]` shape; returns the attribute name and the
/// (possibly wildcarded) expected value.
fn parse_attribute_pattern(pattern: &str) -> Option<(String, String)> {
    let inner = pattern.strip_prefix('[')?.strip_suffix(']')?;
    let (name, rest) = inner.split_once('=')?;
    let name = name.trim();
    let value = rest.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))?;
    if name.is_empty() {
        return None;
    }
    Some((name.to_lowercase(), value.to_lowercase()))
}

impl CustomRule {
    /// True when this rule's pattern matches the handle. `label` is the
    /// resolved label text, consulted together with the other label-like
    /// sources only when `match_labels` is set.
    pub fn matches(&self, handle: &FieldHandle, label: &str, match_labels: bool) -> bool {
        let pattern = self.pattern.trim();
        if pattern.is_empty() {
            return false;
        }
        if !self.action_is_safe() {
            return false;
        }
        if let Some(class_pattern) = pattern.strip_prefix('.') {
            let lowered = class_pattern.to_lowercase();
            return handle
                .classes
                .iter()
                .any(|c| wildcard_matches(&lowered, &c.to_lowercase(), false));
        }
        if pattern.starts_with('[') {
            return match parse_attribute_pattern(pattern) {
                Some((name, value)) => handle
                    .attribute(&name)
                    .map(|actual| wildcard_matches(&value, &actual.to_lowercase(), false))
                    .unwrap_or(false),
                None => false,
            };
        }
        let lowered = pattern.to_lowercase();
        let mut pool: Vec<&str> = vec![&handle.name, &handle.element_id];
        if match_labels {
            pool.extend([label, handle.aria_label.as_str(), handle.placeholder.as_str(), handle.title.as_str()]);
        }
        pool.iter()
            .filter(|candidate| !candidate.is_empty())
            .any(|candidate| wildcard_matches(&lowered, &candidate.to_lowercase(), true))
    }

    /// A rule with an unsafe regex payload is treated as a non-match.
    fn action_is_safe(&self) -> bool {
        match &self.action {
            RuleAction::Regex { pattern } => validate_regex(pattern).is_ok(),
            _ => true,
        }
    }
}

/// Rejects regex payloads before they reach any engine: over-long input
/// and quantified groups that are themselves quantified (the `(x+)+`
/// family) never validate.
pub fn validate_regex(pattern: &str) -> Result<(), PatternError> {
    if pattern.len() > MAX_REGEX_LEN {
        return Err(PatternError::TooLong(pattern.len()));
    }
    let chars: Vec<char> = pattern.chars().collect();
    let mut group_starts: Vec<usize> = Vec::new();
    let mut escaped = false;
    for (idx, &c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => group_starts.push(idx),
            ')' => {
                let Some(start) = group_starts.pop() else { continue };
                let followed_by_quantifier = matches!(chars.get(idx + 1), Some('+' | '*' | '{'));
                if !followed_by_quantifier {
                    continue;
                }
                let body: String = chars[start + 1..idx].iter().collect();
                if body.contains('+') || body.contains('*') || body.contains('{') {
                    return Err(PatternError::NestedQuantifier(
                        chars[start..=idx.min(chars.len() - 1)].iter().collect(),
                    ));
                }
            }
            _ => {}
        }
    }
    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|err| PatternError::Invalid(err.to_string()))
}

/// Evaluates rules in author order and returns the first match.
pub fn find_match<'a>(
    rules: &'a [CustomRule],
    handle: &FieldHandle,
    label: &str,
    match_labels: bool,
) -> Option<&'a CustomRule> {
    rules.iter().find(|rule| rule.matches(handle, label, match_labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldId, NativeKind, Rect};

    fn handle(name: &str) -> FieldHandle {
        FieldHandle {
            id: FieldId(4),
            kind: NativeKind::Text,
            name: name.to_string(),
            element_id: String::new(),
            placeholder: String::new(),
            aria_label: String::new(),
            title: String::new(),
            label: String::new(),
            classes: Vec::new(),
            data_attributes: Default::default(),
            attributes: Default::default(),
            rect: Rect::default(),
            nearby_text: Vec::new(),
            sibling_names: Vec::new(),
            options: Vec::new(),
        }
    }

    fn rule(pattern: &str) -> CustomRule {
        CustomRule {
            pattern: pattern.to_string(),
            action: RuleAction::Values { values: vec!["x".into()] },
        }
    }

    #[test]
    fn wildcard_prefix_suffix_and_contains() {
        assert!(rule("*mail*").matches(&handle("user_email_primary"), "", false));
        assert!(!rule("email*").matches(&handle("user_email"), "", false));
        assert!(rule("email*").matches(&handle("email_user"), "", false));
        assert!(rule("*email").matches(&handle("user_email"), "", false));
        assert!(!rule("*email").matches(&handle("email_user"), "", false));
        // Bare substring patterns are contains-matches.
        assert!(rule("mail").matches(&handle("user_email"), "", false));
    }

    #[test]
    fn class_patterns_match_class_tokens_exactly_unless_starred() {
        let mut h = handle("f");
        h.classes = vec!["form-control".into(), "js-email-input".into()];
        assert!(rule(".form-control").matches(&h, "", false));
        assert!(!rule(".form").matches(&h, "", false));
        assert!(rule(".js-*").matches(&h, "", false));
        assert!(rule(".*email*").matches(&h, "", false));
    }

    #[test]
    fn attribute_patterns_match_named_attribute_values() {
        let mut h = handle("f");
        h.attributes.insert("autocomplete".into(), "shipping postal-code".into());
        h.data_attributes.insert("role".into(), "zipfield".into());
        assert!(rule("[autocomplete=\"*postal*\"]").matches(&h, "", false));
        assert!(rule("[data-role='zipfield']").matches(&h, "", false));
        assert!(!rule("[autocomplete=\"postal\"]").matches(&h, "", false));
        assert!(!rule("[missing=\"x\"]").matches(&h, "", false));
        // Malformed shapes never match and never error.
        assert!(!rule("[autocomplete=postal]").matches(&h, "", false));
    }

    #[test]
    fn label_sources_join_the_pool_only_when_enabled() {
        let mut h = handle("f_17");
        h.placeholder = "Your email".into();
        assert!(!rule("*email*").matches(&h, "", false));
        assert!(rule("*email*").matches(&h, "", true));
        assert!(rule("*phone*").matches(&h, "Phone number", true));
        assert!(!rule("*phone*").matches(&h, "Phone number", false));
    }

    #[test]
    fn empty_pattern_is_skipped_not_an_error() {
        let rules = vec![rule(""), rule("   "), rule("*mail*")];
        let h = handle("email");
        let found = find_match(&rules, &h, "", false).expect("third rule");
        assert_eq!(found.pattern, "*mail*");
    }

    #[test]
    fn first_matching_rule_wins_in_author_order() {
        let rules = vec![rule("*mail*"), rule("email*")];
        let h = handle("email_field");
        let found = find_match(&rules, &h, "", false).expect("match");
        assert_eq!(found.pattern, "*mail*");
    }

    #[test]
    fn unsafe_regex_payload_disables_the_rule() {
        let bad = CustomRule {
            pattern: "*mail*".into(),
            action: RuleAction::Regex { pattern: "(a+)+$".into() },
        };
        let good = CustomRule {
            pattern: "*mail*".into(),
            action: RuleAction::Regex { pattern: "[a-z]{3,8}".into() },
        };
        let h = handle("email");
        assert!(!bad.matches(&h, "", false));
        assert!(good.matches(&h, "", false));
        let rules = [bad, good.clone()];
        let found = find_match(&rules, &h, "", false).expect("safe rule");
        assert_eq!(*found, good);
    }

    #[test]
    fn regex_validation_rejects_the_usual_suspects() {
        assert!(matches!(validate_regex(&"a".repeat(300)), Err(PatternError::TooLong(300))));
        assert!(matches!(validate_regex("(a+)+"), Err(PatternError::NestedQuantifier(_))));
        assert!(matches!(validate_regex("(x*)*"), Err(PatternError::NestedQuantifier(_))));
        assert!(matches!(validate_regex("(a{2,4})+"), Err(PatternError::NestedQuantifier(_))));
        assert!(matches!(validate_regex("[unclosed"), Err(PatternError::Invalid(_))));
        assert!(validate_regex("(abc)+def").is_ok());
        assert!(validate_regex("^[a-z0-9._%+-]+@example\\.com$").is_ok());
    }
}
