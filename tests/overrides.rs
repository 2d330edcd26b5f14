//! Override rules loaded from YAML settings, end to end, plus property
//! checks for the pure matching and normalization functions.

use formsense::classifier::{Classifier, Source};
use formsense::field::{FieldHandle, FieldId, FieldType, NativeKind, Rect};
use formsense::locale;
use formsense::overrides::{CustomRule, RuleAction};
use formsense::settings::Settings;

mod common;
use common::TestWorkspace;

fn field(name: &str) -> FieldHandle {
    FieldHandle {
        id: FieldId(name.len() as u64),
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

#[test]
fn yaml_rules_survive_a_save_load_round_trip() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("settings.yaml");

    let settings = Settings {
        confidence_threshold: 70,
        match_labels: true,
        custom_rules: vec![
            CustomRule {
                pattern: "*promo*".into(),
                action: RuleAction::Values { values: vec!["SAVE10".into(), "SAVE20".into()] },
            },
            CustomRule {
                pattern: "[autocomplete=\"one-time-code\"]".into(),
                action: RuleAction::Regex { pattern: "[0-9]{6}".into() },
            },
            CustomRule {
                pattern: ".js-phone*".into(),
                action: RuleAction::Generator { path: "phone.number".into() },
            },
        ],
        ..Default::default()
    };
    settings.save(&path).expect("save settings");

    let loaded = Settings::load(&path).expect("load settings");
    assert_eq!(loaded.confidence_threshold, 70);
    assert!(loaded.match_labels);
    assert_eq!(loaded.custom_rules, settings.custom_rules);
}

#[test]
fn hand_written_yaml_parses_into_tagged_actions() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "settings.yaml",
        r#"
confidence_threshold: 55
custom_rules:
  - pattern: "*coupon*"
    action:
      kind: values
      values: ["WELCOME"]
  - pattern: "ref_code"
    action:
      kind: regex
      pattern: "[A-Z]{2}[0-9]{4}"
"#,
    );
    let settings = Settings::load(&path).expect("load settings");
    assert_eq!(settings.confidence_threshold, 55);
    assert_eq!(settings.custom_rules.len(), 2);
    assert!(matches!(settings.custom_rules[0].action, RuleAction::Values { .. }));
    assert!(matches!(settings.custom_rules[1].action, RuleAction::Regex { .. }));
}

#[test]
fn loaded_rules_drive_classification() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "settings.yaml",
        r#"
custom_rules:
  - pattern: "*voucher*"
    action:
      kind: values
      values: ["GIFT2026"]
  - pattern: "*email*"
    action:
      kind: generator
      path: "internet.email"
"#,
    );
    let settings = Settings::load(&path).expect("load settings");
    let mut classifier = Classifier::new(settings);

    let verdict = classifier.classify(&field("gift_voucher_code"));
    assert_eq!(verdict.source, Source::Override);
    assert!(matches!(
        verdict.action,
        Some(RuleAction::Values { ref values }) if values == &["GIFT2026".to_string()]
    ));

    // The second rule resolves its generator path to a concrete type.
    let verdict = classifier.classify(&field("email"));
    assert_eq!(verdict.source, Source::Override);
    assert_eq!(verdict.field_type, FieldType::Email);

    // Untouched fields still flow through the automatic stages.
    let verdict = classifier.classify(&field("firstname"));
    assert_eq!(verdict.source, Source::Rules);
    assert_eq!(verdict.field_type, FieldType::FirstName);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn rule(pattern: &str) -> CustomRule {
        CustomRule {
            pattern: pattern.to_string(),
            action: RuleAction::Values { values: vec!["v".into()] },
        }
    }

    proptest! {
        #[test]
        fn starred_pattern_matches_any_name_containing_the_core(
            core in "[a-z]{2,8}",
            prefix in "[a-z0-9_]{0,6}",
            suffix in "[a-z0-9_]{0,6}",
        ) {
            let handle = field(&format!("{prefix}{core}{suffix}"));
            let pattern = format!("*{core}*");
            prop_assert!(rule(&pattern).matches(&handle, "", false));
        }

        #[test]
        fn prefix_pattern_never_matches_a_digit_prefixed_name(
            core in "[a-z]{2,8}",
            lead in "[0-9]{1,4}",
            tail in "[a-z0-9_]{0,6}",
        ) {
            let pattern = format!("{core}*");
            let suffixed = field(&format!("{core}{tail}"));
            let prefixed = field(&format!("{lead}{core}"));
            prop_assert!(rule(&pattern).matches(&suffixed, "", false));
            prop_assert!(!rule(&pattern).matches(&prefixed, "", false));
        }

        #[test]
        fn suffix_pattern_never_matches_a_digit_suffixed_name(
            core in "[a-z]{2,8}",
            lead in "[a-z0-9_]{0,6}",
            tail in "[0-9]{1,4}",
        ) {
            let pattern = format!("*{core}");
            let prefixed = field(&format!("{lead}{core}"));
            let suffixed = field(&format!("{core}{tail}"));
            prop_assert!(rule(&pattern).matches(&prefixed, "", false));
            prop_assert!(!rule(&pattern).matches(&suffixed, "", false));
        }

        #[test]
        fn normalization_is_idempotent_on_localized_names(
            phrases in proptest::collection::vec(
                prop::sample::select(vec![
                    "vorname", "nachname", "passwort", "postleitzahl",
                    "prenom", "nom de famille", "code postal",
                    "apellido", "contraseña", "telefono",
                    "sobrenome", "cidade", "achternaam", "leeftijd",
                    "nazwisko", "miasto",
                ]),
                1..5,
            ),
            separator in prop::sample::select(vec!["_", "-", ".", " "]),
        ) {
            let input = phrases.join(separator);
            let once = locale::normalize(&input).into_owned();
            let twice = locale::normalize(&once).into_owned();
            prop_assert_eq!(&once, &twice);
            // Every source phrase must have been consumed.
            for phrase in &phrases {
                prop_assert!(!once.contains(phrase), "'{}' survived in '{}'", phrase, once);
            }
        }
    }
}
