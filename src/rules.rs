//! Rule-based classification for text-like fields.
//!
//! Two fixed tables drive this stage. The native-kind table short-circuits
//! fields that already declare their intent (`type="email"` needs no
//! keyword scanning). The detection table is an ordered list of keyword
//! rules evaluated first-match-wins over the extracted signals; a rule can
//! name excluded types whose own match suppresses it, which is how
//! `first_name` and `last_name` take the generic name rule out of play.
//!
//! Table order is part of the observable contract. The email family sits
//! ahead of the address family on purpose: a label reading "email address"
//! classifies as email, and reordering here is a user-visible regression.

use crate::{
    field::{FieldType, NativeKind},
    signals::FieldSignals,
};

/// One entry of the ordered detection table.
#[derive(Debug)]
pub struct DetectionRule {
    pub field_type: FieldType,
    /// Substring keywords, matched against every signal and tail variant.
    pub keywords: &'static [&'static str],
    /// Keywords too short to match as substrings; these must equal a whole
    /// signal value or tail.
    pub exact: &'static [&'static str],
    /// Types whose own rule, when it also matches, suppresses this one.
    pub excluded: &'static [FieldType],
}

/// Native kinds that map straight to a canonical type.
const NATIVE_SHORTCUTS: &[(NativeKind, FieldType)] = &[
    (NativeKind::Email, FieldType::Email),
    (NativeKind::Tel, FieldType::Phone),
    (NativeKind::Url, FieldType::Website),
    (NativeKind::Date, FieldType::Date),
    (NativeKind::Month, FieldType::Month),
    (NativeKind::Week, FieldType::Date),
    (NativeKind::Time, FieldType::Time),
    (NativeKind::Color, FieldType::Color),
    (NativeKind::Password, FieldType::Password),
];

/// The ordered detection table. First satisfied rule wins.
pub const DETECTION_RULES: &[DetectionRule] = &[
    DetectionRule {
        field_type: FieldType::Email,
        keywords: &["email", "e-mail", "e_mail", "mail"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::FirstName,
        keywords: &[
            "firstname",
            "first_name",
            "first-name",
            "first name",
            "fname",
            "givenname",
            "given_name",
            "given-name",
            "forename",
        ],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::LastName,
        keywords: &[
            "lastname",
            "last_name",
            "last-name",
            "last name",
            "lname",
            "surname",
            "familyname",
            "family_name",
            "family-name",
        ],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Username,
        keywords: &["username", "user_name", "user-name", "userid", "user_id", "login", "nickname"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::CardNumber,
        keywords: &[
            "cardnumber",
            "card_number",
            "card-number",
            "creditcard",
            "credit_card",
            "credit-card",
            "ccnumber",
            "cc_number",
            "cc-number",
        ],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::CardCvc,
        keywords: &["cvv", "cvc", "security_code", "securitycode", "card_code"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::ExpiryMonth,
        keywords: &["exp_month", "exp-month", "expmonth", "expiry_month", "expirymonth", "expiration_month"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::ExpiryYear,
        keywords: &["exp_year", "exp-year", "expyear", "expiry_year", "expiryyear", "expiration_year"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::BirthDate,
        keywords: &["birthdate", "birthday", "birth_date", "birth-date", "dateofbirth", "date_of_birth", "dob"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Phone,
        keywords: &["phone", "telephone", "mobile", "cellphone", "cell_phone"],
        exact: &["tel", "cell"],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Company,
        keywords: &["company", "organization", "organisation", "employer", "business_name", "businessname"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::JobTitle,
        keywords: &["jobtitle", "job_title", "job-title", "occupation", "profession", "position"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::FullName,
        keywords: &["fullname", "full_name", "full-name", "full name", "name"],
        exact: &[],
        excluded: &[
            FieldType::FirstName,
            FieldType::LastName,
            FieldType::Username,
            FieldType::Company,
        ],
    },
    DetectionRule {
        field_type: FieldType::Address2,
        keywords: &["address2", "address_2", "address-2", "addr2", "address_line2", "addressline2", "apartment", "suite"],
        exact: &["apt", "unit"],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Address1,
        keywords: &[
            "address1",
            "address_1",
            "address-1",
            "addr1",
            "street_address",
            "streetaddress",
            "address_line1",
            "addressline1",
            "street",
            "address",
        ],
        exact: &[],
        excluded: &[FieldType::Address2, FieldType::Email],
    },
    DetectionRule {
        field_type: FieldType::PostalCode,
        keywords: &["zipcode", "zip_code", "zip-code", "postalcode", "postal_code", "postal-code", "postcode", "zip", "postal"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::City,
        keywords: &["city", "town", "locality"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::State,
        keywords: &["state", "province", "region"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Country,
        keywords: &["country"],
        exact: &[],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Website,
        keywords: &["website", "web_site", "web-site", "homepage", "site_url", "weburl"],
        exact: &["url", "web"],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Password,
        keywords: &["password", "passwd", "passphrase"],
        exact: &["pwd", "pass"],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Gender,
        keywords: &["gender"],
        exact: &["sex"],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Age,
        keywords: &["_age", "-age", "your_age"],
        exact: &["age"],
        excluded: &[],
    },
    DetectionRule {
        field_type: FieldType::Year,
        keywords: &["year"],
        exact: &["yy", "yyyy"],
        excluded: &[FieldType::ExpiryYear, FieldType::BirthDate],
    },
    DetectionRule {
        field_type: FieldType::Month,
        keywords: &["month"],
        exact: &["mm"],
        excluded: &[FieldType::ExpiryMonth, FieldType::BirthDate],
    },
    DetectionRule {
        field_type: FieldType::Day,
        keywords: &["day"],
        exact: &["dd"],
        excluded: &[FieldType::BirthDate],
    },
    DetectionRule {
        field_type: FieldType::Date,
        keywords: &["date"],
        exact: &[],
        excluded: &[FieldType::BirthDate, FieldType::ExpiryMonth, FieldType::ExpiryYear],
    },
    DetectionRule {
        field_type: FieldType::Time,
        keywords: &["time"],
        exact: &[],
        excluded: &[FieldType::Date],
    },
];

impl DetectionRule {
    /// True when any keyword appears in any signal, or any exact keyword
    /// equals a whole signal value, tail, or class token.
    pub fn matches(&self, signals: &FieldSignals) -> bool {
        if self.keywords.iter().any(|k| signals.any_contains(k)) {
            return true;
        }
        self.exact.iter().any(|k| {
            signals.primary().iter().any(|s| s == k) || signals.classes.iter().any(|c| c == k)
        })
    }
}

fn rule_for(field_type: FieldType) -> Option<&'static DetectionRule> {
    DETECTION_RULES.iter().find(|r| r.field_type == field_type)
}

/// Classifies a text-like field from its signals.
///
/// Native shortcut kinds return immediately; generic text and number kinds
/// scan the detection table in order; everything else is `Unknown`.
pub fn classify(signals: &FieldSignals) -> FieldType {
    if let Some((_, mapped)) = NATIVE_SHORTCUTS.iter().find(|(kind, _)| *kind == signals.kind) {
        return *mapped;
    }
    if !signals.kind.is_text_like() && !signals.kind.is_numeric() {
        return FieldType::Unknown;
    }
    for rule in DETECTION_RULES {
        if !rule.matches(signals) {
            continue;
        }
        let suppressed = rule
            .excluded
            .iter()
            .filter_map(|t| rule_for(*t))
            .any(|other| other.matches(signals));
        if suppressed {
            continue;
        }
        return rule.field_type;
    }
    if signals.kind.is_numeric() {
        FieldType::Number
    } else {
        FieldType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals;
    use crate::field::{FieldHandle, FieldId, NativeKind, Rect};

    fn signals_for(name: &str, kind: NativeKind) -> FieldSignals {
        let handle = FieldHandle {
            id: FieldId(1),
            kind,
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
        };
        signals::extract(&handle)
    }

    #[test]
    fn native_kind_short_circuits_keyword_scanning() {
        // The name says phone, but the declared kind wins without a scan.
        let s = signals_for("phone", NativeKind::Email);
        assert_eq!(classify(&s), FieldType::Email);
        assert_eq!(classify(&signals_for("anything", NativeKind::Tel)), FieldType::Phone);
        assert_eq!(classify(&signals_for("x", NativeKind::Color)), FieldType::Color);
    }

    #[test]
    fn firstname_beats_the_generic_name_rule() {
        assert_eq!(classify(&signals_for("firstname", NativeKind::Text)), FieldType::FirstName);
        assert_eq!(classify(&signals_for("user.last_name", NativeKind::Text)), FieldType::LastName);
        assert_eq!(classify(&signals_for("name", NativeKind::Text)), FieldType::FullName);
        assert_eq!(classify(&signals_for("company_name", NativeKind::Text)), FieldType::Company);
    }

    #[test]
    fn table_order_is_pinned_for_ambiguous_families() {
        // "email address" matches both families; email is declared first.
        let s = signals_for("email_address", NativeKind::Text);
        assert_eq!(classify(&s), FieldType::Email);
        // Specific name parts precede the generic rule in the table.
        let first = DETECTION_RULES.iter().position(|r| r.field_type == FieldType::FirstName);
        let full = DETECTION_RULES.iter().position(|r| r.field_type == FieldType::FullName);
        assert!(first < full);
        let email = DETECTION_RULES.iter().position(|r| r.field_type == FieldType::Email);
        let address = DETECTION_RULES.iter().position(|r| r.field_type == FieldType::Address1);
        assert!(email < address);
    }

    #[test]
    fn dob_classifies_as_birth_date() {
        assert_eq!(classify(&signals_for("dob", NativeKind::Text)), FieldType::BirthDate);
        assert_eq!(
            classify(&signals_for("date_of_birth", NativeKind::Text)),
            FieldType::BirthDate
        );
    }

    #[test]
    fn exclusions_keep_day_and_date_away_from_birthday() {
        assert_eq!(classify(&signals_for("birthday", NativeKind::Text)), FieldType::BirthDate);
        assert_eq!(classify(&signals_for("delivery_day", NativeKind::Text)), FieldType::Day);
        assert_eq!(classify(&signals_for("start_date", NativeKind::Text)), FieldType::Date);
    }

    #[test]
    fn exact_keywords_do_not_fire_as_substrings() {
        // "message" contains "age" but only the exact form may match.
        assert_eq!(classify(&signals_for("message", NativeKind::Text)), FieldType::Text);
        assert_eq!(classify(&signals_for("age", NativeKind::Text)), FieldType::Age);
        assert_eq!(classify(&signals_for("user[age]", NativeKind::Text)), FieldType::Age);
    }

    #[test]
    fn generic_fallback_tracks_the_native_kind() {
        assert_eq!(classify(&signals_for("xq7", NativeKind::Text)), FieldType::Text);
        assert_eq!(classify(&signals_for("xq7", NativeKind::Number)), FieldType::Number);
        assert_eq!(classify(&signals_for("xq7", NativeKind::Checkbox)), FieldType::Unknown);
    }

    #[test]
    fn every_excluded_type_has_a_rule_in_the_table() {
        for rule in DETECTION_RULES {
            for excluded in rule.excluded {
                assert!(
                    rule_for(*excluded).is_some(),
                    "{:?} excludes {:?} which has no rule",
                    rule.field_type,
                    excluded
                );
            }
        }
    }
}
