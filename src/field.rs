//! Field snapshot model.
//!
//! A [`FieldHandle`] is an inert snapshot of one form control as captured by
//! the page-traversal collaborator: native kind, naming attributes, label
//! association, class tokens, data attributes, and for selects the full
//! option list. Handles deserialize from JSON so the CLI can classify
//! captured pages offline.

use std::{collections::BTreeMap, fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// Stable identity for one field within a captured page.
///
/// Signal caching is keyed on this, so it must not change between repeated
/// classification calls for the same control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u64);

/// The control's own declared kind, as the page reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NativeKind {
    #[default]
    Text,
    Email,
    Tel,
    Url,
    Password,
    Number,
    Range,
    Date,
    Month,
    Week,
    Time,
    Color,
    Search,
    Checkbox,
    Radio,
    Hidden,
    Textarea,
    Select,
}

impl NativeKind {
    /// Kinds whose value is free-form text and therefore worth classifying
    /// beyond the kind itself.
    pub fn is_text_like(self) -> bool {
        matches!(self, NativeKind::Text | NativeKind::Search | NativeKind::Textarea)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, NativeKind::Number | NativeKind::Range)
    }
}

/// Screen-space rectangle of an element, used for label proximity search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Center-to-center distance between two rectangles.
    pub fn distance_to(&self, other: &Rect) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// A candidate label captured near the field when no formal association
/// exists. `depth` counts ancestor levels between the field and the common
/// container of the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyText {
    pub text: String,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub depth: u8,
}

/// One entry of a select's option list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Snapshot of a single form control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldHandle {
    pub id: FieldId,
    #[serde(default)]
    pub kind: NativeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub element_id: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub aria_label: String,
    #[serde(default)]
    pub title: String,
    /// Text of the formally associated label, when one exists.
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// data-* attribute names and values, minus the `data-` prefix.
    #[serde(default)]
    pub data_attributes: BTreeMap<String, String>,
    /// Arbitrary other attributes, for override rules of the `[attr="v"]` shape.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub rect: Rect,
    /// Unassociated text nodes near the field, for label proximity fallback.
    #[serde(default)]
    pub nearby_text: Vec<NearbyText>,
    /// Names of sibling fields in the same form, used as heuristic context.
    #[serde(default)]
    pub sibling_names: Vec<String>,
    /// Option list; present only for `kind: select`.
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl FieldHandle {
    /// Attribute lookup spanning the dedicated fields and the raw map, so
    /// override rules can target either.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(self.name.as_str()),
            "id" => Some(self.element_id.as_str()),
            "placeholder" => Some(self.placeholder.as_str()),
            "aria-label" => Some(self.aria_label.as_str()),
            "title" => Some(self.title.as_str()),
            other => {
                if let Some(stripped) = other.strip_prefix("data-") {
                    self.data_attributes.get(stripped).map(|v| v.as_str())
                } else {
                    self.attributes.get(other).map(|v| v.as_str())
                }
            }
        }
    }
}

/// Canonical field-intent label consumed by value generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    FirstName,
    LastName,
    FullName,
    Username,
    Email,
    Phone,
    Company,
    JobTitle,
    Salutation,
    Address1,
    Address2,
    City,
    State,
    PostalCode,
    Country,
    BirthDate,
    Age,
    Gender,
    Website,
    Password,
    CardNumber,
    CardCvc,
    ExpiryMonth,
    ExpiryYear,
    Year,
    Month,
    Day,
    Date,
    Time,
    Color,
    Number,
    Text,
    Unknown,
}

impl FieldType {
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::FirstName => "first_name",
            FieldType::LastName => "last_name",
            FieldType::FullName => "full_name",
            FieldType::Username => "username",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Company => "company",
            FieldType::JobTitle => "job_title",
            FieldType::Salutation => "salutation",
            FieldType::Address1 => "address1",
            FieldType::Address2 => "address2",
            FieldType::City => "city",
            FieldType::State => "state",
            FieldType::PostalCode => "postal_code",
            FieldType::Country => "country",
            FieldType::BirthDate => "birth_date",
            FieldType::Age => "age",
            FieldType::Gender => "gender",
            FieldType::Website => "website",
            FieldType::Password => "password",
            FieldType::CardNumber => "card_number",
            FieldType::CardCvc => "card_cvc",
            FieldType::ExpiryMonth => "expiry_month",
            FieldType::ExpiryYear => "expiry_year",
            FieldType::Year => "year",
            FieldType::Month => "month",
            FieldType::Day => "day",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Color => "color",
            FieldType::Number => "number",
            FieldType::Text => "text",
            FieldType::Unknown => "unknown",
        }
    }

    /// True for the results that mean "nothing specific was recognized".
    pub fn is_generic(self) -> bool {
        matches!(self, FieldType::Text | FieldType::Number | FieldType::Unknown)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        const ALL: &[FieldType] = &[
            FieldType::FirstName,
            FieldType::LastName,
            FieldType::FullName,
            FieldType::Username,
            FieldType::Email,
            FieldType::Phone,
            FieldType::Company,
            FieldType::JobTitle,
            FieldType::Salutation,
            FieldType::Address1,
            FieldType::Address2,
            FieldType::City,
            FieldType::State,
            FieldType::PostalCode,
            FieldType::Country,
            FieldType::BirthDate,
            FieldType::Age,
            FieldType::Gender,
            FieldType::Website,
            FieldType::Password,
            FieldType::CardNumber,
            FieldType::CardCvc,
            FieldType::ExpiryMonth,
            FieldType::ExpiryYear,
            FieldType::Year,
            FieldType::Month,
            FieldType::Day,
            FieldType::Date,
            FieldType::Time,
            FieldType::Color,
            FieldType::Number,
            FieldType::Text,
            FieldType::Unknown,
        ];
        ALL.iter()
            .copied()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| anyhow!("Unknown field type '{value}'"))
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        FieldType::from_str(&token).map_err(serde::de::Error::custom)
    }
}
