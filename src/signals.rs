//! Signal extraction and per-pass caching.
//!
//! Everything the classifiers look at comes through here: the textual
//! signals of a [`FieldHandle`] are locale-normalized, lowercased, and
//! augmented with "last segment" variants so scoped identifiers such as
//! `user.email` or `billing[zip]` still match suffix-style keywords.
//!
//! Extraction walks the handle once and the result is memoized in a
//! [`SignalCache`] keyed by [`FieldId`]. The cache is owned by the
//! orchestrator and cleared explicitly at the end of every fill pass;
//! nothing expires on its own.

use std::{collections::HashMap, sync::Arc};

use crate::{
    field::{FieldHandle, FieldId, NativeKind},
    locale,
};

/// Ancestor levels the proximity search is willing to cross.
const MAX_LABEL_DEPTH: u8 = 3;
/// Nearby text longer than this is page copy, not a label.
const MAX_LABEL_LEN: usize = 60;
/// Separators that introduce the last segment of a scoped identifier.
const SEGMENT_SEPARATORS: &[char] = &['.', '-', '['];

/// Normalized, immutable view of one field's textual evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSignals {
    pub kind: NativeKind,
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub aria_label: String,
    pub label: String,
    pub classes: Vec<String>,
    pub data_attributes: Vec<(String, String)>,
    /// Substring of `name` after its final separator, when one exists.
    pub name_tail: String,
    /// Substring of `id` after its final separator, when one exists.
    pub id_tail: String,
    /// Sibling field names, normalized, for heuristic context.
    pub context: Vec<String>,
}

impl FieldSignals {
    /// The primary signals, in the order rule matching scans them.
    pub fn primary(&self) -> [&str; 7] {
        [
            &self.name,
            &self.id,
            &self.name_tail,
            &self.id_tail,
            &self.placeholder,
            &self.aria_label,
            &self.label,
        ]
    }

    /// True when any primary signal, class token, or data attribute
    /// contains `keyword`.
    pub fn any_contains(&self, keyword: &str) -> bool {
        self.primary().iter().any(|s| !s.is_empty() && s.contains(keyword))
            || self.classes.iter().any(|c| c.contains(keyword))
            || self
                .data_attributes
                .iter()
                .any(|(k, v)| k.contains(keyword) || v.contains(keyword))
    }

    /// True when the field carries no usable text at all.
    pub fn is_blank(&self) -> bool {
        self.primary().iter().all(|s| s.is_empty())
            && self.classes.is_empty()
            && self.data_attributes.is_empty()
    }
}

/// Normalizes one raw signal: locale phrases first, then lowercase.
fn normalize_signal(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    locale::normalize(&lowered).into_owned()
}

/// The piece after the final `.`, `-` or `[`, with a trailing `]` trimmed.
/// Returns an empty string when the identifier has no separators, so
/// callers never match the same text twice.
fn last_segment(identifier: &str) -> String {
    let cut = identifier.rfind(SEGMENT_SEPARATORS);
    match cut {
        Some(pos) => identifier[pos + 1..].trim_end_matches(']').to_string(),
        None => String::new(),
    }
}

/// Picks label text for a field: the formal association when present,
/// otherwise the nearest short visible text within reach.
fn resolve_label(handle: &FieldHandle) -> String {
    if !handle.label.trim().is_empty() {
        return handle.label.clone();
    }
    handle
        .nearby_text
        .iter()
        .filter(|candidate| candidate.depth <= MAX_LABEL_DEPTH)
        .filter(|candidate| {
            let trimmed = candidate.text.trim();
            !trimmed.is_empty() && trimmed.chars().count() <= MAX_LABEL_LEN
        })
        .min_by(|a, b| {
            handle
                .rect
                .distance_to(&a.rect)
                .total_cmp(&handle.rect.distance_to(&b.rect))
        })
        .map(|candidate| candidate.text.trim().to_string())
        .unwrap_or_default()
}

/// Extracts and normalizes every signal off a handle. Pure with respect to
/// the handle; cache admission is the caller's business.
pub fn extract(handle: &FieldHandle) -> FieldSignals {
    let name = normalize_signal(&handle.name);
    let id = normalize_signal(&handle.element_id);
    let name_tail = last_segment(&name);
    let id_tail = last_segment(&id);
    FieldSignals {
        kind: handle.kind,
        placeholder: normalize_signal(&handle.placeholder),
        aria_label: normalize_signal(&handle.aria_label),
        label: normalize_signal(&resolve_label(handle)),
        classes: handle.classes.iter().map(|c| normalize_signal(c)).collect(),
        data_attributes: handle
            .data_attributes
            .iter()
            .map(|(k, v)| (normalize_signal(k), normalize_signal(v)))
            .collect(),
        context: handle.sibling_names.iter().map(|s| normalize_signal(s)).collect(),
        name,
        id,
        name_tail,
        id_tail,
    }
}

/// Pass-scoped memo of extracted signals, keyed by field identity.
#[derive(Debug, Default)]
pub struct SignalCache {
    entries: HashMap<FieldId, Arc<FieldSignals>>,
}

impl SignalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns cached signals for the handle, extracting on first sight.
    pub fn signals(&mut self, handle: &FieldHandle) -> Arc<FieldSignals> {
        self.entries
            .entry(handle.id)
            .or_insert_with(|| Arc::new(extract(handle)))
            .clone()
    }

    /// Drops every entry. Call between fill passes; a stale entry would
    /// otherwise shadow attribute changes on a reused handle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
