// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Report generation request model, validation, and filter decoding.
//!
//! A [`ReportRequest`] is decoded straight from the submitted JSON body and
//! then validated as a whole: [`ReportRequest::validate`] accumulates every
//! violation it finds instead of failing fast, so a client sees all of its
//! problems in one round trip.
//!
//! Filters are the one place where decoding itself is catalog-driven.
//! [`Filter`] is a closed tagged union over the supported
//! (kind, value type) combinations; its `Deserialize` impl resolves the
//! concrete variant from the field's catalog entry — the presence of a
//! `range` key selects the range branch, the field's value type selects
//! the element type — and rejects combinations the catalog disallows.

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::fields::{self, FilterKind, ValueType};

/// Sort direction for a sort entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Smallest values first.
    #[serde(rename = "ASCENDING")]
    Ascending,
    /// Largest values first.
    #[serde(rename = "DESCENDING")]
    Descending,
}

/// A field to sort the report by, with its direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    /// Name of the field to sort by; must be a sortable catalog field.
    pub field_name: String,
    /// Sort direction.
    pub order: Order,
}

/// Membership filter: a value passes if it is in the whitelist (when one is
/// given) and not in the blacklist (when one is given).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFilter<T> {
    /// Name of the filtered field.
    pub field_name: String,
    /// Allowed values, or no limit if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<T>>,
    /// Forbidden values, or no limit if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<Vec<T>>,
}

impl<T: PartialEq> ValueFilter<T> {
    /// Whether the given value passes this filter.
    ///
    /// An absent or empty whitelist allows everything; an absent or empty
    /// blacklist forbids nothing.
    pub fn apply(&self, value: &T) -> bool {
        let allowed = match &self.whitelist {
            Some(w) if !w.is_empty() => w.contains(value),
            _ => true,
        };
        let forbidden = match &self.blacklist {
            Some(b) if !b.is_empty() => b.contains(value),
            _ => false,
        };
        allowed && !forbidden
    }
}

/// Half-open interval `[min, max)`; an absent bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Range<T> {
    /// Inclusive minimum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    /// Exclusive maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

/// Range filter: a value passes if it falls within `[min, max)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFilter<T> {
    /// Name of the filtered field.
    pub field_name: String,
    /// The allowed range. Required; validated after decoding.
    pub range: Option<Range<T>>,
}

impl<T: PartialOrd> RangeFilter<T> {
    /// Whether the given value passes this filter, treating absent bounds
    /// as unbounded. Min is inclusive, max is exclusive.
    pub fn apply(&self, value: &T) -> bool {
        let Some(range) = &self.range else {
            return true;
        };
        let above_min = range.min.as_ref().is_none_or(|min| min <= value);
        let below_max = range.max.as_ref().is_none_or(|max| value < max);
        above_min && below_max
    }
}

/// A filter over one report field.
///
/// Closed union over the (kind, value type) combinations the catalog can
/// express: membership filters exist only for string fields, range filters
/// only for integer and long fields. Which variant a JSON payload decodes
/// into is decided by the field's catalog entry, not by the payload shape
/// alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Filter {
    /// Membership filter over a string field.
    StringValue(ValueFilter<String>),
    /// Range filter over a 32-bit integer field.
    IntRange(RangeFilter<i32>),
    /// Range filter over a 64-bit integer field.
    LongRange(RangeFilter<i64>),
}

impl Filter {
    /// Name of the filtered field.
    pub fn field_name(&self) -> &str {
        match self {
            Self::StringValue(f) => &f.field_name,
            Self::IntRange(f) => &f.field_name,
            Self::LongRange(f) => &f.field_name,
        }
    }

    /// Resolve and decode a filter from raw JSON, driven by the Field
    /// Catalog entry of the named field.
    pub(crate) fn from_json(value: serde_json::Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| "Expected a JSON object for each filter".to_string())?;
        let field_name = object
            .get("fieldName")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "Field name must be specified for filters".to_string())?
            .to_string();
        let field = fields::lookup(&field_name).ok_or_else(|| {
            format!(
                "Invalid field name '{}'. Field name must be one of: [{}]",
                field_name,
                fields::field_names().join(", ")
            )
        })?;
        // The presence of a `range` key selects the range branch, even if
        // its value is null; the null is caught by validation afterwards.
        if object.contains_key("range") {
            if !field.allows(FilterKind::Range) {
                return Err(format!(
                    "Field '{}' cannot be filtered by range. It can only be filtered by: [{}]",
                    field_name,
                    field.allowed_kinds_label()
                ));
            }
            return match field.value_type {
                ValueType::Integer => serde_json::from_value(value)
                    .map(Filter::IntRange)
                    .map_err(|e| format!("Invalid range filter on field '{field_name}': {e}")),
                ValueType::Long => serde_json::from_value(value)
                    .map(Filter::LongRange)
                    .map_err(|e| format!("Invalid range filter on field '{field_name}': {e}")),
                // Unreachable with the shipped catalog: range is only ever
                // allowed on numeric fields (see catalog consistency test).
                other => Err(format!(
                    "Field {field_name} with value type {other} cannot be filtered by range"
                )),
            };
        }
        if !field.allows(FilterKind::Value) {
            return Err(format!(
                "Field '{}' cannot be filtered by values. It can only be filtered by: [{}]",
                field_name,
                field.allowed_kinds_label()
            ));
        }
        match field.value_type {
            ValueType::String => serde_json::from_value(value)
                .map(Filter::StringValue)
                .map_err(|e| format!("Invalid value filter on field '{field_name}': {e}")),
            other => Err(format!(
                "Field {field_name} with value type {other} cannot be filtered by values"
            )),
        }
    }

    /// Accumulate invariant violations for this filter.
    fn validate_into(&self, errors: &mut Vec<String>) {
        match self {
            Self::StringValue(f) => {
                match (&f.whitelist, &f.blacklist) {
                    (None, None) => errors.push(format!(
                        "Filter on field '{}' must contain at least one of 'whitelist' or 'blacklist'.",
                        f.field_name
                    )),
                    (Some(whitelist), Some(blacklist)) => {
                        if whitelist.iter().any(|v| blacklist.contains(v)) {
                            errors.push(format!(
                                "'whitelist' and 'blacklist' in the filter on field '{}' must not overlap.",
                                f.field_name
                            ));
                        }
                    }
                    _ => {}
                }
            }
            Self::IntRange(f) => validate_range(&f.field_name, &f.range, errors),
            Self::LongRange(f) => validate_range(&f.field_name, &f.range, errors),
        }
    }
}

fn validate_range<T: PartialOrd>(
    field_name: &str,
    range: &Option<Range<T>>,
    errors: &mut Vec<String>,
) {
    let Some(range) = range else {
        errors.push(format!(
            "'range' must be specified in the filter on field '{field_name}'."
        ));
        return;
    };
    match (&range.min, &range.max) {
        (None, None) => errors.push(format!(
            "'range' in the filter on field '{field_name}' must contain at least one of 'min' or 'max'."
        )),
        (Some(min), Some(max)) if min >= max => errors.push(format!(
            "'min' must be smaller than 'max' in the range of the filter on field '{field_name}'."
        )),
        _ => {}
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Filter::from_json(value).map_err(de::Error::custom)
    }
}

/// A request to generate a program-run report.
///
/// `start`/`end` bound the queried time range in epoch seconds: a run
/// qualifies if it was still running at `start` (or ended no earlier) and
/// started before `end`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    /// Start of the queried time range, epoch seconds. Required.
    pub start: Option<i64>,
    /// End of the queried time range, epoch seconds. Required.
    pub end: Option<i64>,
    /// Fields to project into the report rows. Required, non-empty.
    pub fields: Option<Vec<String>>,
    /// Field to sort by. At most one entry in this version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<Sort>>,
    /// Filters each report row must satisfy; field names must be unique.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
}

impl ReportRequest {
    /// Validate this request, returning every violation found.
    ///
    /// An empty result means the request is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.start.is_none() {
            errors.push("'start' must be specified.".to_string());
        }
        if self.end.is_none() {
            errors.push("'end' must be specified.".to_string());
        }
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start >= end
        {
            errors.push("'start' must be smaller than 'end'.".to_string());
        }
        match &self.fields {
            None => errors.push("'fields' must be specified.".to_string()),
            Some(fields) if fields.is_empty() => {
                errors.push("'fields' must be specified.".to_string());
            }
            Some(fields) => {
                for field in fields {
                    if !fields::is_valid_field(field) {
                        errors.push(format!(
                            "Invalid field name '{}' in fields. Field name must be one of: [{}]",
                            field,
                            fields::field_names().join(", ")
                        ));
                    }
                }
            }
        }
        if let Some(filters) = &self.filters {
            let mut seen = std::collections::HashSet::new();
            for filter in filters {
                if !seen.insert(filter.field_name()) {
                    errors.push(format!(
                        "Field '{}' is duplicated in filters.",
                        filter.field_name()
                    ));
                }
                filter.validate_into(&mut errors);
            }
        }
        if let Some(sort) = &self.sort {
            if sort.len() > 1 {
                errors.push("Currently only one field is supported in sort.".to_string());
            }
            for entry in sort {
                match fields::lookup(&entry.field_name) {
                    None => errors.push(format!(
                        "Invalid field name '{}' in sort.",
                        entry.field_name
                    )),
                    Some(field) if !field.sortable => errors.push(format!(
                        "Field '{}' in sort is not sortable.",
                        entry.field_name
                    )),
                    Some(_) => {}
                }
            }
        }
        errors
    }

    /// The namespace membership filter of this request, if one was given.
    ///
    /// Field names are unique across filters, so there is at most one.
    pub fn namespace_filter(&self) -> Option<&ValueFilter<String>> {
        self.filters.as_deref()?.iter().find_map(|f| match f {
            Filter::StringValue(vf) if vf.field_name == "namespace" => Some(vf),
            _ => None,
        })
    }
}
