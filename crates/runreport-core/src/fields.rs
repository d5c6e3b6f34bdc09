// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Static catalog of reportable fields.
//!
//! Every field a report can project, filter, or sort on is registered here
//! with its value type, the filter kinds that are legal for it, and whether
//! it is sortable. The catalog is fixed at compile time; the request
//! decoder and validator are driven entirely by these entries, so adding a
//! field never requires touching the dispatch logic.

use std::fmt;

/// Value type of a reportable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// UTF-8 string values.
    String,
    /// 32-bit integer values.
    Integer,
    /// 64-bit integer values.
    Long,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Long => write!(f, "long"),
        }
    }
}

/// Kind of filter that can be applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Whitelist/blacklist membership filter.
    Value,
    /// Half-open `[min, max)` range filter.
    Range,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::Range => write!(f, "range"),
        }
    }
}

/// A single catalog entry.
#[derive(Debug)]
pub struct ReportField {
    /// Field name as it appears in requests and report rows.
    pub name: &'static str,
    /// Value type of the field.
    pub value_type: ValueType,
    /// Whether reports can be sorted by this field.
    pub sortable: bool,
    /// Filter kinds that can be applied to this field.
    pub applicable_filters: &'static [FilterKind],
}

impl ReportField {
    /// Whether the given filter kind is legal for this field.
    pub fn allows(&self, kind: FilterKind) -> bool {
        self.applicable_filters.contains(&kind)
    }

    /// Comma-joined lowercase list of the legal filter kinds, for error
    /// messages.
    pub fn allowed_kinds_label(&self) -> String {
        self.applicable_filters
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

const VALUE_ONLY: &[FilterKind] = &[FilterKind::Value];
const RANGE_ONLY: &[FilterKind] = &[FilterKind::Range];
const NO_FILTERS: &[FilterKind] = &[];

/// The closed set of reportable fields.
static FIELDS: &[ReportField] = &[
    ReportField {
        name: "namespace",
        value_type: ValueType::String,
        sortable: false,
        applicable_filters: VALUE_ONLY,
    },
    ReportField {
        name: "program",
        value_type: ValueType::String,
        sortable: false,
        applicable_filters: VALUE_ONLY,
    },
    ReportField {
        name: "run",
        value_type: ValueType::String,
        sortable: false,
        applicable_filters: VALUE_ONLY,
    },
    ReportField {
        name: "status",
        value_type: ValueType::String,
        sortable: false,
        applicable_filters: VALUE_ONLY,
    },
    ReportField {
        name: "user",
        value_type: ValueType::String,
        sortable: false,
        applicable_filters: VALUE_ONLY,
    },
    ReportField {
        name: "startMethod",
        value_type: ValueType::String,
        sortable: false,
        applicable_filters: VALUE_ONLY,
    },
    // Serialized runtime arguments; opaque, neither filterable nor sortable.
    ReportField {
        name: "runtimeArgs",
        value_type: ValueType::String,
        sortable: false,
        applicable_filters: NO_FILTERS,
    },
    ReportField {
        name: "start",
        value_type: ValueType::Long,
        sortable: true,
        applicable_filters: RANGE_ONLY,
    },
    ReportField {
        name: "running",
        value_type: ValueType::Long,
        sortable: true,
        applicable_filters: RANGE_ONLY,
    },
    ReportField {
        name: "end",
        value_type: ValueType::Long,
        sortable: true,
        applicable_filters: RANGE_ONLY,
    },
    ReportField {
        name: "duration",
        value_type: ValueType::Long,
        sortable: true,
        applicable_filters: RANGE_ONLY,
    },
    ReportField {
        name: "numLogWarnings",
        value_type: ValueType::Integer,
        sortable: true,
        applicable_filters: RANGE_ONLY,
    },
    ReportField {
        name: "numLogErrors",
        value_type: ValueType::Integer,
        sortable: true,
        applicable_filters: RANGE_ONLY,
    },
    ReportField {
        name: "numRecordsOut",
        value_type: ValueType::Integer,
        sortable: true,
        applicable_filters: RANGE_ONLY,
    },
];

/// Look up a catalog entry by field name.
pub fn lookup(name: &str) -> Option<&'static ReportField> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Whether the given name is a reportable field.
pub fn is_valid_field(name: &str) -> bool {
    lookup(name).is_some()
}

/// All field names in catalog order, for error messages.
pub fn field_names() -> Vec<&'static str> {
    FIELDS.iter().map(|f| f.name).collect()
}
