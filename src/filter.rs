use crate::types::{BusinessRecord, GroupField, RecordTable};
use serde::Deserialize;
use std::collections::BTreeSet;

/// A selector value: either the "match all" sentinel or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Interprets a selector string. The sentinel label and the empty string both mean `All`.
    pub fn parse(value: &str, all_label: &str) -> Self {
        if value.is_empty() || value == all_label {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub district: Selection,
    pub category: Selection,
    pub name_query: String,
}

impl FilterCriteria {
    pub fn new(district: Selection, category: Selection, name_query: &str) -> Self {
        Self {
            district,
            category,
            name_query: name_query.to_string(),
        }
    }
}

/// Raw selector values as they arrive from a form, query string or CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub district: String,
    pub category: String,
    pub q: String,
}

impl FilterParams {
    pub fn into_criteria(self, all_label: &str) -> FilterCriteria {
        FilterCriteria::new(
            Selection::parse(&self.district, all_label),
            Selection::parse(&self.category, all_label),
            &self.q,
        )
    }
}

/// Keeps every record matching all three predicates, in input order.
pub fn apply(table: &RecordTable, criteria: &FilterCriteria) -> RecordTable {
    let needle = criteria.name_query.to_lowercase();

    table
        .iter()
        .filter(|record| {
            criteria.district.matches(&record.district)
                && criteria.category.matches(&record.category)
                && name_contains(record, &needle)
        })
        .cloned()
        .collect()
}

fn name_contains(record: &BusinessRecord, lowercase_needle: &str) -> bool {
    lowercase_needle.is_empty() || record.name.to_lowercase().contains(lowercase_needle)
}

/// Selector contents: the sentinel label first, then distinct values sorted ascending.
pub fn options(table: &RecordTable, field: GroupField, all_label: &str) -> Vec<String> {
    let distinct: BTreeSet<&str> = table.iter().map(|r| field.value(r)).collect();

    std::iter::once(all_label.to_string())
        .chain(distinct.into_iter().map(str::to_string))
        .collect()
}
