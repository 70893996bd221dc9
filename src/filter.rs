use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    fn as_text(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(value) => format!("{value}"),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Records the filter layer can search and slice.
pub trait Filterable {
    /// The text matched by the free-text search box.
    fn label(&self) -> &str;

    fn field(&self, key: &str) -> Option<FieldValue>;
}

/// Filter state held by a screen. Every set criterion must hold (AND);
/// unset or empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub search: Option<String>,
    pub equals: BTreeMap<String, String>,
    pub min: BTreeMap<String, f64>,
    pub max: BTreeMap<String, f64>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn equals(mut self, key: &str, value: impl Into<String>) -> Self {
        self.equals.insert(key.to_string(), value.into());
        self
    }

    pub fn min(mut self, key: &str, value: f64) -> Self {
        self.min.insert(key.to_string(), value);
        self
    }

    pub fn max(mut self, key: &str, value: f64) -> Self {
        self.max.insert(key.to_string(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.equals.values().all(|v| v.is_empty())
            && self.min.is_empty()
            && self.max.is_empty()
    }

    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        if let Some(needle) = self.search.as_deref().map(str::trim) {
            if !needle.is_empty()
                && !item
                    .label()
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            {
                return false;
            }
        }

        for (key, expected) in &self.equals {
            if expected.is_empty() {
                continue;
            }
            match item.field(key) {
                Some(value) if value.as_text() == *expected => {}
                _ => return false,
            }
        }

        for (key, floor) in &self.min {
            match item.field(key).and_then(|v| v.as_number()) {
                Some(value) if value >= *floor => {}
                _ => return false,
            }
        }

        for (key, ceiling) in &self.max {
            match item.field(key).and_then(|v| v.as_number()) {
                Some(value) if value <= *ceiling => {}
                _ => return false,
            }
        }

        true
    }
}

/// Visible subset, in store order.
pub fn filter<'a, T, I>(items: I, criteria: &Criteria) -> Vec<&'a T>
where
    T: Filterable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(|item| criteria.matches(*item))
        .collect()
}
