use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::store::Record;

/// Raw field values as typed into a form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    fields: BTreeMap<String, String>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Trimmed value, empty when the field is unset.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(str::trim).unwrap_or_default().to_string()
    }

    pub fn required(&self, key: &str) -> Result<String, ValidationError> {
        let value = self.text(key);
        if value.is_empty() {
            return Err(ValidationError::MissingField(key.to_string()));
        }
        Ok(value)
    }

    pub fn number(&self, key: &str) -> Result<f64, ValidationError> {
        let raw = self.required(key)?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ValidationError::NotANumber {
                field: key.to_string(),
                value: raw,
            }),
        }
    }

    /// Number constrained to `min..=max`.
    pub fn bounded(&self, key: &str, min: f64, max: f64) -> Result<f64, ValidationError> {
        let value = self.number(key)?;
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field: key.to_string(),
                value,
                min,
                max,
            });
        }
        Ok(value)
    }

    /// Percent-style score field.
    pub fn score(&self, key: &str) -> Result<f64, ValidationError> {
        self.bounded(key, 0.0, 100.0)
    }

    pub fn integer<N: FromStr>(&self, key: &str) -> Result<N, ValidationError> {
        let raw = self.required(key)?;
        raw.parse::<N>().map_err(|_| ValidationError::NotANumber {
            field: key.to_string(),
            value: raw,
        })
    }

    pub fn date(&self, key: &str) -> Result<NaiveDate, ValidationError> {
        let raw = self.required(key)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
            field: key.to_string(),
            value: raw,
        })
    }

    /// Comma-separated numbers, e.g. a trend series. Empty means an empty list.
    pub fn numbers(&self, key: &str) -> Result<Vec<f64>, ValidationError> {
        let raw = self.text(key);
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        raw.split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| ValidationError::NotANumber {
                        field: key.to_string(),
                        value: part.to_string(),
                    })
            })
            .collect()
    }

    pub fn parsed<E: FromStr>(&self, key: &str) -> Result<E, ValidationError> {
        let raw = self.required(key)?;
        raw.parse::<E>().map_err(|_| ValidationError::UnknownValue {
            field: key.to_string(),
            value: raw,
        })
    }
}

/// A record that can be edited through a [`Draft`].
pub trait FormRecord: Record + Sized {
    /// Field keys shown by the add form, in display order.
    fn form_fields() -> &'static [&'static str];

    fn to_draft(&self) -> Draft;

    /// Parses a draft into a record. When editing, `base` is the stored
    /// record, so fields the form does not show (logs, history) carry over.
    fn from_draft(draft: &Draft, base: Option<&Self>) -> Result<Self, ValidationError>;
}

pub fn join_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        let draft = Draft::new().with("name", "   ");
        assert_eq!(
            draft.required("name"),
            Err(ValidationError::MissingField("name".to_string()))
        );
    }

    #[test]
    fn number_rejects_nan_and_text() {
        let draft = Draft::new().with("load", "NaN").with("fatigue", "high");
        assert!(matches!(
            draft.number("load"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            draft.number("fatigue"),
            Err(ValidationError::NotANumber { .. })
        ));
    }

    #[test]
    fn score_enforces_range() {
        let draft = Draft::new().with("readiness", "140");
        assert!(matches!(
            draft.score("readiness"),
            Err(ValidationError::OutOfRange { .. })
        ));
        let draft = Draft::new().with("readiness", " 72.5 ");
        assert_eq!(draft.score("readiness"), Ok(72.5));
    }

    #[test]
    fn numbers_parses_series() {
        let draft = Draft::new().with("trend", "60, 64,70");
        assert_eq!(draft.numbers("trend"), Ok(vec![60.0, 64.0, 70.0]));
        assert_eq!(Draft::new().numbers("trend"), Ok(Vec::new()));
        assert!(Draft::new().with("trend", "60,,70").numbers("trend").is_err());
    }

    #[test]
    fn date_uses_iso_format() {
        let draft = Draft::new().with("expires", "2026-06-30");
        assert_eq!(
            draft.date("expires"),
            Ok(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap())
        );
        let draft = Draft::new().with("expires", "30/06/2026");
        assert!(matches!(
            draft.date("expires"),
            Err(ValidationError::InvalidDate { .. })
        ));
    }
}
