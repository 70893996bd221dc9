use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::export::Exportable;
use crate::filter::Filterable;
use crate::form::FormRecord;
use crate::report::Reportable;
use crate::scenario::Scenario;
use crate::screen::Screen;
use crate::store::Store;

pub mod athlete;
pub mod coach;
pub mod innovation;
pub mod stakeholder;

pub use athlete::{Athlete, AthletePatch, AthleteStatus};
pub use coach::{Coach, CoachPatch, CoachStatus};
pub use innovation::{Innovation, InnovationPatch, Stage};
pub use stakeholder::{Sentiment, Stakeholder, StakeholderPatch};

/// Timestamped entry in a record's log/history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    pub kind: String,
    pub note: String,
}

impl LogEntry {
    pub fn new(date: NaiveDate, kind: &str, note: impl Into<String>) -> Self {
        Self {
            date,
            kind: kind.to_string(),
            note: note.into(),
        }
    }
}

/// Everything a boardroom screen needs from its record type.
pub trait Subject: FormRecord + Filterable + Exportable + Reportable {
    const TITLE: &'static str;

    fn seed() -> Vec<Self>;
    fn scenarios() -> Vec<Scenario<Self>>;
    fn insight(&self) -> String;
    /// Hex color of the record's status badge.
    fn color(&self) -> &'static str;

    fn trend(&self) -> &[f64] {
        &[]
    }
}

pub fn seeded_screen<T: Subject>(history_cap: usize) -> Screen<T> {
    Screen::new(
        T::TITLE,
        Store::with_history_cap(T::seed(), history_cap),
        T::scenarios(),
    )
}

pub(crate) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub(crate) fn fmt_score(value: f64) -> String {
    format!("{value:.1}")
}
