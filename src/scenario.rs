use chrono::NaiveDate;

/// A named, canned what-if applied to one record.
pub struct Scenario<T> {
    pub key: &'static str,
    pub label: &'static str,
    pub apply: fn(&T, NaiveDate) -> T,
}

impl<T> Scenario<T> {
    pub fn run(&self, record: &T, today: NaiveDate) -> T {
        (self.apply)(record, today)
    }
}

pub fn find_scenario<'a, T>(table: &'a [Scenario<T>], key: &str) -> Option<&'a Scenario<T>> {
    table
        .iter()
        .find(|scenario| scenario.key.eq_ignore_ascii_case(key))
}

/// Adds `delta` and clamps to the 0-100 score range.
pub fn nudge(value: f64, delta: f64) -> f64 {
    (value + delta).clamp(0.0, 100.0)
}
